// SPDX-License-Identifier: GPL-3.0-only

//! UI Navigation handlers
//!
//! Handles context pages, the take-image source menu, and toasts.

use crate::app::state::{AppModel, ContextPage, Message};
use cosmic::Task;
use cosmic::widget::toaster::ToastId;
use tracing::{error, info};

impl AppModel {
    pub(crate) fn handle_launch_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        if let Err(err) = open::that_detached(&url) {
            error!(url = %url, error = %err, "Failed to open URL");
        }
        Task::none()
    }

    pub(crate) fn handle_toggle_context_page(
        &mut self,
        context_page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        // Close the source menu when opening a context page
        self.controller.close_menu();

        if self.context_page == context_page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
        Task::none()
    }

    pub(crate) fn handle_take_image(&mut self) -> Task<cosmic::Action<Message>> {
        let effect = self.controller.on_take_image();
        info!(visible = self.controller.menu_open(), "Source menu toggled");
        self.run_effect(effect)
    }

    pub(crate) fn handle_close_source_menu(&mut self) -> Task<cosmic::Action<Message>> {
        let effect = self.controller.close_menu();
        self.run_effect(effect)
    }

    pub(crate) fn handle_close_toast(&mut self, id: ToastId) -> Task<cosmic::Action<Message>> {
        self.toasts.remove(id);
        Task::none()
    }
}
