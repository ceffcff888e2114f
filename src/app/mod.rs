// SPDX-License-Identifier: MPL-2.0

//! Main application module for Text Scanner
//!
//! # Architecture
//!
//! - `controller`: Screen state and transitions, free of I/O
//! - `state`: AppModel and Message
//! - `update`: Message dispatch and effect execution
//! - `handlers`: Message handlers grouped by domain
//! - `view`: Main view rendering
//! - `menu`: Header menu bar

pub mod controller;
mod handlers;
mod menu;
mod state;
mod update;
mod view;

use crate::config::Config;
use crate::fl;
use crate::permissions::DesktopPermissions;
use crate::recognition::{OcrsRecognizer, RecognitionAdapter};
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::Subscription;
use cosmic::widget::toaster::Toasts;
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use controller::{Effect, Notice, ScreenController};
pub use state::{AppModel, ContextPage, Message};
use std::sync::Arc;
use tracing::{error, info};

const REPOSITORY: &str = "https://github.com/cosmic-utils/text-scanner";
const APP_ICON: &[u8] = include_bytes!(
    "../../resources/icons/hicolor/scalable/apps/io.github.cosmic_utils.TextScanner.svg"
);

/// Load the configuration, falling back to defaults on errors
pub fn load_config(app_id: &str) -> (Option<cosmic_config::Config>, Config) {
    match cosmic_config::Config::new(app_id, Config::VERSION) {
        Ok(handler) => {
            let config = match Config::get_entry(&handler) {
                Ok(config) => config,
                Err((errors, config)) => {
                    error!(?errors, "Errors loading config");
                    config
                }
            };
            (Some(handler), config)
        }
        Err(err) => {
            error!(%err, "Failed to create config handler");
            (None, Config::default())
        }
    }
}

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.cosmic_utils.TextScanner";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(crate::constants::app_info::version())
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        let (config_handler, config) = load_config(Self::APP_ID);

        let photo_dir = crate::storage::get_photo_directory(&config.photo_folder_name);
        info!(path = %photo_dir.display(), "Using photo directory");

        let recognizer = RecognitionAdapter::new(Arc::new(OcrsRecognizer::new(
            config.ocr_model_dir(),
        )));

        let app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            permissions: Arc::new(DesktopPermissions::new(photo_dir.clone())),
            config,
            config_handler,
            controller: ScreenController::new(),
            recognizer,
            preview: None,
            text_content: cosmic::iced::widget::text_editor::Content::new(),
            photo_dir,
            toasts: Toasts::new(Message::CloseToast),
        };

        let theme_task = cosmic::command::set_theme(app.config.app_theme.theme());
        let experiment_task = app.start_translation_experiment();

        (app, Task::batch([theme_task, experiment_task]))
    }

    /// Elements to pack at the start of the header bar.
    fn header_start(&self) -> Vec<Element<'_, Self::Message>> {
        vec![menu::menu_bar(&self.core)]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
        })
    }

    /// Close the source menu before anything else on Escape
    fn on_escape(&mut self) -> Task<cosmic::Action<Self::Message>> {
        if self.controller.menu_open() {
            self.controller.close_menu();
        } else if self.core.window.show_context {
            self.core.window.show_context = false;
        }
        Task::none()
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        self.core
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config))
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
