// SPDX-License-Identifier: GPL-3.0-only

//! Text recognition handlers

use crate::acquisition::ImageRef;
use crate::app::state::{AppModel, Message};
use crate::errors::RecognitionError;
use cosmic::Task;
use cosmic::iced::widget::text_editor;
use tracing::info;

impl AppModel {
    pub(crate) fn handle_translate(&mut self) -> Task<cosmic::Action<Message>> {
        let effect = self.controller.on_translate_pressed();
        self.run_effect(effect)
    }

    pub(crate) fn start_recognition(
        &self,
        image: ImageRef,
        generation: u64,
    ) -> Task<cosmic::Action<Message>> {
        info!(image = %image, generation, "Starting text recognition");
        let recognizer = self.recognizer.clone();
        Task::perform(
            async move { recognizer.recognize(Some(image)).await },
            move |result| cosmic::Action::App(Message::RecognitionFinished(generation, result)),
        )
    }

    pub(crate) fn handle_recognition_finished(
        &mut self,
        generation: u64,
        result: Result<String, RecognitionError>,
    ) -> Task<cosmic::Action<Message>> {
        let previous = self.controller.recognized_text().to_string();
        let effect = self.controller.on_recognition_finished(generation, result);
        if self.controller.recognized_text() != previous {
            self.text_content = text_editor::Content::with_text(self.controller.recognized_text());
        }
        self.run_effect(effect)
    }

    /// Allow selection and cursor movement, never edits
    pub(crate) fn handle_text_action(
        &mut self,
        action: text_editor::Action,
    ) -> Task<cosmic::Action<Message>> {
        if !action.is_edit() {
            self.text_content.perform(action);
        }
        Task::none()
    }
}
