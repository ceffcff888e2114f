// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Configuration updates, theme, and the startup translation experiment.

use crate::app::state::{AppModel, Message};
use crate::config::AppTheme;
use crate::constants::translation::{SAMPLE_SOURCE_TEXT, SAMPLE_TEXT};
use crate::errors::TranslationError;
use crate::permissions::DesktopPermissions;
use crate::recognition::{OcrsRecognizer, RecognitionAdapter};
use crate::translation::{ExperimentReport, TranslationExperiment};
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

impl AppModel {
    pub(crate) fn handle_update_config(
        &mut self,
        config: crate::config::Config,
    ) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");

        if config.photo_folder_name != self.config.photo_folder_name {
            self.photo_dir = crate::storage::get_photo_directory(&config.photo_folder_name);
            self.permissions = Arc::new(DesktopPermissions::new(self.photo_dir.clone()));
            info!(path = %self.photo_dir.display(), "Photo directory changed");
        }
        if config.ocr_model_dir() != self.config.ocr_model_dir() {
            self.recognizer = RecognitionAdapter::new(Arc::new(OcrsRecognizer::new(
                config.ocr_model_dir(),
            )));
            info!("OCR model directory changed");
        }

        let theme_changed = config.app_theme != self.config.app_theme;
        self.config = config;

        if theme_changed {
            info!(app_theme = ?self.config.app_theme, "Theme changed");
            cosmic::command::set_theme(self.config.app_theme.theme())
        } else {
            Task::none()
        }
    }

    pub(crate) fn handle_set_app_theme(
        &mut self,
        app_theme: AppTheme,
    ) -> Task<cosmic::Action<Message>> {
        info!(?app_theme, "Setting application theme");
        self.config.app_theme = app_theme;

        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save app theme setting");
        }

        cosmic::command::set_theme(app_theme.theme())
    }

    /// Run the translation experiment once, if enabled
    pub(crate) fn start_translation_experiment(&self) -> Task<cosmic::Action<Message>> {
        if !self.config.translation_experiment_enabled {
            debug!("Translation experiment disabled");
            return Task::none();
        }

        let experiment = TranslationExperiment::from_config(&self.config);
        Task::perform(
            async move {
                experiment
                    .prepare_and_translate(SAMPLE_TEXT, SAMPLE_SOURCE_TEXT)
                    .await
            },
            |result| cosmic::Action::App(Message::TranslationExperimentFinished(result)),
        )
    }

    /// Results are only logged
    pub(crate) fn handle_translation_experiment_finished(
        &self,
        result: Result<ExperimentReport, TranslationError>,
    ) -> Task<cosmic::Action<Message>> {
        match result {
            Ok(report) => info!(
                translation = %report.translation,
                translation_language = %report.translation_language,
                source_sample_language = %report.source_sample_language,
                "Translation experiment finished"
            ),
            Err(e) => warn!(error = %e, "Translation experiment stopped"),
        }
        Task::none()
    }
}
