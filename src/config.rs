// SPDX-License-Identifier: GPL-3.0-only

use crate::acquisition::CaptureSource;
use crate::constants::{DEFAULT_PHOTO_FOLDER, capture};
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::{Theme, theme};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application theme preference
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppTheme {
    /// Follow system theme (dark or light based on system setting)
    #[default]
    System,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

impl AppTheme {
    /// Menu order
    pub const ALL: [AppTheme; 3] = [AppTheme::System, AppTheme::Dark, AppTheme::Light];

    /// Get the COSMIC theme for this app theme preference
    pub fn theme(&self) -> Theme {
        match self {
            Self::Dark => {
                let mut theme = theme::system_dark();
                theme.theme_type.prefer_dark(Some(true));
                theme
            }
            Self::Light => {
                let mut theme = theme::system_light();
                theme.theme_type.prefer_dark(Some(false));
                theme
            }
            Self::System => theme::system_preference(),
        }
    }
}

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Application theme preference (System, Dark, Light)
    pub app_theme: AppTheme,
    /// Folder under the Pictures directory that receives captured photos
    pub photo_folder_name: String,
    /// GStreamer source used for still capture
    pub capture_source: CaptureSource,
    /// Device path or PipeWire target for the capture source (None = default camera)
    pub camera_device: Option<String>,
    /// How long frames are discarded before the still is taken
    pub capture_warmup_ms: u64,
    /// Directory holding the OCR models (None = per-user data directory)
    pub ocr_model_dir: Option<String>,
    /// Source language of the translation experiment
    pub translation_source_language: String,
    /// Target language of the translation experiment
    pub translation_target_language: String,
    /// Explicit translateLocally model name (None = derived from the language pair)
    pub translation_model: Option<String>,
    /// Only download translation models over unmetered connections
    pub download_on_unmetered_only: bool,
    /// Run the translation experiment at startup
    pub translation_experiment_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_theme: AppTheme::default(),
            photo_folder_name: DEFAULT_PHOTO_FOLDER.to_string(),
            capture_source: CaptureSource::default(),
            camera_device: None,
            capture_warmup_ms: capture::DEFAULT_WARMUP_MS,
            ocr_model_dir: None,
            translation_source_language: "en".to_string(),
            translation_target_language: "ru".to_string(),
            translation_model: None,
            download_on_unmetered_only: true,
            translation_experiment_enabled: true,
        }
    }
}

impl Config {
    /// Warm-up period as a duration
    pub fn capture_warmup(&self) -> Duration {
        Duration::from_millis(self.capture_warmup_ms)
    }

    /// Configured OCR model directory, if overridden
    pub fn ocr_model_dir(&self) -> Option<PathBuf> {
        self.ocr_model_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
    }
}
