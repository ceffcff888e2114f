// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! Headless counterparts of the screen actions:
//! - Recognizing text in an image file
//! - Capturing a still from the camera
//! - Running the translation experiment

use std::path::PathBuf;
use std::sync::Arc;
use text_scanner::acquisition::ImageRef;
use text_scanner::acquisition::camera::{CaptureSettings, capture_to};
use text_scanner::app::{AppModel, load_config};
use text_scanner::config::Config;
use text_scanner::constants::translation::{SAMPLE_SOURCE_TEXT, SAMPLE_TEXT};
use text_scanner::errors::{AppResult, PermissionError};
use text_scanner::permissions::{DesktopPermissions, PermissionGate};
use text_scanner::recognition::{OcrsRecognizer, RecognitionAdapter};
use text_scanner::storage;
use text_scanner::translation::TranslationExperiment;

fn cli_config() -> Config {
    let (_, config) = load_config(<AppModel as cosmic::Application>::APP_ID);
    config
}

/// Recognize the text in `file` and print it
pub fn recognize_file(file: PathBuf) -> AppResult<()> {
    let config = cli_config();
    let recognizer = RecognitionAdapter::new(Arc::new(OcrsRecognizer::new(config.ocr_model_dir())));

    let rt = tokio::runtime::Runtime::new()?;
    let text = rt.block_on(recognizer.recognize(Some(ImageRef::from_path(file))))?;

    println!("{}", text);
    Ok(())
}

/// Capture a still and print where it was saved
pub fn capture_photo(output: Option<PathBuf>) -> AppResult<()> {
    let config = cli_config();
    let photo_dir = storage::get_photo_directory(&config.photo_folder_name);
    let permissions = DesktopPermissions::new(photo_dir.clone());
    let settings = CaptureSettings::from_config(&config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(capture_with(permissions, settings, photo_dir, output))
}

async fn capture_with(
    permissions: DesktopPermissions,
    settings: CaptureSettings,
    photo_dir: PathBuf,
    output: Option<PathBuf>,
) -> AppResult<()> {
    if !permissions.has_camera_access() {
        let result = permissions.request_camera_access().await;
        if !result.all_granted() {
            return Err(PermissionError::Denied("camera or photo directory".into()).into());
        }
    }

    // An explicit output path is written directly; otherwise a capture
    // target is created in the photo directory and removed on failure
    let (target, created) = match output {
        Some(path) => (ImageRef::from_path(path), false),
        None => (storage::create_capture_target(&photo_dir)?, true),
    };

    println!("Capturing from {}...", settings.source);
    match capture_to(settings, target.clone()).await {
        Ok(image) => {
            println!("Saved: {}", image.path().display());
            Ok(())
        }
        Err(e) => {
            if created {
                storage::discard_capture_target(&target);
            }
            Err(e.into())
        }
    }
}

/// Run the translation experiment and print its report
pub fn translate_text(text: Option<String>) -> AppResult<()> {
    let config = cli_config();
    let experiment = TranslationExperiment::from_config(&config);
    let text = text.unwrap_or_else(|| SAMPLE_TEXT.to_string());

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(experiment.prepare_and_translate(&text, SAMPLE_SOURCE_TEXT))?;

    println!("Translation: {}", report.translation);
    println!("Translation language: {}", report.translation_language);
    println!("Source sample language: {}", report.source_sample_language);
    Ok(())
}
