// SPDX-License-Identifier: MPL-2.0

//! On-device OCR with the `ocrs` engine
//!
//! Models are downloaded on first use from
//! https://ocrs-models.s3-accelerate.amazonaws.com/

use super::TextRecognizer;
use super::models::{self, DETECTION_MODEL, RECOGNITION_MODEL};
use crate::errors::{ModelError, RecognitionError};
use futures::future::BoxFuture;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info};

/// OCR engine built from the detection and recognition models
///
/// The engine is created once and shared by all clones.
#[derive(Clone)]
pub struct OcrsRecognizer {
    model_dir: PathBuf,
    engine: Arc<OnceLock<ocrs::OcrEngine>>,
}

impl OcrsRecognizer {
    pub fn new(model_dir: Option<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.unwrap_or_else(models::default_model_dir),
            engine: Arc::new(OnceLock::new()),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

impl std::fmt::Debug for OcrsRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrsRecognizer")
            .field("model_dir", &self.model_dir)
            .field("loaded", &self.engine.get().is_some())
            .finish()
    }
}

fn load_engine(model_dir: &Path) -> Result<ocrs::OcrEngine, ModelError> {
    let start = Instant::now();
    let detection_model = rten::Model::load_file(DETECTION_MODEL.path_in(model_dir))
        .map_err(|e| ModelError::Load(format!("detection model: {}", e)))?;
    let recognition_model = rten::Model::load_file(RECOGNITION_MODEL.path_in(model_dir))
        .map_err(|e| ModelError::Load(format!("recognition model: {}", e)))?;

    let engine = ocrs::OcrEngine::new(ocrs::OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })
    .map_err(|e| ModelError::Load(format!("Failed to create OCR engine: {}", e)))?;

    info!(
        dir = %model_dir.display(),
        elapsed_ms = start.elapsed().as_millis(),
        "OCR engine loaded"
    );
    Ok(engine)
}

impl TextRecognizer for OcrsRecognizer {
    fn prepare(&self) -> BoxFuture<'static, Result<(), RecognitionError>> {
        let this = self.clone();
        Box::pin(async move {
            if this.engine.get().is_some() {
                return Ok(());
            }

            models::ensure_models(&this.model_dir).await?;

            let cell = Arc::clone(&this.engine);
            let model_dir = this.model_dir.clone();
            tokio::task::spawn_blocking(move || {
                if cell.get().is_none() {
                    let engine = load_engine(&model_dir)?;
                    // Losing a race with another loader is harmless
                    let _ = cell.set(engine);
                }
                Ok::<(), ModelError>(())
            })
            .await
            .map_err(|e| RecognitionError::Engine(format!("Model loading task failed: {}", e)))??;
            Ok(())
        })
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognitionError> {
        let engine = self
            .engine
            .get()
            .ok_or_else(|| RecognitionError::Engine("OCR engine not loaded".into()))?;

        let start = Instant::now();
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ocrs::ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(|e| RecognitionError::Engine(format!("Failed to convert image: {}", e)))?;
        let input = engine
            .prepare_input(source)
            .map_err(|e| RecognitionError::Engine(format!("Failed to prepare input: {}", e)))?;
        let text = engine
            .get_text(&input)
            .map_err(|e| RecognitionError::Engine(format!("Failed to extract text: {}", e)))?;

        debug!(
            width,
            height,
            chars = text.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "OCR finished"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_before_prepare_is_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = OcrsRecognizer::new(Some(dir.path().to_path_buf()));
        let image = DynamicImage::new_rgb8(8, 8);

        assert!(matches!(
            recognizer.recognize(&image),
            Err(RecognitionError::Engine(_))
        ));
    }

    #[test]
    fn test_configured_model_dir_is_used() {
        let recognizer = OcrsRecognizer::new(Some(PathBuf::from("/opt/models")));
        assert_eq!(recognizer.model_dir(), Path::new("/opt/models"));
    }
}
