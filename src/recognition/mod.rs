// SPDX-License-Identifier: MPL-2.0

//! Text recognition
//!
//! [`RecognitionAdapter`] turns an image reference into text: it reads and
//! decodes the referenced file, then hands the pixels to a
//! [`TextRecognizer`]. Read and decode failures are load errors; anything
//! the engine reports is an engine error. Nothing is cached or retried.

pub mod models;
pub mod ocrs_engine;

pub use ocrs_engine::OcrsRecognizer;

use crate::acquisition::ImageRef;
use crate::errors::RecognitionError;
use futures::future::BoxFuture;
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An OCR engine
pub trait TextRecognizer: Send + Sync {
    /// Get the engine ready (models downloaded and loaded)
    fn prepare(&self) -> BoxFuture<'static, Result<(), RecognitionError>>;

    /// Recognize all text in `image`, lines joined with newlines (blocking)
    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognitionError>;
}

/// Runs recognition requests against a shared engine
#[derive(Clone)]
pub struct RecognitionAdapter {
    engine: Arc<dyn TextRecognizer>,
}

impl std::fmt::Debug for RecognitionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionAdapter").finish_non_exhaustive()
    }
}

impl RecognitionAdapter {
    pub fn new(engine: Arc<dyn TextRecognizer>) -> Self {
        Self { engine }
    }

    /// Recognize the text in the referenced image
    ///
    /// Fails with [`RecognitionError::NoImageSelected`] without touching the
    /// engine when no image is given.
    pub async fn recognize(&self, image: Option<ImageRef>) -> Result<String, RecognitionError> {
        let image = image.ok_or(RecognitionError::NoImageSelected)?;
        let decoded = load_image(&image).await?;

        self.engine.prepare().await?;

        let engine = Arc::clone(&self.engine);
        let text = tokio::task::spawn_blocking(move || engine.recognize(&decoded))
            .await
            .map_err(|e| RecognitionError::Engine(format!("Recognition task failed: {}", e)))??;

        info!(image = %image, chars = text.len(), "Text recognized");
        Ok(text)
    }
}

/// Read and decode the referenced file
pub async fn load_image(image: &ImageRef) -> Result<DynamicImage, RecognitionError> {
    let bytes = tokio::fs::read(image.path()).await.map_err(|e| {
        warn!(image = %image, error = %e, "Failed to read image");
        RecognitionError::Load(e.to_string())
    })?;
    debug!(image = %image, bytes = bytes.len(), "Image read");

    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| RecognitionError::Load(format!("Decode task failed: {}", e)))?
        .map_err(|e| {
            warn!(image = %image, error = %e, "Failed to decode image");
            RecognitionError::Load(e.to_string())
        })
}
