// SPDX-License-Identifier: MPL-2.0

//! OCR model files: location and first-use download

use crate::errors::ModelError;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// A model file served over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub url: &'static str,
    pub filename: &'static str,
    /// Files smaller than this are treated as truncated downloads
    pub min_size: u64,
}

pub const DETECTION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten",
    filename: "text-detection.rten",
    min_size: 1_000_000,
};

pub const RECOGNITION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten",
    filename: "text-recognition.rten",
    min_size: 5_000_000,
};

pub const OCR_MODELS: [ModelSpec; 2] = [DETECTION_MODEL, RECOGNITION_MODEL];

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Per-user model directory: `<data_dir>/text-scanner/models/ocrs`
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("text-scanner")
        .join("models")
        .join("ocrs")
}

impl ModelSpec {
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.filename)
    }

    /// The model is present and not truncated
    pub fn is_available_in(&self, dir: &Path) -> bool {
        std::fs::metadata(self.path_in(dir)).is_ok_and(|m| m.is_file() && m.len() >= self.min_size)
    }
}

/// Make sure every OCR model is present in `dir`, downloading missing ones
pub async fn ensure_models(dir: &Path) -> Result<(), ModelError> {
    let missing: Vec<ModelSpec> = OCR_MODELS
        .into_iter()
        .filter(|spec| !spec.is_available_in(dir))
        .collect();
    if missing.is_empty() {
        debug!(dir = %dir.display(), "OCR models present");
        return Ok(());
    }

    tokio::fs::create_dir_all(dir).await?;
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| ModelError::Download(format!("Failed to create HTTP client: {}", e)))?;

    for spec in missing {
        download_model(&client, &spec, dir).await?;
    }
    Ok(())
}

/// Stream a model into `<file>.part`, then move it into place
async fn download_model(
    client: &reqwest::Client,
    spec: &ModelSpec,
    dir: &Path,
) -> Result<(), ModelError> {
    let path = spec.path_in(dir);
    info!(url = spec.url, path = %path.display(), "Downloading OCR model");

    let response = client
        .get(spec.url)
        .send()
        .await
        .map_err(|e| ModelError::Download(e.to_string()))?;
    if !response.status().is_success() {
        return Err(ModelError::Download(format!(
            "HTTP {} for {}",
            response.status(),
            spec.url
        )));
    }

    let (bytes, sha256) = install_stream(Box::pin(response.bytes_stream()), spec, &path).await?;
    info!(
        file = spec.filename,
        bytes,
        sha256 = %sha256,
        "OCR model downloaded"
    );
    Ok(())
}

fn part_path_for(path: &Path) -> PathBuf {
    path.with_extension("rten.part")
}

/// Write `stream` to the part file and rename it to `path`
///
/// Returns the byte count and SHA-256 digest. The part file never outlives
/// a failure.
async fn install_stream<S, B, E>(
    stream: S,
    spec: &ModelSpec,
    path: &Path,
) -> Result<(u64, String), ModelError>
where
    S: futures::Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let part_path = part_path_for(path);
    let result = match write_part(stream, spec, &part_path).await {
        Ok(written) => tokio::fs::rename(&part_path, path)
            .await
            .map(|()| written)
            .map_err(ModelError::from),
        Err(e) => Err(e),
    };

    if result.is_err()
        && let Err(e) = tokio::fs::remove_file(&part_path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %part_path.display(), error = %e, "Failed to remove partial model");
    }
    result
}

async fn write_part<S, B, E>(
    mut stream: S,
    spec: &ModelSpec,
    part_path: &Path,
) -> Result<(u64, String), ModelError>
where
    S: futures::Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut file = tokio::fs::File::create(part_path).await?;
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| ModelError::Download(format!("Error reading download: {}", e)))?;
        let chunk = chunk.as_ref();
        file.write_all(chunk).await?;
        hasher.update(chunk);
        downloaded += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;

    if downloaded < spec.min_size {
        return Err(ModelError::Download(format!(
            "{} is truncated ({} bytes)",
            spec.filename, downloaded
        )));
    }
    Ok((downloaded, format!("{:x}", hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_requires_min_size() {
        let dir = tempfile::tempdir().unwrap();
        let spec = ModelSpec {
            url: "http://localhost/unused",
            filename: "tiny.rten",
            min_size: 4,
        };

        assert!(!spec.is_available_in(dir.path()));
        std::fs::write(spec.path_in(dir.path()), b"ab").unwrap();
        assert!(!spec.is_available_in(dir.path()));
        std::fs::write(spec.path_in(dir.path()), b"abcd").unwrap();
        assert!(spec.is_available_in(dir.path()));
    }

    #[test]
    fn test_default_model_dir_layout() {
        assert!(default_model_dir().ends_with("text-scanner/models/ocrs"));
    }

    const TINY: ModelSpec = ModelSpec {
        url: "http://localhost/unused",
        filename: "tiny.rten",
        min_size: 4,
    };

    fn chunks(
        items: Vec<Result<&'static [u8], String>>,
    ) -> impl futures::Stream<Item = Result<&'static [u8], String>> + Unpin {
        futures::stream::iter(items)
    }

    #[tokio::test]
    async fn test_install_moves_complete_download_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = TINY.path_in(dir.path());

        let stream = chunks(vec![Ok(&b"ab"[..]), Ok(&b"cd"[..])]);
        let (bytes, sha256) = install_stream(stream, &TINY, &path).await.unwrap();

        assert_eq!(bytes, 4);
        assert_eq!(sha256.len(), 64);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcd");
        assert!(!part_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_install_failures_remove_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = TINY.path_in(dir.path());

        // Broken stream
        let stream = chunks(vec![Ok(&b"ab"[..]), Err("reset".into())]);
        let result = install_stream(stream, &TINY, &path).await;
        assert!(matches!(result, Err(ModelError::Download(_))));
        assert!(!part_path_for(&path).exists());

        // Truncated download
        let result = install_stream(chunks(vec![Ok(&b"ab"[..])]), &TINY, &path).await;
        assert!(matches!(result, Err(ModelError::Download(_))));
        assert!(!part_path_for(&path).exists());

        // Rename onto a non-empty directory fails
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        let result = install_stream(chunks(vec![Ok(&b"abcd"[..])]), &TINY, &path).await;
        assert!(matches!(result, Err(ModelError::Io(_))));
        assert!(!part_path_for(&path).exists());
    }

    #[tokio::test]
    async fn test_ensure_models_is_noop_when_present() {
        let dir = tempfile::tempdir().unwrap();
        for spec in OCR_MODELS {
            let file = std::fs::File::create(spec.path_in(dir.path())).unwrap();
            file.set_len(spec.min_size).unwrap();
        }

        ensure_models(dir.path()).await.unwrap();
    }
}
