// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for captured photos and previews

use crate::acquisition::ImageRef;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory that receives captured photos
///
/// `<pictures>/<folder>`, falling back to `~/Pictures/<folder>` when the XDG
/// pictures directory is not set.
pub fn get_photo_directory(folder: &str) -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(folder)
}

/// File name for a new capture: `scan_<YYYYmmdd_HHMMSS>_<id>.jpg`
pub fn capture_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("scan_{}_{}.jpg", timestamp, &id[..8])
}

/// Create a new, empty, uniquely named capture target in `dir`
///
/// The directory is created if needed. The file is created exclusively so an
/// existing photo is never overwritten.
pub fn create_capture_target(dir: &Path) -> io::Result<ImageRef> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(capture_file_name());
    File::create_new(&path)?;
    debug!(path = %path.display(), "Created capture target");
    Ok(ImageRef::from_path(path))
}

/// Remove a capture target that never received a photo
///
/// Targets holding data are left alone.
pub fn discard_capture_target(target: &ImageRef) {
    let path = target.path();
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == 0 => {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "Failed to remove empty capture target");
            } else {
                debug!(path = %path.display(), "Removed empty capture target");
            }
        }
        Ok(_) => debug!(path = %path.display(), "Capture target has data, keeping it"),
        Err(e) => debug!(path = %path.display(), error = %e, "Capture target already gone"),
    }
}

/// Load the preview image for the screen
///
/// Returns `None` when the file cannot be read or decoded, in which case the
/// preview area stays empty.
pub async fn load_preview(image: ImageRef) -> Option<cosmic::widget::image::Handle> {
    let bytes = match tokio::fs::read(image.path()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(image = %image, error = %e, "Failed to read preview");
            return None;
        }
    };

    // Decode to RGBA in a blocking task so large photos don't stall the UI
    tokio::task::spawn_blocking(move || {
        let img = image::load_from_memory(&bytes)
            .map_err(|e| warn!(image = %image, error = %e, "Failed to decode preview"))
            .ok()?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Some(cosmic::widget::image::Handle::from_rgba(
            width,
            height,
            rgba.into_raw(),
        ))
    })
    .await
    .ok()?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_file_name_format() {
        let name = capture_file_name();
        assert!(name.starts_with("scan_"));
        assert!(name.ends_with(".jpg"));
        // scan_ + 8 date + _ + 6 time + _ + 8 id + .jpg
        assert_eq!(name.len(), 5 + 8 + 1 + 6 + 1 + 8 + 4);
    }

    #[test]
    fn test_capture_target_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("text-scanner");

        let target = create_capture_target(&photos).unwrap();

        assert!(target.path().starts_with(&photos));
        assert_eq!(std::fs::metadata(target.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_capture_targets_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let first = create_capture_target(dir.path()).unwrap();
        let second = create_capture_target(dir.path()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_discard_removes_only_empty_targets() {
        let dir = tempfile::tempdir().unwrap();

        let empty = create_capture_target(dir.path()).unwrap();
        discard_capture_target(&empty);
        assert!(!empty.path().exists());

        let filled = create_capture_target(dir.path()).unwrap();
        std::fs::write(filled.path(), b"jpeg data").unwrap();
        discard_capture_target(&filled);
        assert!(filled.path().exists());

        // Already removed, nothing to do
        discard_capture_target(&empty);
    }

    #[test]
    fn test_photo_directory_ends_with_folder() {
        assert!(get_photo_directory("text-scanner").ends_with("text-scanner"));
    }

    #[tokio::test]
    async fn test_load_preview_of_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(load_preview(ImageRef::from_path(path)).await.is_none());
    }
}
