// SPDX-License-Identifier: MPL-2.0

//! Image acquisition
//!
//! Two ways to obtain an image: a one-shot still capture from the camera into
//! a freshly created target file, or a file chosen in the native picker.
//! Both end in an [`ImageRef`] which the screen keeps as its active image.

pub mod camera;
pub mod gallery;

pub use camera::{CaptureSettings, CaptureSource};

use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque handle to an image on disk
///
/// The screen never holds image bytes, only this reference; bytes are read
/// when recognition runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    path: PathBuf,
}

impl ImageRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Shown as a `file://` URI
impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file://{}", self.path.display())
    }
}

/// Entries of the take-image menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Gallery,
}

impl ImageSource {
    /// Menu order
    pub const ALL: [ImageSource; 2] = [ImageSource::Camera, ImageSource::Gallery];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_display() {
        let image = ImageRef::from_path("/home/user/Pictures/text-scanner/scan.jpg");
        assert_eq!(
            image.to_string(),
            "file:///home/user/Pictures/text-scanner/scan.jpg"
        );
        assert_eq!(
            image.path(),
            Path::new("/home/user/Pictures/text-scanner/scan.jpg")
        );
    }

    #[test]
    fn test_menu_order() {
        assert_eq!(ImageSource::ALL, [ImageSource::Camera, ImageSource::Gallery]);
    }
}
