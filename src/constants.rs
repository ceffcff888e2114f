// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Permission request codes, echoed back in permission results
pub mod request_codes {
    /// Camera plus storage-write request (camera capture path)
    pub const CAMERA: u32 = 100;
    /// Storage-write request (gallery path)
    pub const STORAGE: u32 = 101;
}

/// Camera still-capture timing
pub mod capture {
    use super::Duration;

    /// Frames are discarded for this long so exposure can settle
    pub const DEFAULT_WARMUP_MS: u64 = 500;
    /// Give up if the camera delivers nothing for this long
    pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);
    /// Poll interval for the appsink
    pub const PULL_INTERVAL_MS: u64 = 100;
    /// JPEG quality for captured stills
    pub const JPEG_QUALITY: u8 = 92;
}

/// Image files accepted by the gallery picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

/// Default folder (under the user's Pictures directory) for captured photos
pub const DEFAULT_PHOTO_FOLDER: &str = "text-scanner";

/// Translation experiment inputs
pub mod translation {
    /// Literal translated once the model is ready
    pub const SAMPLE_TEXT: &str = "Hello World";
    /// Literal whose language is identified alongside the translation
    pub const SAMPLE_SOURCE_TEXT: &str = "Hello";
    /// Language code reported when no language is detected
    pub const UNDETERMINED_LANGUAGE: &str = "und";
}

/// UI dimensions
pub mod ui {
    /// Maximum preview height in logical pixels
    pub const PREVIEW_MAX_HEIGHT: f32 = 420.0;
    /// Width of the source menu entries
    pub const MENU_ITEM_WIDTH: f32 = 160.0;
    /// Minimum window width
    pub const MIN_WINDOW_WIDTH: f32 = 360.0;
    /// Minimum window height
    pub const MIN_WINDOW_HEIGHT: f32 = 480.0;
    /// Opacity of overlay panel backgrounds
    pub const OVERLAY_BACKGROUND_ALPHA: f32 = 0.92;
}

/// Application information utilities
pub mod app_info {
    use std::path::Path;

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Check if the application is running inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        Path::new("/.flatpak-info").exists()
    }

    /// Get the runtime environment string (e.g., "Flatpak" or "Native")
    pub fn runtime_environment() -> &'static str {
        if is_flatpak() { "Flatpak" } else { "Native" }
    }
}

/// Whether `path` has one of the accepted image extensions (case-insensitive)
pub fn is_image_path(path: &std::path::Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_image_path_detection() {
        assert!(is_image_path(Path::new("/tmp/receipt.JPG")));
        assert!(is_image_path(Path::new("scan.webp")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("no_extension")));
    }

    #[test]
    fn test_request_codes_are_distinct() {
        assert_ne!(request_codes::CAMERA, request_codes::STORAGE);
    }
}
