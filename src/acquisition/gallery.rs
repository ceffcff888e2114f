// SPDX-License-Identifier: MPL-2.0

//! Gallery picker backed by the native file dialog

use super::ImageRef;
use crate::constants::{IMAGE_EXTENSIONS, is_image_path};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Labels shown by the file dialog
#[derive(Debug, Clone)]
pub struct PickerLabels {
    pub title: String,
    pub filter_name: String,
}

/// Let the user choose an image file
///
/// Returns `None` when the dialog is dismissed or the chosen file is not an
/// image. Starts in `start_dir` when it exists.
pub async fn pick_image(labels: PickerLabels, start_dir: Option<PathBuf>) -> Option<ImageRef> {
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title(&labels.title)
        .add_filter(&labels.filter_name, IMAGE_EXTENSIONS);

    if let Some(dir) = start_dir.filter(|dir| dir.is_dir()) {
        dialog = dialog.set_directory(dir);
    }

    let Some(handle) = dialog.pick_file().await else {
        debug!("Gallery picker dismissed");
        return None;
    };

    accept_picked(handle.path().to_path_buf())
}

/// Turn a picked path into an image reference, rejecting non-image files
pub fn accept_picked(path: PathBuf) -> Option<ImageRef> {
    if !is_image_path(&path) {
        warn!(path = %path.display(), "Picked file is not a supported image");
        return None;
    }

    let image = ImageRef::from_path(path);
    info!(image = %image, "Image picked from gallery");
    Some(image)
}
