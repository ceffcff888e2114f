// SPDX-License-Identifier: MPL-2.0

//! Error types for the text scanner
//!
//! Every failure is reported back to the screen as a message, so all error
//! types are cheap to clone and carry plain strings instead of source errors.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Permission gate errors
    Permission(PermissionError),
    /// Camera capture or gallery errors
    Acquisition(AcquisitionError),
    /// Text recognition errors
    Recognition(RecognitionError),
    /// Translation experiment errors
    Translation(TranslationError),
    /// Storage/filesystem errors
    Storage(String),
}

/// Permission gate errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The desktop portal could not be reached
    PortalUnavailable(String),
    /// The portal answered with something we could not interpret
    RequestFailed(String),
    /// The user or the system refused access
    Denied(String),
}

/// Image acquisition errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The capture destination could not be created
    CaptureTarget(String),
    /// No usable camera source
    CameraUnavailable(String),
    /// The camera produced no frame before the timeout
    NoFrame,
    /// GStreamer pipeline error
    Pipeline(String),
    /// Writing the captured frame failed
    Encoding(String),
}

/// Text recognition errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// Recognition was requested before any image was acquired
    NoImageSelected,
    /// The referenced image could not be read or decoded
    Load(String),
    /// The OCR engine failed on a readable image
    Engine(String),
}

/// Translation experiment errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Download conditions (e.g. unmetered network) are not satisfied
    DownloadConditionsNotMet(String),
    /// The translation backend is not installed
    BackendNotAvailable(String),
    /// The model could not be downloaded
    ModelDownload(String),
    /// Translation itself failed
    Translate(String),
    /// Language identification failed
    Identification(String),
}

/// Model download and loading errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// HTTP download failed
    Download(String),
    /// Filesystem error while storing a model
    Io(String),
    /// A model file exists but could not be loaded
    Load(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Acquisition(e) => write!(f, "Acquisition error: {}", e),
            AppError::Recognition(e) => write!(f, "Recognition error: {}", e),
            AppError::Translation(e) => write!(f, "Translation error: {}", e),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::PortalUnavailable(msg) => write!(f, "Portal unavailable: {}", msg),
            PermissionError::RequestFailed(msg) => write!(f, "Permission request failed: {}", msg),
            PermissionError::Denied(what) => write!(f, "Access denied: {}", what),
        }
    }
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::CaptureTarget(msg) => {
                write!(f, "Failed to create capture target: {}", msg)
            }
            AcquisitionError::CameraUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            AcquisitionError::NoFrame => write!(f, "No frame received from camera"),
            AcquisitionError::Pipeline(msg) => write!(f, "Pipeline error: {}", msg),
            AcquisitionError::Encoding(msg) => write!(f, "Failed to write photo: {}", msg),
        }
    }
}

impl fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionError::NoImageSelected => write!(f, "No image selected"),
            RecognitionError::Load(msg) => write!(f, "{}", msg),
            RecognitionError::Engine(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::DownloadConditionsNotMet(msg) => {
                write!(f, "Download conditions not met: {}", msg)
            }
            TranslationError::BackendNotAvailable(msg) => {
                write!(f, "Translation backend not available: {}", msg)
            }
            TranslationError::ModelDownload(msg) => write!(f, "Model download failed: {}", msg),
            TranslationError::Translate(msg) => write!(f, "Translation failed: {}", msg),
            TranslationError::Identification(msg) => {
                write!(f, "Language identification failed: {}", msg)
            }
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Download(msg) => write!(f, "Download failed: {}", msg),
            ModelError::Io(msg) => write!(f, "I/O error: {}", msg),
            ModelError::Load(msg) => write!(f, "Failed to load model: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PermissionError {}
impl std::error::Error for AcquisitionError {}
impl std::error::Error for RecognitionError {}
impl std::error::Error for TranslationError {}
impl std::error::Error for ModelError {}

// Conversions from sub-errors to AppError
impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<AcquisitionError> for AppError {
    fn from(err: AcquisitionError) -> Self {
        AppError::Acquisition(err)
    }
}

impl From<RecognitionError> for AppError {
    fn from(err: RecognitionError) -> Self {
        AppError::Recognition(err)
    }
}

impl From<TranslationError> for AppError {
    fn from(err: TranslationError) -> Self {
        AppError::Translation(err)
    }
}

// Conversions for I/O errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err.to_string())
    }
}

impl From<ModelError> for RecognitionError {
    fn from(err: ModelError) -> Self {
        RecognitionError::Engine(err.to_string())
    }
}

impl From<image::ImageError> for AcquisitionError {
    fn from(err: image::ImageError) -> Self {
        AcquisitionError::Encoding(err.to_string())
    }
}

impl From<gstreamer::glib::Error> for AcquisitionError {
    fn from(err: gstreamer::glib::Error) -> Self {
        AcquisitionError::Pipeline(err.to_string())
    }
}
