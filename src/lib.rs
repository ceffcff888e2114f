// SPDX-License-Identifier: MPL-2.0

//! Text Scanner - Optical character recognition for the COSMIC desktop
//!
//! Take a photo with the camera or pick an image file, then recognize the
//! text in it.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Main application logic and UI
//! - [`acquisition`]: Camera still capture and the image file picker
//! - [`permissions`]: Camera and storage access checks
//! - [`recognition`]: OCR engine and model downloads
//! - [`translation`]: Startup translation and language identification experiment
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo directory and capture targets
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // text-scanner
//! ```

pub mod acquisition;
pub mod app;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod network_manager;
pub mod permissions;
pub mod recognition;
pub mod storage;
pub mod translation;

// Re-export commonly used types
pub use acquisition::{ImageRef, ImageSource};
pub use app::{AppModel, Message, ScreenController};
pub use config::Config;
pub use errors::{AppError, RecognitionError};
