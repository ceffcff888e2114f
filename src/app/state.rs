// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::acquisition::{ImageRef, ImageSource};
use crate::app::controller::ScreenController;
use crate::config::{AppTheme, Config};
use crate::errors::{AcquisitionError, RecognitionError, TranslationError};
use crate::permissions::{DesktopPermissions, PermissionResult};
use crate::recognition::RecognitionAdapter;
use crate::translation::ExperimentReport;
use cosmic::cosmic_config;
use cosmic::iced::widget::text_editor;
use cosmic::widget::about::About;
use cosmic::widget::image::Handle;
use cosmic::widget::toaster::{ToastId, Toasts};
use std::path::PathBuf;
use std::sync::Arc;

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// The about page for this app.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// Screen state: active image, recognized text, source menu
    pub controller: ScreenController,
    /// Camera and storage permission checks
    pub permissions: Arc<DesktopPermissions>,
    /// OCR entry point shared by all recognition tasks
    pub recognizer: RecognitionAdapter,
    /// Decoded preview of the active image
    pub preview: Option<Handle>,
    /// Read-only, selectable copy of the recognized text
    pub text_content: text_editor::Content,
    /// Directory receiving captured photos
    pub photo_dir: PathBuf,
    /// Pending notifications
    pub toasts: Toasts<Message>,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page
    ToggleContextPage(ContextPage),
    /// Menu bar surface actions
    Surface(cosmic::surface::Action),
    /// Configuration changed on disk
    UpdateConfig(Config),
    /// Theme chosen in the View menu
    SetAppTheme(AppTheme),
    /// Dismiss a toast
    CloseToast(ToastId),
    /// Cursor and selection changes in the recognized text
    TextAction(text_editor::Action),
    /// Swallow clicks on overlay panels
    Noop,

    // ===== Image Acquisition =====
    /// "Take image" pressed
    TakeImage,
    /// Dismiss the source menu
    CloseSourceMenu,
    /// Camera or gallery chosen in the source menu
    SourceChosen(ImageSource),
    /// A permission request completed
    PermissionsAnswered(PermissionResult),
    /// Capture target created (or not) for the camera flow
    CaptureTargetCreated(Result<ImageRef, AcquisitionError>),
    /// Still capture finished
    CameraFinished(Result<ImageRef, AcquisitionError>),
    /// Gallery picker closed; `None` when dismissed
    GalleryFinished(Option<ImageRef>),
    /// Preview decoded for an image
    PreviewLoaded(ImageRef, Option<Handle>),

    // ===== Recognition =====
    /// "Translate" pressed
    Translate,
    /// Recognition finished for the request with this generation
    RecognitionFinished(u64, Result<String, RecognitionError>),

    // ===== Translation Experiment =====
    TranslationExperimentFinished(Result<ExperimentReport, TranslationError>),
}
