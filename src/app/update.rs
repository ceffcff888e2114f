// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function routes messages to handler methods in the
//! `handlers` submodules. Controller transitions come back as [`Effect`]s,
//! which `run_effect` turns into tasks.
//!
//! # Handler Modules
//!
//! - `handlers::ui`: Navigation, context drawer, source menu, toasts
//! - `handlers::acquisition`: Permissions, camera capture, gallery picker
//! - `handlers::recognition`: Text recognition
//! - `handlers::system`: Configuration, translation experiment

use crate::app::controller::{Effect, Notice};
use crate::app::state::{AppModel, Message};
use crate::fl;
use cosmic::Task;
use tracing::debug;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),
            Message::Surface(action) => {
                cosmic::task::message(cosmic::Action::Cosmic(cosmic::app::Action::Surface(action)))
            }
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(theme) => self.handle_set_app_theme(theme),
            Message::CloseToast(id) => self.handle_close_toast(id),
            Message::TextAction(action) => self.handle_text_action(action),
            Message::Noop => Task::none(),

            // ===== Image Acquisition =====
            Message::TakeImage => self.handle_take_image(),
            Message::CloseSourceMenu => self.handle_close_source_menu(),
            Message::SourceChosen(source) => self.handle_source_chosen(source),
            Message::PermissionsAnswered(result) => self.handle_permissions_answered(result),
            Message::CaptureTargetCreated(result) => self.handle_capture_target_created(result),
            Message::CameraFinished(result) => self.handle_camera_finished(result),
            Message::GalleryFinished(picked) => self.handle_gallery_finished(picked),
            Message::PreviewLoaded(image, handle) => self.handle_preview_loaded(image, handle),

            // ===== Recognition =====
            Message::Translate => self.handle_translate(),
            Message::RecognitionFinished(generation, result) => {
                self.handle_recognition_finished(generation, result)
            }

            // ===== Translation Experiment =====
            Message::TranslationExperimentFinished(result) => {
                self.handle_translation_experiment_finished(result)
            }
        }
    }

    /// Execute the work a controller transition asked for
    pub(crate) fn run_effect(&mut self, effect: Effect) -> Task<cosmic::Action<Message>> {
        debug!(?effect, "Running effect");
        match effect {
            Effect::None => Task::none(),
            Effect::RequestPermissions(request) => self.request_permissions(request),
            Effect::LaunchCamera => self.launch_camera(),
            Effect::LaunchGallery => self.launch_gallery(),
            Effect::Capture(target) => self.start_capture(target),
            Effect::Recognize { image, generation } => self.start_recognition(image, generation),
            Effect::ShowPreview(image) => self.load_preview(image),
            Effect::DiscardCaptureTarget(target) => self.discard_capture_target(target),
            Effect::Notify(notice) => self.notify(notice),
        }
    }

    /// Show a notice as a toast
    pub(crate) fn notify(&mut self, notice: Notice) -> Task<cosmic::Action<Message>> {
        let text = match notice {
            Notice::PickImageFirst => fl!("pick-image-first"),
            Notice::RecognitionFailed(error) => fl!("recognition-failed", error = error),
            Notice::LoadFailed(error) => fl!("image-load-failed", error = error),
            Notice::CameraPermissionDenied => fl!("camera-permission-denied"),
            Notice::StoragePermissionDenied => fl!("storage-permission-denied"),
            Notice::CaptureTargetFailed(error) => fl!("capture-target-failed", error = error),
        };
        self.toasts
            .push(cosmic::widget::toaster::Toast::new(text))
            .map(cosmic::Action::App)
    }
}
