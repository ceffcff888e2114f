// SPDX-License-Identifier: GPL-3.0-only

//! Screen controller
//!
//! Owns the screen state (active image, pending capture target, recognized
//! text, menu visibility) and decides what happens next for every user action
//! and async result. It performs no I/O: each transition returns an
//! [`Effect`] that `AppModel` turns into a task.

use crate::acquisition::{ImageRef, ImageSource};
use crate::errors::{AcquisitionError, RecognitionError};
use crate::permissions::{
    self, PermissionDecision, PermissionGate, PermissionRequest, PermissionResult,
};
use tracing::{debug, info, warn};

/// User-facing notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PickImageFirst,
    RecognitionFailed(String),
    LoadFailed(String),
    CameraPermissionDenied,
    StoragePermissionDenied,
    CaptureTargetFailed(String),
}

/// Work requested by a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    RequestPermissions(PermissionRequest),
    /// Create a capture target, then call [`ScreenController::begin_capture`]
    LaunchCamera,
    LaunchGallery,
    /// Run the still capture into the pending target
    Capture(ImageRef),
    Recognize { image: ImageRef, generation: u64 },
    ShowPreview(ImageRef),
    DiscardCaptureTarget(ImageRef),
    Notify(Notice),
}

#[derive(Debug, Default)]
pub struct ScreenController {
    image: Option<ImageRef>,
    pending_capture: Option<ImageRef>,
    recognized_text: String,
    menu_open: bool,
    /// Bumped for every recognition request; results of older ones are dropped
    generation: u64,
    recognizing: bool,
}

impl ScreenController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn recognized_text(&self) -> &str {
        &self.recognized_text
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn is_capturing(&self) -> bool {
        self.pending_capture.is_some()
    }

    pub fn is_recognizing(&self) -> bool {
        self.recognizing
    }

    /// "Take image" pressed: show or hide the source menu
    pub fn on_take_image(&mut self) -> Effect {
        self.menu_open = !self.menu_open;
        Effect::None
    }

    pub fn close_menu(&mut self) -> Effect {
        self.menu_open = false;
        Effect::None
    }

    /// A menu entry was chosen
    pub fn on_menu_choice(&mut self, source: ImageSource, gate: &dyn PermissionGate) -> Effect {
        self.menu_open = false;
        match source {
            ImageSource::Camera if gate.has_camera_access() => Effect::LaunchCamera,
            ImageSource::Camera => Effect::RequestPermissions(PermissionRequest::Camera),
            ImageSource::Gallery if gate.has_storage_access() => Effect::LaunchGallery,
            ImageSource::Gallery => Effect::RequestPermissions(PermissionRequest::Storage),
        }
    }

    pub fn on_permission_result(&mut self, result: &PermissionResult) -> Effect {
        match permissions::decide(result) {
            PermissionDecision::RetryCamera => Effect::LaunchCamera,
            PermissionDecision::RetryGallery => Effect::LaunchGallery,
            PermissionDecision::Denied(PermissionRequest::Camera) => {
                Effect::Notify(Notice::CameraPermissionDenied)
            }
            PermissionDecision::Denied(PermissionRequest::Storage) => {
                Effect::Notify(Notice::StoragePermissionDenied)
            }
            PermissionDecision::Ignore => Effect::None,
        }
    }

    /// A capture target was created for the camera flow
    ///
    /// Only one capture runs at a time; a second target is discarded.
    pub fn begin_capture(&mut self, target: ImageRef) -> Effect {
        if let Some(running) = &self.pending_capture {
            warn!(running = %running, target = %target, "Capture already running");
            return Effect::DiscardCaptureTarget(target);
        }
        self.pending_capture = Some(target.clone());
        Effect::Capture(target)
    }

    pub fn on_capture_target_failed(&mut self, error: &AcquisitionError) -> Effect {
        warn!(%error, "Could not create capture target");
        Effect::Notify(Notice::CaptureTargetFailed(error.to_string()))
    }

    /// The camera flow finished
    ///
    /// On success the pending target becomes the active image. Otherwise
    /// the prior image stays active and the unused target is discarded.
    pub fn on_camera_result(&mut self, result: Result<ImageRef, AcquisitionError>) -> Effect {
        let pending = self.pending_capture.take();
        match result {
            Ok(image) => {
                if pending.as_ref() != Some(&image) {
                    debug!(image = %image, "Capture finished for a target that is no longer pending");
                }
                info!(image = %image, "Camera image acquired");
                self.image = Some(image.clone());
                Effect::ShowPreview(image)
            }
            Err(error) => {
                warn!(%error, "Camera capture did not produce an image");
                pending.map_or(Effect::None, Effect::DiscardCaptureTarget)
            }
        }
    }

    /// The gallery picker finished; `None` means dismissed
    pub fn on_gallery_result(&mut self, picked: Option<ImageRef>) -> Effect {
        match picked {
            Some(image) => {
                self.image = Some(image.clone());
                Effect::ShowPreview(image)
            }
            None => Effect::None,
        }
    }

    /// "Translate" pressed: recognize the active image
    pub fn on_translate_pressed(&mut self) -> Effect {
        let Some(image) = self.image.clone() else {
            return Effect::Notify(Notice::PickImageFirst);
        };
        self.generation += 1;
        self.recognizing = true;
        Effect::Recognize {
            image,
            generation: self.generation,
        }
    }

    pub fn on_recognition_finished(
        &mut self,
        generation: u64,
        result: Result<String, RecognitionError>,
    ) -> Effect {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "Dropping superseded recognition result");
            return Effect::None;
        }
        self.recognizing = false;

        match result {
            Ok(text) => {
                self.recognized_text = text;
                Effect::None
            }
            Err(RecognitionError::NoImageSelected) => Effect::Notify(Notice::PickImageFirst),
            Err(RecognitionError::Load(message)) => Effect::Notify(Notice::LoadFailed(message)),
            Err(RecognitionError::Engine(message)) => {
                Effect::Notify(Notice::RecognitionFailed(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::request_codes;
    use crate::permissions::Permission;
    use futures::future::BoxFuture;

    struct Granted(bool);

    impl PermissionGate for Granted {
        fn is_granted(&self, _permission: Permission) -> bool {
            self.0
        }

        fn request(&self, permissions: &[Permission]) -> BoxFuture<'static, Vec<bool>> {
            let grants = vec![self.0; permissions.len()];
            Box::pin(async move { grants })
        }
    }

    fn with_image(path: &str) -> ScreenController {
        let mut controller = ScreenController::new();
        controller.on_gallery_result(Some(ImageRef::from_path(path)));
        controller
    }

    #[test]
    fn test_take_image_toggles_menu() {
        let mut controller = ScreenController::new();
        controller.on_take_image();
        assert!(controller.menu_open());
        controller.on_take_image();
        assert!(!controller.menu_open());
    }

    #[test]
    fn test_menu_choice_with_access_launches_directly() {
        let mut controller = ScreenController::new();
        controller.on_take_image();

        assert_eq!(
            controller.on_menu_choice(ImageSource::Camera, &Granted(true)),
            Effect::LaunchCamera
        );
        assert!(!controller.menu_open());
        assert_eq!(
            controller.on_menu_choice(ImageSource::Gallery, &Granted(true)),
            Effect::LaunchGallery
        );
    }

    #[test]
    fn test_menu_choice_without_access_requests() {
        let mut controller = ScreenController::new();
        assert_eq!(
            controller.on_menu_choice(ImageSource::Camera, &Granted(false)),
            Effect::RequestPermissions(PermissionRequest::Camera)
        );
        assert_eq!(
            controller.on_menu_choice(ImageSource::Gallery, &Granted(false)),
            Effect::RequestPermissions(PermissionRequest::Storage)
        );
    }

    #[test]
    fn test_denied_permission_notifies() {
        let mut controller = ScreenController::new();
        let result = PermissionResult {
            request_code: request_codes::CAMERA,
            grants: vec![true, false],
        };
        assert_eq!(
            controller.on_permission_result(&result),
            Effect::Notify(Notice::CameraPermissionDenied)
        );
        assert!(controller.image().is_none());
    }

    #[test]
    fn test_camera_success_promotes_target() {
        let mut controller = with_image("/tmp/old.png");
        let target = ImageRef::from_path("/tmp/scan_1.jpg");

        assert_eq!(
            controller.begin_capture(target.clone()),
            Effect::Capture(target.clone())
        );
        assert!(controller.is_capturing());
        assert_eq!(
            controller.on_camera_result(Ok(target.clone())),
            Effect::ShowPreview(target.clone())
        );
        assert_eq!(controller.image(), Some(&target));
        assert!(!controller.is_capturing());
    }

    #[test]
    fn test_camera_failure_keeps_prior_image() {
        let mut controller = with_image("/tmp/old.png");
        let target = ImageRef::from_path("/tmp/scan_2.jpg");
        controller.begin_capture(target.clone());

        let effect = controller.on_camera_result(Err(AcquisitionError::NoFrame));

        assert_eq!(effect, Effect::DiscardCaptureTarget(target));
        assert_eq!(controller.image(), Some(&ImageRef::from_path("/tmp/old.png")));
    }

    #[test]
    fn test_second_capture_target_is_discarded() {
        let mut controller = ScreenController::new();
        let running = ImageRef::from_path("/tmp/scan_3.jpg");
        let extra = ImageRef::from_path("/tmp/scan_4.jpg");
        controller.begin_capture(running.clone());

        assert_eq!(
            controller.begin_capture(extra.clone()),
            Effect::DiscardCaptureTarget(extra)
        );
        assert_eq!(
            controller.on_camera_result(Ok(running.clone())),
            Effect::ShowPreview(running)
        );
    }

    #[test]
    fn test_dismissed_gallery_keeps_prior_image() {
        let mut controller = with_image("/tmp/old.png");
        assert_eq!(controller.on_gallery_result(None), Effect::None);
        assert_eq!(controller.image(), Some(&ImageRef::from_path("/tmp/old.png")));
    }

    #[test]
    fn test_superseded_recognition_is_dropped() {
        let mut controller = with_image("/tmp/page.png");
        let Effect::Recognize { generation: first, .. } = controller.on_translate_pressed() else {
            panic!("expected recognition");
        };
        let Effect::Recognize { generation: second, .. } = controller.on_translate_pressed() else {
            panic!("expected recognition");
        };

        controller.on_recognition_finished(second, Ok("new".into()));
        controller.on_recognition_finished(first, Ok("old".into()));

        assert_eq!(controller.recognized_text(), "new");
        assert!(!controller.is_recognizing());
    }

    #[test]
    fn test_engine_error_keeps_text() {
        let mut controller = with_image("/tmp/page.png");
        let Effect::Recognize { generation, .. } = controller.on_translate_pressed() else {
            panic!("expected recognition");
        };
        controller.on_recognition_finished(generation, Ok("first".into()));

        let Effect::Recognize { generation, .. } = controller.on_translate_pressed() else {
            panic!("expected recognition");
        };
        let effect = controller.on_recognition_finished(
            generation,
            Err(RecognitionError::Engine("model crashed".into())),
        );

        assert_eq!(
            effect,
            Effect::Notify(Notice::RecognitionFailed("model crashed".into()))
        );
        assert_eq!(controller.recognized_text(), "first");
    }
}
