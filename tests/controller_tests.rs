// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the screen flows
//!
//! The controller is driven the way `AppModel` drives it: recognition
//! effects run through a real `RecognitionAdapter` backed by a fake engine,
//! and permission effects are answered by a fake gate.

use futures::future::BoxFuture;
use image::DynamicImage;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use text_scanner::acquisition::{ImageRef, ImageSource};
use text_scanner::app::{Effect, Notice, ScreenController};
use text_scanner::errors::{AcquisitionError, RecognitionError};
use text_scanner::permissions::{Permission, PermissionGate, PermissionRequest};
use text_scanner::recognition::{RecognitionAdapter, TextRecognizer};

struct FakeEngine {
    text: String,
    calls: AtomicUsize,
}

impl FakeEngine {
    fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for FakeEngine {
    fn prepare(&self) -> BoxFuture<'static, Result<(), RecognitionError>> {
        Box::pin(async { Ok(()) })
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<String, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Grants whatever the user says yes to
struct FakeGate {
    granted: Mutex<HashSet<Permission>>,
    user_answer: bool,
    requests: AtomicUsize,
}

impl FakeGate {
    fn new(granted: &[Permission], user_answer: bool) -> Self {
        Self {
            granted: Mutex::new(granted.iter().copied().collect()),
            user_answer,
            requests: AtomicUsize::new(0),
        }
    }
}

impl PermissionGate for FakeGate {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted.lock().unwrap().contains(&permission)
    }

    fn request(&self, permissions: &[Permission]) -> BoxFuture<'static, Vec<bool>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.user_answer {
            self.granted.lock().unwrap().extend(permissions.iter().copied());
        }
        let grants = vec![self.user_answer; permissions.len()];
        Box::pin(async move { grants })
    }
}

fn write_png(dir: &Path, name: &str) -> ImageRef {
    let path = dir.join(name);
    DynamicImage::new_rgb8(16, 16).save(&path).unwrap();
    ImageRef::from_path(path)
}

/// Run a recognition effect to completion and feed the result back
async fn press_translate(
    controller: &mut ScreenController,
    adapter: &RecognitionAdapter,
) -> Effect {
    match controller.on_translate_pressed() {
        Effect::Recognize { image, generation } => {
            let result = adapter.recognize(Some(image)).await;
            controller.on_recognition_finished(generation, result)
        }
        other => other,
    }
}

#[tokio::test]
async fn test_scenario_a_gallery_after_storage_grant() {
    let gate = FakeGate::new(&[], true);
    let mut controller = ScreenController::new();

    controller.on_take_image();
    assert!(controller.menu_open());

    let effect = controller.on_menu_choice(ImageSource::Gallery, &gate);
    assert!(!controller.menu_open());
    assert_eq!(effect, Effect::RequestPermissions(PermissionRequest::Storage));

    let result = gate.request_access(PermissionRequest::Storage).await;
    assert_eq!(controller.on_permission_result(&result), Effect::LaunchGallery);
    assert_eq!(gate.requests.load(Ordering::SeqCst), 1);

    let dir = tempfile::tempdir().unwrap();
    let picked = write_png(dir.path(), "receipt.png");
    assert_eq!(
        controller.on_gallery_result(Some(picked.clone())),
        Effect::ShowPreview(picked.clone())
    );
    assert_eq!(controller.image(), Some(&picked));
}

#[tokio::test]
async fn test_camera_denial_launches_nothing() {
    let gate = FakeGate::new(&[], false);
    let mut controller = ScreenController::new();

    let effect = controller.on_menu_choice(ImageSource::Camera, &gate);
    assert_eq!(effect, Effect::RequestPermissions(PermissionRequest::Camera));

    let result = gate.request_camera_access().await;
    assert_eq!(
        controller.on_permission_result(&result),
        Effect::Notify(Notice::CameraPermissionDenied)
    );
    assert_eq!(controller.image(), None);
}

#[tokio::test]
async fn test_scenario_b_recognized_text_is_displayed() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::returning("HELLO");
    let adapter = RecognitionAdapter::new(engine.clone());
    let mut controller = ScreenController::new();

    let image = write_png(dir.path(), "page.png");
    controller.on_gallery_result(Some(image));

    let effect = press_translate(&mut controller, &adapter).await;
    assert_eq!(effect, Effect::None);
    assert_eq!(controller.recognized_text(), "HELLO");
    assert!(!controller.is_recognizing());
    assert_eq!(engine.calls(), 1);

    // Same reference, same text
    press_translate(&mut controller, &adapter).await;
    assert_eq!(controller.recognized_text(), "HELLO");
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_recognized_text_is_not_altered() {
    let dir = tempfile::tempdir().unwrap();
    let text = "  Line one\n\tLine two  \n";
    let adapter = RecognitionAdapter::new(FakeEngine::returning(text));
    let mut controller = ScreenController::new();

    controller.on_gallery_result(Some(write_png(dir.path(), "page.png")));
    press_translate(&mut controller, &adapter).await;

    assert_eq!(controller.recognized_text(), text);
}

#[tokio::test]
async fn test_scenario_c_no_image_selected() {
    let engine = FakeEngine::returning("HELLO");
    let adapter = RecognitionAdapter::new(engine.clone());
    let mut controller = ScreenController::new();

    let effect = press_translate(&mut controller, &adapter).await;
    assert_eq!(effect, Effect::Notify(Notice::PickImageFirst));
    assert_eq!(controller.recognized_text(), "");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_scenario_d_corrupt_image() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::returning("HELLO");
    let adapter = RecognitionAdapter::new(engine.clone());
    let mut controller = ScreenController::new();

    controller.on_gallery_result(Some(write_png(dir.path(), "good.png")));
    press_translate(&mut controller, &adapter).await;
    assert_eq!(controller.recognized_text(), "HELLO");

    let corrupt = dir.path().join("corrupt.jpg");
    std::fs::write(&corrupt, b"definitely not a jpeg").unwrap();
    controller.on_gallery_result(Some(ImageRef::from_path(corrupt)));

    let effect = press_translate(&mut controller, &adapter).await;
    match effect {
        Effect::Notify(Notice::LoadFailed(message)) => assert!(!message.is_empty()),
        other => panic!("expected a load failure notice, got {:?}", other),
    }
    assert_eq!(controller.recognized_text(), "HELLO");
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_new_image_replaces_previous() {
    let dir = tempfile::tempdir().unwrap();
    let mut controller = ScreenController::new();

    let first = write_png(dir.path(), "first.png");
    let second = write_png(dir.path(), "second.png");
    controller.on_gallery_result(Some(first));
    controller.on_gallery_result(Some(second.clone()));
    assert_eq!(controller.image(), Some(&second));

    // Dismissing the picker keeps the current image
    assert_eq!(controller.on_gallery_result(None), Effect::None);
    assert_eq!(controller.image(), Some(&second));
}

#[test]
fn test_failed_capture_keeps_prior_image() {
    let dir = tempfile::tempdir().unwrap();
    let mut controller = ScreenController::new();
    let prior = write_png(dir.path(), "prior.png");
    controller.on_gallery_result(Some(prior.clone()));

    let target = text_scanner::storage::create_capture_target(dir.path()).unwrap();
    assert_eq!(
        controller.begin_capture(target.clone()),
        Effect::Capture(target.clone())
    );
    assert!(controller.is_capturing());

    let effect = controller.on_camera_result(Err(AcquisitionError::CameraUnavailable(
        "no camera".into(),
    )));
    assert_eq!(effect, Effect::DiscardCaptureTarget(target.clone()));
    assert!(!controller.is_capturing());
    assert_eq!(controller.image(), Some(&prior));

    text_scanner::storage::discard_capture_target(&target);
    assert!(!target.path().exists());
}
