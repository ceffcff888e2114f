// SPDX-License-Identifier: GPL-3.0-only

//! Image acquisition handlers
//!
//! Permission requests, the camera still-capture flow, and the gallery
//! picker. Every flow ends in a message the controller turns into the next
//! effect.

use crate::acquisition::{CaptureSettings, ImageRef, ImageSource, camera, gallery};
use crate::app::state::{AppModel, Message};
use crate::errors::AcquisitionError;
use crate::fl;
use crate::permissions::{PermissionGate, PermissionRequest, PermissionResult};
use cosmic::Task;
use cosmic::widget::image::Handle;
use tracing::{debug, info, warn};

impl AppModel {
    pub(crate) fn handle_source_chosen(
        &mut self,
        source: ImageSource,
    ) -> Task<cosmic::Action<Message>> {
        info!(?source, "Image source chosen");
        let effect = self
            .controller
            .on_menu_choice(source, self.permissions.as_ref());
        self.run_effect(effect)
    }

    pub(crate) fn request_permissions(
        &self,
        request: PermissionRequest,
    ) -> Task<cosmic::Action<Message>> {
        info!(?request, "Requesting permissions");
        let pending = self.permissions.request_access(request);
        Task::perform(pending, |result| {
            cosmic::Action::App(Message::PermissionsAnswered(result))
        })
    }

    pub(crate) fn handle_permissions_answered(
        &mut self,
        result: PermissionResult,
    ) -> Task<cosmic::Action<Message>> {
        let effect = self.controller.on_permission_result(&result);
        self.run_effect(effect)
    }

    // =========================================================================
    // Camera
    // =========================================================================

    /// Create the capture target off the UI thread
    pub(crate) fn launch_camera(&self) -> Task<cosmic::Action<Message>> {
        let photo_dir = self.photo_dir.clone();
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    crate::storage::create_capture_target(&photo_dir)
                        .map_err(|e| AcquisitionError::CaptureTarget(e.to_string()))
                })
                .await
                .map_err(|e| AcquisitionError::CaptureTarget(e.to_string()))?
            },
            |result| cosmic::Action::App(Message::CaptureTargetCreated(result)),
        )
    }

    pub(crate) fn handle_capture_target_created(
        &mut self,
        result: Result<ImageRef, AcquisitionError>,
    ) -> Task<cosmic::Action<Message>> {
        let effect = match result {
            Ok(target) => self.controller.begin_capture(target),
            Err(error) => self.controller.on_capture_target_failed(&error),
        };
        self.run_effect(effect)
    }

    pub(crate) fn start_capture(&self, target: ImageRef) -> Task<cosmic::Action<Message>> {
        let settings = CaptureSettings::from_config(&self.config);
        info!(target = %target, source = %settings.source, "Starting camera capture");
        Task::perform(camera::capture_to(settings, target), |result| {
            cosmic::Action::App(Message::CameraFinished(result))
        })
    }

    pub(crate) fn handle_camera_finished(
        &mut self,
        result: Result<ImageRef, AcquisitionError>,
    ) -> Task<cosmic::Action<Message>> {
        let effect = self.controller.on_camera_result(result);
        self.run_effect(effect)
    }

    pub(crate) fn discard_capture_target(&self, target: ImageRef) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                let _ = tokio::task::spawn_blocking(move || {
                    crate::storage::discard_capture_target(&target)
                })
                .await;
            },
            |_| cosmic::Action::None,
        )
    }

    // =========================================================================
    // Gallery
    // =========================================================================

    pub(crate) fn launch_gallery(&self) -> Task<cosmic::Action<Message>> {
        let labels = gallery::PickerLabels {
            title: fl!("gallery-dialog-title"),
            filter_name: fl!("gallery-filter-images"),
        };
        let start_dir = Some(self.photo_dir.clone());
        Task::perform(gallery::pick_image(labels, start_dir), |picked| {
            cosmic::Action::App(Message::GalleryFinished(picked))
        })
    }

    pub(crate) fn handle_gallery_finished(
        &mut self,
        picked: Option<ImageRef>,
    ) -> Task<cosmic::Action<Message>> {
        let effect = self.controller.on_gallery_result(picked);
        self.run_effect(effect)
    }

    // =========================================================================
    // Preview
    // =========================================================================

    pub(crate) fn load_preview(&mut self, image: ImageRef) -> Task<cosmic::Action<Message>> {
        // Drop the old preview right away so it never shows next to a new image
        self.preview = None;
        Task::perform(
            async move {
                let handle = crate::storage::load_preview(image.clone()).await;
                (image, handle)
            },
            |(image, handle)| cosmic::Action::App(Message::PreviewLoaded(image, handle)),
        )
    }

    pub(crate) fn handle_preview_loaded(
        &mut self,
        image: ImageRef,
        handle: Option<Handle>,
    ) -> Task<cosmic::Action<Message>> {
        if self.controller.image() != Some(&image) {
            debug!(image = %image, "Ignoring preview of a replaced image");
            return Task::none();
        }
        if handle.is_none() {
            warn!(image = %image, "No preview available");
        }
        self.preview = handle;
        Task::none()
    }
}
