// SPDX-License-Identifier: MPL-2.0

//! Permission gate
//!
//! Checks and requests the capabilities needed before an image can be
//! acquired. Requests complete asynchronously with a [`PermissionResult`]
//! whose grants line up with the permissions of the originating request.

pub mod portal;

pub use portal::DesktopPermissions;

use crate::constants::request_codes;
use futures::future::BoxFuture;
use tracing::{debug, info};

/// A single capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Camera,
    StorageWrite,
}

/// The two requests the screen can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRequest {
    /// Camera and storage-write, for the camera path
    Camera,
    /// Storage-write only, for the gallery path
    Storage,
}

impl PermissionRequest {
    pub fn code(&self) -> u32 {
        match self {
            PermissionRequest::Camera => request_codes::CAMERA,
            PermissionRequest::Storage => request_codes::STORAGE,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            request_codes::CAMERA => Some(PermissionRequest::Camera),
            request_codes::STORAGE => Some(PermissionRequest::Storage),
            _ => None,
        }
    }

    /// Permissions requested, in the order grants are reported
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            PermissionRequest::Camera => &[Permission::Camera, Permission::StorageWrite],
            PermissionRequest::Storage => &[Permission::StorageWrite],
        }
    }
}

/// Outcome of a permission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResult {
    pub request_code: u32,
    /// One flag per requested permission; empty when the prompt was dismissed
    pub grants: Vec<bool>,
}

impl PermissionResult {
    pub fn new(request: PermissionRequest, grants: Vec<bool>) -> Self {
        Self {
            request_code: request.code(),
            grants,
        }
    }

    /// One grant per requested permission, all of them true
    ///
    /// A result reporting fewer or more flags than were requested is not a
    /// grant.
    pub fn all_granted(&self) -> bool {
        let Some(request) = PermissionRequest::from_code(self.request_code) else {
            return false;
        };
        self.grants.len() == request.permissions().len()
            && self.grants.iter().all(|granted| *granted)
    }
}

/// What the screen does with a permission result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    RetryCamera,
    RetryGallery,
    /// Notify the user and stop
    Denied(PermissionRequest),
    /// Dismissed prompt or unknown request code
    Ignore,
}

/// Decide how to react to a permission result
///
/// There is no retry limit: every fully granted result retries its action
/// once, every denial stops.
pub fn decide(result: &PermissionResult) -> PermissionDecision {
    let Some(request) = PermissionRequest::from_code(result.request_code) else {
        debug!(code = result.request_code, "Ignoring result for unknown request code");
        return PermissionDecision::Ignore;
    };

    if result.grants.is_empty() {
        debug!(?request, "Permission request dismissed");
        return PermissionDecision::Ignore;
    }

    let decision = match (request, result.all_granted()) {
        (PermissionRequest::Camera, true) => PermissionDecision::RetryCamera,
        (PermissionRequest::Storage, true) => PermissionDecision::RetryGallery,
        (request, false) => PermissionDecision::Denied(request),
    };
    info!(?request, grants = ?result.grants, ?decision, "Permission result");
    decision
}

/// Capability checks and requests
///
/// `request` resolves to one grant flag per permission, in order.
pub trait PermissionGate: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;

    fn request(&self, permissions: &[Permission]) -> BoxFuture<'static, Vec<bool>>;

    /// Camera and storage-write are both granted
    fn has_camera_access(&self) -> bool {
        PermissionRequest::Camera
            .permissions()
            .iter()
            .all(|p| self.is_granted(*p))
    }

    fn has_storage_access(&self) -> bool {
        self.is_granted(Permission::StorageWrite)
    }

    fn request_access(&self, request: PermissionRequest) -> BoxFuture<'static, PermissionResult> {
        let grants = self.request(request.permissions());
        Box::pin(async move { PermissionResult::new(request, grants.await) })
    }

    fn request_camera_access(&self) -> BoxFuture<'static, PermissionResult> {
        self.request_access(PermissionRequest::Camera)
    }

    fn request_storage_access(&self) -> BoxFuture<'static, PermissionResult> {
        self.request_access(PermissionRequest::Storage)
    }
}
