// SPDX-License-Identifier: MPL-2.0

//! Desktop permission backend
//!
//! Camera access goes through the XDG camera portal when it is reachable.
//! Outside a sandbox the `/dev/video*` nodes decide when it is not. Storage
//! access is plain filesystem writability of the photo directory.

use super::{Permission, PermissionGate};
use crate::constants::app_info;
use crate::errors::PermissionError;
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_SERVICE: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Permission gate for the Linux desktop
#[derive(Debug, Clone)]
pub struct DesktopPermissions {
    photo_dir: PathBuf,
    /// Set once the camera portal granted access in this session
    camera_granted: Arc<AtomicBool>,
}

impl DesktopPermissions {
    pub fn new(photo_dir: PathBuf) -> Self {
        Self {
            photo_dir,
            camera_granted: Arc::new(AtomicBool::new(false)),
        }
    }

    fn camera_available(&self) -> bool {
        self.camera_granted.load(Ordering::Relaxed)
            || (!app_info::is_flatpak() && video_nodes_accessible(Path::new("/dev")))
    }

    async fn request_camera(camera_granted: Arc<AtomicBool>) -> bool {
        match access_camera().await {
            Ok(granted) => {
                info!(granted, "Camera portal answered");
                camera_granted.store(granted, Ordering::Relaxed);
                granted
            }
            Err(e) if app_info::is_flatpak() => {
                warn!(error = %e, "Camera portal failed inside sandbox");
                false
            }
            Err(e) => {
                debug!(error = %e, "Camera portal unavailable, checking device nodes");
                video_nodes_accessible(Path::new("/dev"))
            }
        }
    }

    async fn request_storage(photo_dir: PathBuf) -> bool {
        let dir = photo_dir.clone();
        let created = tokio::task::spawn_blocking(move || std::fs::create_dir_all(&dir)).await;
        match created {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(dir = %photo_dir.display(), error = %e, "Failed to create photo directory")
            }
            Err(e) => warn!(error = %e, "Photo directory task failed"),
        }
        storage_writable(&photo_dir)
    }
}

impl PermissionGate for DesktopPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        match permission {
            Permission::Camera => self.camera_available(),
            Permission::StorageWrite => storage_writable(&self.photo_dir),
        }
    }

    fn request(&self, permissions: &[Permission]) -> BoxFuture<'static, Vec<bool>> {
        let permissions = permissions.to_vec();
        let camera_granted = Arc::clone(&self.camera_granted);
        let photo_dir = self.photo_dir.clone();

        Box::pin(async move {
            let mut grants = Vec::with_capacity(permissions.len());
            for permission in permissions {
                let granted = match permission {
                    Permission::Camera => Self::request_camera(Arc::clone(&camera_granted)).await,
                    Permission::StorageWrite => Self::request_storage(photo_dir.clone()).await,
                };
                grants.push(granted);
            }
            grants
        })
    }
}

/// Ask the camera portal for access and wait for the user's answer
async fn access_camera() -> Result<bool, PermissionError> {
    let connection = zbus::Connection::session()
        .await
        .map_err(|e| PermissionError::PortalUnavailable(e.to_string()))?;

    let camera = zbus::Proxy::new(&connection, PORTAL_SERVICE, PORTAL_PATH, CAMERA_INTERFACE)
        .await
        .map_err(|e| PermissionError::PortalUnavailable(e.to_string()))?;

    let present: bool = camera
        .get_property("IsCameraPresent")
        .await
        .map_err(|e| PermissionError::PortalUnavailable(e.to_string()))?;
    if !present {
        info!("Camera portal reports no camera");
        return Ok(false);
    }

    let sender = connection
        .unique_name()
        .ok_or_else(|| PermissionError::RequestFailed("No unique bus name".into()))?;
    let token = format!("text_scanner_{}", uuid::Uuid::new_v4().simple());
    let handle = request_handle_path(sender.as_str(), &token);

    // Subscribe before calling so the Response signal cannot be missed
    let request = zbus::Proxy::new(&connection, PORTAL_SERVICE, handle.as_str(), REQUEST_INTERFACE)
        .await
        .map_err(|e| PermissionError::RequestFailed(e.to_string()))?;
    let mut responses = request
        .receive_signal("Response")
        .await
        .map_err(|e| PermissionError::RequestFailed(e.to_string()))?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));

    let returned: OwnedObjectPath = camera
        .call("AccessCamera", &(options,))
        .await
        .map_err(|e| PermissionError::RequestFailed(e.to_string()))?;
    if returned.as_str() != handle {
        debug!(expected = %handle, returned = %returned, "Portal returned a different request handle");
    }

    let message = responses
        .next()
        .await
        .ok_or_else(|| PermissionError::RequestFailed("Portal closed the request".into()))?;
    let (response, _results): (u32, HashMap<String, OwnedValue>) = message
        .body()
        .deserialize()
        .map_err(|e| PermissionError::RequestFailed(e.to_string()))?;

    // 0 = granted, 1 = cancelled, 2 = other
    Ok(response == 0)
}

/// Object path the portal uses for a request made with `token`
fn request_handle_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("/org/freedesktop/portal/desktop/request/{}/{}", sender, token)
}

/// Any `video*` node in `dev_dir` we can open read-write
fn video_nodes_accessible(dev_dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dev_dir) else {
        return false;
    };

    entries.flatten().any(|entry| {
        entry.file_name().to_string_lossy().starts_with("video")
            && has_access(&entry.path(), libc::R_OK | libc::W_OK)
    })
}

/// The photo directory is writable, or can be created in a writable parent
fn storage_writable(dir: &Path) -> bool {
    if dir.is_dir() {
        return has_access(dir, libc::W_OK);
    }
    if dir.exists() {
        return false;
    }
    dir.ancestors()
        .skip(1)
        .find(|ancestor| ancestor.is_dir())
        .is_some_and(|ancestor| has_access(ancestor, libc::W_OK))
}

fn has_access(path: &Path, mode: libc::c_int) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_handle_path() {
        assert_eq!(
            request_handle_path(":1.42", "text_scanner_abc"),
            "/org/freedesktop/portal/desktop/request/1_42/text_scanner_abc"
        );
    }

    #[test]
    fn test_storage_writable_for_existing_and_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(storage_writable(dir.path()));
        assert!(storage_writable(&dir.path().join("new").join("nested")));

        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(!storage_writable(&file));
    }

    #[test]
    fn test_no_video_nodes_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!video_nodes_accessible(dir.path()));

        std::fs::write(dir.path().join("video0"), b"").unwrap();
        assert!(video_nodes_accessible(dir.path()));
    }

    #[tokio::test]
    async fn test_storage_request_creates_photo_dir() {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("text-scanner");
        let gate = DesktopPermissions::new(photos.clone());

        let result = gate.request_storage_access().await;

        assert_eq!(result.grants, vec![true]);
        assert!(photos.is_dir());
        assert!(gate.has_storage_access());
    }
}
