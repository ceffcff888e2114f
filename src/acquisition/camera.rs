// SPDX-License-Identifier: MPL-2.0

//! One-shot still capture through GStreamer
//!
//! The camera is opened only for the duration of a capture. Frames are pulled
//! from an appsink until the warm-up period has passed, the most recent frame
//! is encoded to JPEG at the capture target, and the pipeline is torn down.

use super::ImageRef;
use crate::config::Config;
use crate::constants::capture;
use crate::errors::AcquisitionError;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// GStreamer source element used for capture
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum CaptureSource {
    /// pipewiresrc (works in Flatpak through the camera portal)
    #[default]
    PipeWire,
    /// v4l2src, direct device access
    V4l2,
    /// autovideosrc, whatever GStreamer picks
    Auto,
}

impl CaptureSource {
    pub fn element_name(&self) -> &'static str {
        match self {
            CaptureSource::PipeWire => "pipewiresrc",
            CaptureSource::V4l2 => "v4l2src",
            CaptureSource::Auto => "autovideosrc",
        }
    }

    /// Source element with its device property, ready for `parse::launch`
    fn element_description(&self, device: Option<&str>) -> String {
        let device = device.map(str::trim).filter(|d| !d.is_empty());
        match (self, device) {
            (CaptureSource::PipeWire, Some(device)) => {
                format!("pipewiresrc {}", pipewire_target(device))
            }
            (CaptureSource::V4l2, Some(device)) => format!("v4l2src device={}", device),
            (CaptureSource::Auto, Some(device)) => {
                debug!(device, "autovideosrc ignores the configured device");
                "autovideosrc".to_string()
            }
            (source, None) => source.element_name().to_string(),
        }
    }
}

impl std::fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureSource::PipeWire => write!(f, "PipeWire"),
            CaptureSource::V4l2 => write!(f, "V4L2"),
            CaptureSource::Auto => write!(f, "Auto"),
        }
    }
}

/// Map a configured device string to the pipewiresrc property selecting it
fn pipewire_target(device: &str) -> String {
    if device.starts_with("v4l2:") {
        format!("path={}", device)
    } else if let Some(serial) = device.strip_prefix("pipewire-serial-") {
        format!("target-object={}", serial)
    } else if let Some(node_id) = device.strip_prefix("pipewire-") {
        format!("target-object={}", node_id)
    } else if device.starts_with("/dev/video") {
        // V4L2 node exposed through PipeWire
        format!("path=v4l2:{}", device)
    } else {
        format!("target-object={}", device)
    }
}

/// Everything needed to take one still
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub source: CaptureSource,
    pub device: Option<String>,
    pub warmup: Duration,
    pub timeout: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            source: CaptureSource::default(),
            device: None,
            warmup: Duration::from_millis(capture::DEFAULT_WARMUP_MS),
            timeout: capture::FRAME_TIMEOUT,
        }
    }
}

impl CaptureSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source: config.capture_source,
            device: config.camera_device.clone(),
            warmup: config.capture_warmup(),
            timeout: capture::FRAME_TIMEOUT,
        }
    }

    /// Full pipeline description ending in an RGB appsink named "sink"
    pub fn pipeline_description(&self) -> String {
        format!(
            "{} ! videoconvert ! video/x-raw,format=RGB ! \
             appsink name=sink max-buffers=1 drop=true sync=false",
            self.source.element_description(self.device.as_deref())
        )
    }
}

/// Capture a still into `target` without blocking the async runtime
pub async fn capture_to(
    settings: CaptureSettings,
    target: ImageRef,
) -> Result<ImageRef, AcquisitionError> {
    tokio::task::spawn_blocking(move || {
        capture_still(&settings, target.path())?;
        Ok(target)
    })
    .await
    .map_err(|e| AcquisitionError::Pipeline(format!("Capture task failed: {}", e)))?
}

/// Capture a still into `target` (blocking)
pub fn capture_still(settings: &CaptureSettings, target: &Path) -> Result<(), AcquisitionError> {
    gstreamer::init()?;

    if gstreamer::ElementFactory::find(settings.source.element_name()).is_none() {
        return Err(AcquisitionError::CameraUnavailable(format!(
            "{} not available: factory not found",
            settings.source.element_name()
        )));
    }

    let description = settings.pipeline_description();
    info!(pipeline = %description, target = %target.display(), "Starting still capture");

    let pipeline = gstreamer::parse::launch(&description)?
        .downcast::<gstreamer::Pipeline>()
        .map_err(|_| AcquisitionError::Pipeline("Failed to downcast to Pipeline".into()))?;

    let appsink = pipeline
        .by_name("sink")
        .ok_or_else(|| AcquisitionError::Pipeline("Failed to find appsink".into()))?
        .downcast::<AppSink>()
        .map_err(|_| AcquisitionError::Pipeline("Failed to downcast to AppSink".into()))?;

    pipeline
        .set_state(gstreamer::State::Playing)
        .map_err(|e| AcquisitionError::CameraUnavailable(format!("{:?}", e)))?;

    let result = pull_settled_sample(&pipeline, &appsink, settings);
    let _ = pipeline.set_state(gstreamer::State::Null);

    let sample = result?;
    let (width, height, rgb) = sample_to_rgb(&sample)?;
    write_jpeg(target, width, height, &rgb)?;

    info!(width, height, target = %target.display(), "Still captured");
    Ok(())
}

/// Pull frames until the warm-up has elapsed and return the latest one
fn pull_settled_sample(
    pipeline: &gstreamer::Pipeline,
    appsink: &AppSink,
    settings: &CaptureSettings,
) -> Result<gstreamer::Sample, AcquisitionError> {
    let start = Instant::now();
    let bus = pipeline
        .bus()
        .ok_or_else(|| AcquisitionError::Pipeline("Pipeline has no bus".into()))?;
    let mut latest: Option<gstreamer::Sample> = None;
    let mut frames = 0u32;

    while start.elapsed() < settings.timeout {
        // Surface source errors (busy device, missing permission) immediately
        while let Some(msg) = bus.pop() {
            if let gstreamer::MessageView::Error(err) = msg.view() {
                return Err(AcquisitionError::CameraUnavailable(err.error().to_string()));
            }
        }

        match appsink.try_pull_sample(gstreamer::ClockTime::from_mseconds(
            capture::PULL_INTERVAL_MS,
        )) {
            Some(sample) => {
                frames += 1;
                latest = Some(sample);
                if start.elapsed() >= settings.warmup {
                    break;
                }
            }
            None if appsink.is_eos() => {
                warn!(frames, "Camera stream ended during capture");
                break;
            }
            None => {}
        }
    }

    debug!(frames, elapsed_ms = start.elapsed().as_millis(), "Frame pulling finished");
    latest.ok_or(AcquisitionError::NoFrame)
}

/// Copy a packed RGB sample into a tightly packed buffer (drops stride padding)
fn sample_to_rgb(sample: &gstreamer::Sample) -> Result<(u32, u32, Vec<u8>), AcquisitionError> {
    let caps = sample
        .caps()
        .ok_or_else(|| AcquisitionError::Pipeline("No caps on sample".into()))?;
    let info = VideoInfo::from_caps(caps)
        .map_err(|e| AcquisitionError::Pipeline(format!("Failed to get video info: {}", e)))?;
    let buffer = sample
        .buffer()
        .ok_or_else(|| AcquisitionError::Pipeline("No buffer in sample".into()))?;
    let map = buffer
        .map_readable()
        .map_err(|_| AcquisitionError::Pipeline("Failed to map buffer".into()))?;

    let width = info.width();
    let height = info.height();
    let stride = info.stride()[0] as usize;
    let offset = info.offset()[0];

    let rgb = pack_rows(map.as_slice(), offset, stride, width, height).ok_or_else(|| {
        AcquisitionError::Pipeline(format!(
            "Buffer too small for {}x{} frame (stride {})",
            width, height, stride
        ))
    })?;

    Ok((width, height, rgb))
}

/// Strip per-row padding from a 3-byte-per-pixel plane
fn pack_rows(data: &[u8], offset: usize, stride: usize, width: u32, height: u32) -> Option<Vec<u8>> {
    let row_bytes = width as usize * 3;
    if stride < row_bytes {
        return None;
    }

    let mut packed = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = offset + row * stride;
        packed.extend_from_slice(data.get(start..start + row_bytes)?);
    }
    Some(packed)
}

/// Encode the frame next to `target` and move it into place
///
/// The target only ever holds a complete JPEG; partial output is removed.
fn write_jpeg(target: &Path, width: u32, height: u32, rgb: &[u8]) -> Result<(), AcquisitionError> {
    let part_path = part_path_for(target);
    let encoding_error = |e: std::io::Error| {
        AcquisitionError::Encoding(format!("{}: {}", part_path.display(), e))
    };

    let result = std::fs::File::create(&part_path)
        .map_err(encoding_error)
        .and_then(|file| {
            let mut writer = std::io::BufWriter::new(file);
            encode_jpeg(&mut writer, width, height, rgb)?;
            let file = writer.into_inner().map_err(|e| encoding_error(e.into_error()))?;
            file.sync_all().map_err(encoding_error)
        })
        .and_then(|()| std::fs::rename(&part_path, target).map_err(encoding_error));

    if result.is_err()
        && part_path.exists()
        && let Err(e) = std::fs::remove_file(&part_path)
    {
        warn!(path = %part_path.display(), error = %e, "Failed to remove partial capture");
    }
    result
}

/// Encode RGB8 pixels as JPEG and flush `writer`
fn encode_jpeg<W: Write>(
    writer: &mut W,
    width: u32,
    height: u32,
    rgb: &[u8],
) -> Result<(), AcquisitionError> {
    let mut encoder = JpegEncoder::new_with_quality(&mut *writer, capture::JPEG_QUALITY);
    encoder.encode(rgb, width, height, image::ExtendedColorType::Rgb8)?;
    writer
        .flush()
        .map_err(|e| AcquisitionError::Encoding(e.to_string()))
}

/// `<target>.part`, a sibling of the target
fn part_path_for(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}
