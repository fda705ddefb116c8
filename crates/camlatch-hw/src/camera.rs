//! Capture-side helpers via the `v4l` crate: device listing and the
//! pixel-format handoff once controls are pinned.

use camlatch_core::identity::{property, MODEL_KEY, VENDOR_KEY};
use camlatch_core::{CaptureMode, MetadataQuery, NodeSource};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device busy: {0}")]
    DeviceBusy(String),
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("not a video capture device: {0}")]
    NotCaptureDevice(String),
}

/// Info about a discovered V4L2 device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub driver: String,
    pub bus: String,
    pub vendor_id: Option<String>,
    pub model_id: Option<String>,
}

/// Format the driver settled on.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureFormat {
    pub device_path: String,
    pub fourcc: String,
    pub width: u32,
    pub height: u32,
    /// Frames per second from the current frame interval, if the driver
    /// reports one.
    pub fps: Option<u32>,
}

/// Request `mode` at `width`x`height` on `device_path` and report what the
/// driver negotiated.
///
/// This is the handoff to whatever opens the capture stream; no frames are
/// read here.
pub fn prepare_capture(
    device_path: &Path,
    mode: CaptureMode,
    width: u32,
    height: u32,
) -> Result<CaptureFormat, CameraError> {
    let display = device_path.display().to_string();
    if !device_path.exists() {
        return Err(CameraError::DeviceNotFound(display));
    }

    let device = Device::with_path(device_path).map_err(|e| {
        if e.raw_os_error() == Some(libc::EBUSY) {
            CameraError::DeviceBusy(display.clone())
        } else {
            CameraError::DeviceNotFound(format!("{display}: {e}"))
        }
    })?;

    let caps = device
        .query_caps()
        .map_err(|e| CameraError::DeviceNotFound(format!("failed to query capabilities: {e}")))?;
    if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
        return Err(CameraError::NotCaptureDevice(display));
    }

    let mut fmt = device.format().map_err(|e| {
        CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
    })?;
    fmt.fourcc = FourCC::new(&mode.fourcc());
    fmt.width = width;
    fmt.height = height;

    let negotiated = device.set_format(&fmt).map_err(|e| {
        CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
    })?;

    if negotiated.fourcc != fmt.fourcc {
        tracing::warn!(
            requested = %mode,
            negotiated = ?negotiated.fourcc,
            "driver picked a different pixel format"
        );
    }

    let fps = device
        .params()
        .ok()
        .and_then(|p| fps_from_interval(p.interval.numerator, p.interval.denominator));

    let format = CaptureFormat {
        device_path: display,
        fourcc: fourcc_string(&negotiated.fourcc.repr),
        width: negotiated.width,
        height: negotiated.height,
        fps,
    };

    tracing::info!(
        device = %format.device_path,
        driver = %caps.driver,
        card = %caps.card,
        codec = %format.fourcc,
        width = format.width,
        height = format.height,
        fps = ?format.fps,
        "camera ready"
    );
    Ok(format)
}

/// List V4L2 video capture devices with the vendor/model ids `query`
/// reports for them.
pub fn list_devices(nodes: &dyn NodeSource, query: &dyn MetadataQuery) -> Vec<DeviceInfo> {
    let paths = match nodes.nodes() {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list video devices");
            return Vec::new();
        }
    };

    let mut devices = Vec::new();
    for path in paths {
        let Ok(dev) = Device::with_path(&path) else {
            continue;
        };
        let Ok(caps) = dev.query_caps() else {
            continue;
        };
        if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
            continue;
        }
        let metadata = query.query(&path).unwrap_or_default();
        devices.push(DeviceInfo {
            path: path.display().to_string(),
            name: caps.card.clone(),
            driver: caps.driver.clone(),
            bus: caps.bus.clone(),
            vendor_id: property(&metadata, VENDOR_KEY).map(str::to_string),
            model_id: property(&metadata, MODEL_KEY).map(str::to_string),
        });
    }

    devices
}

fn fps_from_interval(numerator: u32, denominator: u32) -> Option<u32> {
    if numerator == 0 {
        return None;
    }
    Some(denominator / numerator)
}

fn fourcc_string(repr: &[u8; 4]) -> String {
    String::from_utf8_lossy(repr)
        .trim_end_matches(|c| c == '\0' || c == ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_from_interval() {
        assert_eq!(fps_from_interval(1, 30), Some(30));
        assert_eq!(fps_from_interval(1001, 30000), Some(29));
        assert_eq!(fps_from_interval(0, 30), None);
    }

    #[test]
    fn test_fourcc_string() {
        assert_eq!(fourcc_string(b"MJPG"), "MJPG");
        assert_eq!(fourcc_string(b"Y16 "), "Y16");
        assert_eq!(fourcc_string(b"Y16\0"), "Y16");
    }

    #[test]
    fn test_prepare_capture_missing_node() {
        let err = prepare_capture(Path::new("/nonexistent/video0"), CaptureMode::Mjpg, 1280, 720)
            .unwrap_err();
        assert!(matches!(err, CameraError::DeviceNotFound(_)));
    }
}
