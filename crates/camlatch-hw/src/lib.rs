//! camlatch-hw — Hardware backends for camlatch.
//!
//! V4L2 control access via the `v4l` crate, device metadata from udev or
//! sysfs, and the capture-format handoff.

pub mod camera;
pub mod controls;
pub mod metadata;

pub use camera::{CameraError, CaptureFormat, DeviceInfo};
pub use controls::{V4lControls, V4lOpener};
pub use metadata::{DevNodes, MetadataError, MetadataSource, Sysfs, Udevadm};
