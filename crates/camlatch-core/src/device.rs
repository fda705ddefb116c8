//! Device access seam.
//!
//! Every phase (configure, verify, correct) opens its own handle through a
//! [`DeviceOpener`] and drops it before returning. Operations are short
//! synchronous register reads/writes, so there is no reason to hold the
//! node open across phases, and phases never overlap.

use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("device busy: {0}")]
    Busy(String),
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// An open handle able to read and write integer controls by V4L2 id.
pub trait ControlDevice {
    fn set_control(&mut self, cid: u32, value: i64) -> io::Result<()>;
    fn get_control(&mut self, cid: u32) -> io::Result<i64>;
}

/// Opens scoped [`ControlDevice`] handles.
pub trait DeviceOpener {
    type Device: ControlDevice;

    fn open(&self, path: &Path) -> Result<Self::Device, DeviceError>;
}
