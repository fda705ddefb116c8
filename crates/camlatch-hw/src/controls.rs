//! V4L2 control access via the `v4l` crate.

use camlatch_core::{ControlDevice, DeviceError, DeviceOpener};
use std::io;
use std::path::Path;
use v4l::control::{Control, Value};
use v4l::Device;

/// Opens V4L2 device nodes for control access.
#[derive(Debug, Clone, Copy, Default)]
pub struct V4lOpener;

/// An open V4L2 device node. Closed on drop.
pub struct V4lControls {
    device: Device,
}

impl V4lControls {
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(DeviceError::NotFound(display));
        }

        let device = Device::with_path(path).map_err(|e| {
            if e.raw_os_error() == Some(libc::EBUSY) {
                DeviceError::Busy(display.clone())
            } else {
                DeviceError::Open {
                    path: display.clone(),
                    source: e,
                }
            }
        })?;

        tracing::debug!(device = %display, "opened device for control access");
        Ok(Self { device })
    }
}

impl DeviceOpener for V4lOpener {
    type Device = V4lControls;

    fn open(&self, path: &Path) -> Result<V4lControls, DeviceError> {
        V4lControls::open(path)
    }
}

impl ControlDevice for V4lControls {
    fn set_control(&mut self, cid: u32, value: i64) -> io::Result<()> {
        self.device.set_control(Control {
            id: cid,
            value: Value::Integer(value),
        })
    }

    fn get_control(&mut self, cid: u32) -> io::Result<i64> {
        let control = self.device.control(cid)?;
        control_to_int(control.value)
    }
}

/// Integer view of a control value. Booleans and menus read as 0/1 and
/// the menu index respectively.
fn control_to_int(value: Value) -> io::Result<i64> {
    match value {
        Value::Integer(v) => Ok(v),
        Value::Boolean(b) => Ok(i64::from(b)),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("control is not an integer: {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_to_int() {
        assert_eq!(control_to_int(Value::Integer(6000)).unwrap(), 6000);
        assert_eq!(control_to_int(Value::Boolean(true)).unwrap(), 1);
        assert_eq!(control_to_int(Value::Boolean(false)).unwrap(), 0);
        assert!(control_to_int(Value::String("x".into())).is_err());
        assert!(control_to_int(Value::None).is_err());
    }

    #[test]
    fn test_open_missing_node() {
        let err = V4lOpener.open(Path::new("/nonexistent/video99")).err();
        assert!(matches!(err, Some(DeviceError::NotFound(_))));
    }
}
