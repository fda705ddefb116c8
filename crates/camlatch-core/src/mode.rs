//! Capture pixel-format mode, consumed by the capture handoff.

use crate::values::ValidationError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Motion-JPEG.
    #[default]
    Mjpg,
    /// YUYV 4:2:2 packed.
    Yuyv,
}

impl CaptureMode {
    /// Four-character code as bytes.
    pub fn fourcc(self) -> [u8; 4] {
        match self {
            CaptureMode::Mjpg => *b"MJPG",
            CaptureMode::Yuyv => *b"YUYV",
        }
    }

    /// Four-character code packed little-endian, as V4L2 and OpenCV expect it.
    pub fn fourcc_code(self) -> u32 {
        u32::from_le_bytes(self.fourcc())
    }
}

impl FromStr for CaptureMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mjpg" => Ok(CaptureMode::Mjpg),
            "yuyv" => Ok(CaptureMode::Yuyv),
            other => Err(ValidationError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Mjpg => f.write_str("mjpg"),
            CaptureMode::Yuyv => f.write_str("yuyv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_codes() {
        assert_eq!(CaptureMode::Mjpg.fourcc_code(), 1_196_444_237);
        assert_eq!(CaptureMode::Yuyv.fourcc_code(), 1_448_695_129);
    }

    #[test]
    fn test_parse() {
        assert_eq!("mjpg".parse(), Ok(CaptureMode::Mjpg));
        assert_eq!("yuyv".parse(), Ok(CaptureMode::Yuyv));
        assert_eq!(
            "h264".parse::<CaptureMode>(),
            Err(ValidationError::InvalidMode("h264".into()))
        );
        assert!("MJPG".parse::<CaptureMode>().is_err());
    }
}
