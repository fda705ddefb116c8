//! Static control catalog.
//!
//! Maps each logical control to its V4L2 control id and display metadata.
//! The table is indexed by [`ControlId`], so a lookup can never miss.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// `V4L2_CID_BASE`: first user-class control.
const CID_USER_BASE: u32 = 0x0098_0900;
/// `V4L2_CID_CAMERA_CLASS_BASE`: first camera-class control.
const CID_CAMERA_BASE: u32 = 0x009A_0900;

pub const CID_BRIGHTNESS: u32 = CID_USER_BASE;
pub const CID_CONTRAST: u32 = CID_USER_BASE + 1;
pub const CID_SATURATION: u32 = CID_USER_BASE + 2;
pub const CID_HUE: u32 = CID_USER_BASE + 3;
pub const CID_AUTO_WHITE_BALANCE: u32 = CID_USER_BASE + 12;
pub const CID_GAMMA: u32 = CID_USER_BASE + 16;
pub const CID_WHITE_BALANCE_TEMPERATURE: u32 = CID_USER_BASE + 26;
pub const CID_SHARPNESS: u32 = CID_USER_BASE + 27;
pub const CID_EXPOSURE_AUTO: u32 = CID_CAMERA_BASE + 1;
pub const CID_EXPOSURE_ABSOLUTE: u32 = CID_CAMERA_BASE + 2;
pub const CID_EXPOSURE_AUTO_PRIORITY: u32 = CID_CAMERA_BASE + 3;

/// `V4L2_EXPOSURE_MANUAL` menu entry of the auto-exposure control.
pub const EXPOSURE_MANUAL: i64 = 1;

/// Logical control identifier. The discriminant indexes [`CATALOG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    AutoExposure,
    ExposureDynamicFramerate,
    AutoWhiteBalance,
    Brightness,
    Contrast,
    Gamma,
    Hue,
    Saturation,
    Sharpness,
    WhiteBalanceTemperature,
    Exposure,
}

/// One controllable hardware property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSpec {
    pub id: ControlId,
    /// Logical key used in profiles and log fields.
    pub key: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// V4L2 control id.
    pub cid: u32,
    /// Whether `show` lists this control by default.
    pub display: bool,
}

#[rustfmt::skip]
pub static CATALOG: [ControlSpec; 11] = [
    ControlSpec { id: ControlId::AutoExposure,             key: "auto_exposure",              name: "Auto Exposure",              cid: CID_EXPOSURE_AUTO,             display: false },
    ControlSpec { id: ControlId::ExposureDynamicFramerate, key: "exposure_dynamic_framerate", name: "Exposure Dynamic Framerate", cid: CID_EXPOSURE_AUTO_PRIORITY,     display: false },
    ControlSpec { id: ControlId::AutoWhiteBalance,         key: "auto_white_balance",         name: "Auto White Balance",         cid: CID_AUTO_WHITE_BALANCE,        display: false },
    ControlSpec { id: ControlId::Brightness,               key: "brightness",                 name: "Brightness",                 cid: CID_BRIGHTNESS,                display: true },
    ControlSpec { id: ControlId::Contrast,                 key: "contrast",                   name: "Contrast",                   cid: CID_CONTRAST,                  display: true },
    ControlSpec { id: ControlId::Gamma,                    key: "gamma",                      name: "Gamma",                      cid: CID_GAMMA,                     display: true },
    ControlSpec { id: ControlId::Hue,                      key: "hue",                        name: "Hue",                        cid: CID_HUE,                       display: true },
    ControlSpec { id: ControlId::Saturation,               key: "saturation",                 name: "Saturation",                 cid: CID_SATURATION,                display: true },
    ControlSpec { id: ControlId::Sharpness,                key: "sharpness",                  name: "Sharpness",                  cid: CID_SHARPNESS,                 display: true },
    ControlSpec { id: ControlId::WhiteBalanceTemperature,  key: "white_balance_temperature",  name: "White Balance Temperature",  cid: CID_WHITE_BALANCE_TEMPERATURE, display: true },
    ControlSpec { id: ControlId::Exposure,                 key: "exposure",                   name: "Exposure Absolute",          cid: CID_EXPOSURE_ABSOLUTE,         display: true },
];

/// Image controls that carry a user-facing target value, in write order.
/// Exposure is excluded: it is written last and tracked separately.
pub const TUNED: [ControlId; 7] = [
    ControlId::Brightness,
    ControlId::Contrast,
    ControlId::Gamma,
    ControlId::Hue,
    ControlId::Saturation,
    ControlId::Sharpness,
    ControlId::WhiteBalanceTemperature,
];

impl ControlId {
    pub const ALL: [ControlId; 11] = [
        ControlId::AutoExposure,
        ControlId::ExposureDynamicFramerate,
        ControlId::AutoWhiteBalance,
        ControlId::Brightness,
        ControlId::Contrast,
        ControlId::Gamma,
        ControlId::Hue,
        ControlId::Saturation,
        ControlId::Sharpness,
        ControlId::WhiteBalanceTemperature,
        ControlId::Exposure,
    ];

    pub fn spec(self) -> &'static ControlSpec {
        &CATALOG[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn cid(self) -> u32 {
        self.spec().cid
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ControlId {
    type Err = UnknownControl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .find(|entry| entry.key == s)
            .map(|entry| entry.id)
            .ok_or_else(|| UnknownControl(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control: {0}")]
pub struct UnknownControl(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_indexed_by_id() {
        for id in ControlId::ALL {
            assert_eq!(id.spec().id, id, "catalog row out of order for {id:?}");
        }
    }

    #[test]
    fn test_cids_and_keys_unique() {
        let cids: HashSet<u32> = CATALOG.iter().map(|s| s.cid).collect();
        let keys: HashSet<&str> = CATALOG.iter().map(|s| s.key).collect();
        assert_eq!(cids.len(), CATALOG.len());
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn test_v4l2_ids() {
        assert_eq!(ControlId::Brightness.cid(), 0x0098_0900);
        assert_eq!(ControlId::WhiteBalanceTemperature.cid(), 0x0098_091A);
        assert_eq!(ControlId::Sharpness.cid(), 0x0098_091B);
        assert_eq!(ControlId::AutoExposure.cid(), 0x009A_0901);
        assert_eq!(ControlId::Exposure.cid(), 0x009A_0902);
    }

    #[test]
    fn test_parse_key() {
        assert_eq!("gamma".parse::<ControlId>(), Ok(ControlId::Gamma));
        assert_eq!("exposure".parse::<ControlId>(), Ok(ControlId::Exposure));
        assert!("focus".parse::<ControlId>().is_err());
    }

    #[test]
    fn test_tuned_excludes_mode_switches_and_exposure() {
        for id in TUNED {
            assert!(id.spec().display);
            assert_ne!(id, ControlId::Exposure);
        }
    }
}
