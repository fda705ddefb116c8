//! Device profiles.
//!
//! A profile names the camera to look for and the control values to pin.
//! The profile for the 1bcf:0b09 camera is embedded at compile time from
//! `contrib/profiles/`; others can be loaded from disk.

use crate::catalog::ControlId;
use crate::identity::TargetIdentity;
use crate::values::{ControlValues, Exposure, ValidationError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_1BCF_0B09: &str = include_str!("../../../contrib/profiles/1bcf-0b09.toml");

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad profile TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid profile: {0}")]
    Invalid(#[from] ValidationError),
}

/// Top-level profile file structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub device: DeviceSection,
    pub controls: ControlsSection,
}

/// `[device]`: which camera this profile applies to.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSection {
    pub vendor_id: String,
    pub model_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `[controls]`: target values. Omitted image controls are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlsSection {
    pub brightness: Option<i64>,
    pub contrast: Option<i64>,
    pub gamma: Option<i64>,
    pub hue: Option<i64>,
    pub saturation: Option<i64>,
    pub sharpness: Option<i64>,
    pub white_balance_temperature: Option<i64>,
    /// Default exposure; the command line may override it.
    pub exposure: Option<i64>,
}

impl Profile {
    /// The profile compiled into the binary.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::parse(BUILTIN_1BCF_0B09)
    }

    pub fn parse(src: &str) -> Result<Self, ProfileError> {
        let profile: Profile = toml::from_str(src)?;
        // Surface bad ids and values at load time, not mid-run.
        profile.identity()?;
        profile.values()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let src = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&src)
    }

    pub fn identity(&self) -> Result<TargetIdentity, ValidationError> {
        TargetIdentity::new(&self.device.vendor_id, &self.device.model_id)
    }

    pub fn values(&self) -> Result<ControlValues, ValidationError> {
        let c = &self.controls;
        let tuned = [
            (ControlId::Brightness, c.brightness),
            (ControlId::Contrast, c.contrast),
            (ControlId::Gamma, c.gamma),
            (ControlId::Hue, c.hue),
            (ControlId::Saturation, c.saturation),
            (ControlId::Sharpness, c.sharpness),
            (ControlId::WhiteBalanceTemperature, c.white_balance_temperature),
        ]
        .into_iter()
        .filter_map(|(id, v)| v.map(|v| (id, v)));

        let exposure = match c.exposure {
            Some(v) => Exposure::new(v)?,
            None => Exposure::default(),
        };
        ControlValues::new(tuned, exposure)
    }

    /// Display name, falling back to `vendor:model`.
    pub fn name(&self) -> String {
        self.device
            .name
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.device.vendor_id, self.device.model_id))
    }
}
