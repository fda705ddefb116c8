//! Target control values and input validation.

use crate::catalog::{ControlId, TUNED};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid mode: {0}; choose 'mjpg' or 'yuyv'")]
    InvalidMode(String),
    #[error("exposure {value} out of range; choose a value between {min} and {max}")]
    ExposureOutOfRange { value: i64, min: i64, max: i64 },
    #[error("invalid hex id: {0:?}")]
    InvalidId(String),
    #[error("{0} has no target value; only image controls can be set")]
    NotTunable(ControlId),
}

/// Validated absolute exposure value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exposure(i64);

impl Exposure {
    pub const MIN: i64 = 20;
    pub const MAX: i64 = 10_000;
    pub const DEFAULT: i64 = 512;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::ExposureOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for Exposure {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Desired value for every tuned control plus exposure.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlValues {
    tuned: BTreeMap<ControlId, i64>,
    exposure: Exposure,
}

impl ControlValues {
    /// Values for the tuned controls, in catalog order, and an exposure.
    pub fn new(
        tuned: impl IntoIterator<Item = (ControlId, i64)>,
        exposure: Exposure,
    ) -> Result<Self, ValidationError> {
        let mut map = BTreeMap::new();
        for (id, value) in tuned {
            if !TUNED.contains(&id) {
                return Err(ValidationError::NotTunable(id));
            }
            map.insert(id, value);
        }
        Ok(Self {
            tuned: map,
            exposure,
        })
    }

    /// Replace the exposure target, keeping everything else.
    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    /// Target value for `id`, if one is tracked.
    pub fn get(&self, id: ControlId) -> Option<i64> {
        if id == ControlId::Exposure {
            return Some(self.exposure.get());
        }
        self.tuned.get(&id).copied()
    }

    /// Tuned controls and their targets, exposure excluded.
    pub fn tuned(&self) -> impl Iterator<Item = (ControlId, i64)> + '_ {
        TUNED
            .iter()
            .filter_map(|id| self.tuned.get(id).map(|v| (*id, *v)))
    }
}

impl Default for ControlValues {
    fn default() -> Self {
        let tuned = [
            (ControlId::Brightness, 0),
            (ControlId::Contrast, 15),
            (ControlId::Gamma, 100),
            (ControlId::Hue, 0),
            (ControlId::Saturation, 65),
            (ControlId::Sharpness, 30),
            (ControlId::WhiteBalanceTemperature, 6000),
        ];
        Self {
            tuned: tuned.into_iter().collect(),
            exposure: Exposure::default(),
        }
    }
}
