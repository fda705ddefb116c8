//! Exposure correction.
//!
//! Some UVC cameras ignore or clamp an absolute-exposure write unless the
//! register first moves through a clearly different value. When the
//! verifier finds exposure off target, the corrector "bounces" it: write an
//! adjusted value, write the target back, then read it again.

use crate::catalog::ControlId;
use crate::configurator::write_control;
use crate::device::{DeviceError, DeviceOpener};
use crate::values::Exposure;
use crate::verifier::VerificationResult;
use serde::Serialize;
use std::path::Path;

/// Intermediate exposure written before re-writing `target`.
///
/// Below 512 bounce to 512, above 4096 bounce to 8192, otherwise double.
pub fn bounce_value(target: i64) -> i64 {
    if target < 512 {
        512
    } else if target > 4096 {
        8192
    } else {
        target * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CorrectionState {
    Idle,
    MismatchDetected { actual: i64 },
    Correcting { adjusted: i64 },
    Resolved,
    StillMismatched { actual: i64 },
}

/// Retry policy for the exposure control.
#[derive(Debug)]
pub struct ExposureCorrector {
    target: Exposure,
    state: CorrectionState,
    recheck: Option<VerificationResult>,
}

impl ExposureCorrector {
    pub fn new(target: Exposure) -> Self {
        Self {
            target,
            state: CorrectionState::Idle,
            recheck: None,
        }
    }

    pub fn state(&self) -> CorrectionState {
        self.state
    }

    /// Read-back taken after the bounce, if a correction ran.
    pub fn recheck(&self) -> Option<&VerificationResult> {
        self.recheck.as_ref()
    }

    /// Feed a verification result. An exposure mismatch moves `Idle` to
    /// `MismatchDetected`; anything else leaves the state alone.
    pub fn observe(&mut self, result: &VerificationResult) -> CorrectionState {
        if self.state == CorrectionState::Idle
            && result.control == ControlId::Exposure
            && !result.matched
        {
            self.state = CorrectionState::MismatchDetected {
                actual: result.actual,
            };
        }
        self.state
    }

    /// Bounce the exposure register on a freshly opened handle and re-read it.
    ///
    /// Only acts from `MismatchDetected`. Ends in `Resolved` or
    /// `StillMismatched`; neither is an error. Failing to open the device
    /// leaves the state unchanged.
    pub fn correct<O: DeviceOpener>(
        &mut self,
        opener: &O,
        path: &Path,
    ) -> Result<CorrectionState, DeviceError> {
        if !matches!(self.state, CorrectionState::MismatchDetected { .. }) {
            return Ok(self.state);
        }

        let mut device = opener.open(path)?;
        let target = self.target.get();
        let adjusted = bounce_value(target);
        self.state = CorrectionState::Correcting { adjusted };

        tracing::info!(exposure = adjusted, "adjusting exposure");
        write_control(&mut device, ControlId::Exposure, adjusted);
        tracing::info!(exposure = target, "adjusting exposure back");
        write_control(&mut device, ControlId::Exposure, target);

        let result = VerificationResult::check(&mut device, ControlId::Exposure, target);
        self.state = if result.matched {
            tracing::info!(exposure = target, "exposure adjusted successfully");
            CorrectionState::Resolved
        } else {
            CorrectionState::StillMismatched {
                actual: result.actual,
            }
        };
        self.recheck = Some(result);
        Ok(self.state)
    }
}
