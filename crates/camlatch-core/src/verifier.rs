//! Read-back verification of configured controls.

use crate::catalog::ControlId;
use crate::device::{ControlDevice, DeviceError, DeviceOpener};
use crate::values::ControlValues;
use serde::Serialize;
use std::path::Path;

/// Value reported for a control that could not be read.
pub const READ_FAILED_SENTINEL: i64 = 0;

/// Outcome of checking one control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub control: ControlId,
    pub expected: i64,
    /// Value read back, or [`READ_FAILED_SENTINEL`] when the read failed.
    pub actual: i64,
    pub matched: bool,
    /// The read itself failed; `actual` is the sentinel, not a device value.
    pub read_failed: bool,
}

impl VerificationResult {
    pub(crate) fn check<D: ControlDevice>(
        device: &mut D,
        control: ControlId,
        expected: i64,
    ) -> Self {
        let result = match device.get_control(control.cid()) {
            Ok(actual) => Self {
                control,
                expected,
                actual,
                matched: actual == expected,
                read_failed: false,
            },
            Err(e) => {
                tracing::warn!(control = control.name(), error = %e, "failed to read control");
                Self {
                    control,
                    expected,
                    actual: READ_FAILED_SENTINEL,
                    matched: false,
                    read_failed: true,
                }
            }
        };
        if !result.matched {
            result.log_mismatch();
        }
        result
    }

    fn log_mismatch(&self) {
        tracing::error!(
            control = self.control.name(),
            expected = self.expected,
            actual = self.actual,
            read_failed = self.read_failed,
            "control is not set correctly"
        );
    }
}

/// Open a fresh handle on `path` and read back every tracked control,
/// tuned controls first and exposure last.
pub fn verify<O: DeviceOpener>(
    opener: &O,
    path: &Path,
    expected: &ControlValues,
) -> Result<Vec<VerificationResult>, DeviceError> {
    let mut device = opener.open(path)?;

    let mut results: Vec<VerificationResult> = expected
        .tuned()
        .map(|(id, value)| VerificationResult::check(&mut device, id, value))
        .collect();
    results.push(VerificationResult::check(
        &mut device,
        ControlId::Exposure,
        expected.exposure().get(),
    ));

    Ok(results)
}

/// Only the results that did not match.
pub fn mismatches(results: &[VerificationResult]) -> Vec<VerificationResult> {
    results.iter().filter(|r| !r.matched).cloned().collect()
}
