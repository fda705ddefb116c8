//! configure → verify → correct, as one call for the capture side.

use crate::catalog::ControlId;
use crate::configurator::configure;
use crate::device::{DeviceError, DeviceOpener};
use crate::exposure::{CorrectionState, ExposureCorrector};
use crate::values::ControlValues;
use crate::verifier::{verify, VerificationResult};
use serde::Serialize;
use std::path::Path;

/// Final state of the controls after configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Controls still off target after any correction.
    pub mismatches: Vec<VerificationResult>,
    /// Controls whose write was rejected during configuration.
    pub write_failures: Vec<ControlId>,
    /// Exposure was off target and the bounce fixed it.
    pub exposure_corrected: bool,
    pub correction: CorrectionState,
}

impl Outcome {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Configure `path` with `values`, read everything back, and when `fix`
/// is set try to repair an exposure mismatch.
///
/// Failing to open the device in the configure or verify phase is an
/// error. A failed correction, including failing to open for it, is
/// logged and reported through [`Outcome`].
pub fn configure_and_verify<O: DeviceOpener>(
    opener: &O,
    path: &Path,
    values: &ControlValues,
    fix: bool,
) -> Result<Outcome, DeviceError> {
    let write_failures = configure(opener, path, values)?;
    let mut results = verify(opener, path, values)?;

    let mut corrector = ExposureCorrector::new(values.exposure());
    if let Some(exposure) = results.iter().find(|r| r.control == ControlId::Exposure) {
        corrector.observe(exposure);
    }

    if matches!(corrector.state(), CorrectionState::MismatchDetected { .. }) {
        if fix {
            if let Err(e) = corrector.correct(opener, path) {
                tracing::error!(
                    device = %path.display(),
                    error = %e,
                    "exposure correction skipped"
                );
            }
        } else {
            tracing::warn!("exposure mismatch left as is; pass --fix to correct it");
        }
    }

    if let Some(recheck) = corrector.recheck() {
        if let Some(slot) = results.iter_mut().find(|r| r.control == ControlId::Exposure) {
            *slot = recheck.clone();
        }
    }

    let mismatches: Vec<VerificationResult> = results.into_iter().filter(|r| !r.matched).collect();
    let exposure_corrected = corrector.state() == CorrectionState::Resolved;

    tracing::info!(
        device = %path.display(),
        mismatches = mismatches.len(),
        exposure_corrected,
        "controls verified"
    );

    Ok(Outcome {
        mismatches,
        write_failures,
        exposure_corrected,
        correction: corrector.state(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CID_CONTRAST, CID_EXPOSURE_ABSOLUTE};
    use crate::identity::TargetIdentity;
    use crate::resolver::{resolve, MetadataQuery, NodeSource};
    use crate::sim::SimCamera;
    use crate::values::Exposure;
    use std::io;
    use std::path::PathBuf;

    const DEV: &str = "/dev/video2";

    struct TwoCameras;

    impl NodeSource for TwoCameras {
        fn nodes(&self) -> io::Result<Vec<PathBuf>> {
            Ok(vec!["/dev/video0".into(), "/dev/video2".into()])
        }
    }

    impl MetadataQuery for TwoCameras {
        fn query(&self, node: &Path) -> io::Result<String> {
            Ok(if node == Path::new("/dev/video2") {
                "E: DEVNAME=/dev/video2\nE: ID_VENDOR_ID=1bcf\nE: ID_MODEL_ID=0b09\n".into()
            } else {
                "E: DEVNAME=/dev/video0\nE: ID_VENDOR_ID=058f\nE: ID_MODEL_ID=3822\n".into()
            })
        }
    }

    #[test]
    fn test_end_to_end_clean() {
        let identity = TargetIdentity::new("1bcf", "0b09").unwrap();
        let path = resolve(&identity, &TwoCameras, &TwoCameras).unwrap();
        assert_eq!(path, PathBuf::from(DEV));

        let cam = SimCamera::new();
        let values = ControlValues::default();
        let outcome = configure_and_verify(&cam, &path, &values, true).unwrap();
        assert!(outcome.is_clean());
        assert!(!outcome.exposure_corrected);
        assert_eq!(outcome.correction, CorrectionState::Idle);
        assert_eq!(cam.opened().len(), 2);
        assert_eq!(cam.value(CID_CONTRAST), Some(15));
    }

    #[test]
    fn test_end_to_end_bounce_fixes_clamped_exposure() {
        let cam = SimCamera::new().stick_first_writes(CID_EXPOSURE_ABSOLUTE, 1, 256);
        let values = ControlValues::default().with_exposure(Exposure::new(512).unwrap());

        let outcome = configure_and_verify(&cam, Path::new(DEV), &values, true).unwrap();

        assert!(outcome.is_clean());
        assert!(outcome.exposure_corrected);
        assert_eq!(outcome.correction, CorrectionState::Resolved);
        assert_eq!(cam.writes_to(CID_EXPOSURE_ABSOLUTE), vec![512, 1024, 512]);
        assert_eq!(cam.value(CID_EXPOSURE_ABSOLUTE), Some(512));
        // configure, verify, correct: one handle each, all released.
        assert_eq!(cam.opened().len(), 3);
        assert_eq!(cam.live_handles(), 0);
    }

    #[test]
    fn test_mismatch_without_fix_is_reported() {
        let cam = SimCamera::new().stick_first_writes(CID_EXPOSURE_ABSOLUTE, 1, 256);
        let values = ControlValues::default();

        let outcome = configure_and_verify(&cam, Path::new(DEV), &values, false).unwrap();

        assert!(!outcome.exposure_corrected);
        assert_eq!(outcome.correction, CorrectionState::MismatchDetected { actual: 256 });
        assert_eq!(outcome.mismatches.len(), 1);
        let m = &outcome.mismatches[0];
        assert_eq!((m.control, m.expected, m.actual), (ControlId::Exposure, 512, 256));
        assert_eq!(cam.writes_to(CID_EXPOSURE_ABSOLUTE), vec![512]);
    }

    #[test]
    fn test_failed_bounce_reports_post_bounce_value() {
        let cam = SimCamera::new().clamp(CID_EXPOSURE_ABSOLUTE, 3, 300);
        let values = ControlValues::default().with_exposure(Exposure::new(1000).unwrap());

        let outcome = configure_and_verify(&cam, Path::new(DEV), &values, true).unwrap();

        assert_eq!(outcome.correction, CorrectionState::StillMismatched { actual: 300 });
        assert_eq!(outcome.mismatches.len(), 1);
        assert_eq!(outcome.mismatches[0].actual, 300);
        assert_eq!(cam.writes_to(CID_EXPOSURE_ABSOLUTE), vec![1000, 2000, 1000]);
    }

    #[test]
    fn test_other_mismatches_do_not_trigger_correction() {
        let cam = SimCamera::new().clamp(CID_CONTRAST, 0, 10);
        let outcome =
            configure_and_verify(&cam, Path::new(DEV), &ControlValues::default(), true).unwrap();
        assert_eq!(outcome.correction, CorrectionState::Idle);
        assert_eq!(outcome.mismatches.len(), 1);
        assert_eq!(outcome.mismatches[0].control, ControlId::Contrast);
        assert_eq!(cam.opened().len(), 2);
    }

    #[test]
    fn test_open_failure_stops_pipeline() {
        let cam = SimCamera::new().fail_open();
        let err = configure_and_verify(&cam, Path::new(DEV), &ControlValues::default(), true);
        assert!(err.is_err());
    }
}
