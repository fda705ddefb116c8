//! Ordered, best-effort control writes.

use crate::catalog::{ControlId, EXPOSURE_MANUAL};
use crate::device::{ControlDevice, DeviceError, DeviceOpener};
use crate::values::ControlValues;
use std::path::Path;

/// The writes `configure` performs, in order.
///
/// Auto modes are switched off first; exposure goes last because the
/// driver only latches it reliably once auto exposure is off and the other
/// controls have settled.
pub fn write_plan(values: &ControlValues) -> Vec<(ControlId, i64)> {
    let mut plan = vec![
        (ControlId::AutoExposure, EXPOSURE_MANUAL),
        (ControlId::ExposureDynamicFramerate, 0),
        (ControlId::AutoWhiteBalance, 0),
    ];
    plan.extend(values.tuned());
    plan.push((ControlId::Exposure, values.exposure().get()));
    plan
}

/// Write one control, logging a failure instead of returning it.
pub(crate) fn write_control<D: ControlDevice>(device: &mut D, id: ControlId, value: i64) -> bool {
    match device.set_control(id.cid(), value) {
        Ok(()) => {
            tracing::debug!(control = id.key(), value, "control set");
            true
        }
        Err(e) => {
            tracing::error!(control = id.name(), value, error = %e, "failed to set control");
            false
        }
    }
}

/// Open `path` and apply every value in [`write_plan`] order.
///
/// Individual write failures are logged and skipped. Returns the controls
/// whose write failed; only failing to open the device is an error.
pub fn configure<O: DeviceOpener>(
    opener: &O,
    path: &Path,
    values: &ControlValues,
) -> Result<Vec<ControlId>, DeviceError> {
    let mut device = opener.open(path)?;
    let mut failed = Vec::new();

    for (id, value) in write_plan(values) {
        if !write_control(&mut device, id, value) {
            failed.push(id);
        }
    }

    tracing::info!(
        device = %path.display(),
        failed = failed.len(),
        "controls configured"
    );
    Ok(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CID_AUTO_WHITE_BALANCE, CID_EXPOSURE_ABSOLUTE, CID_GAMMA};
    use crate::sim::SimCamera;
    use crate::values::Exposure;

    const DEV: &str = "/dev/video2";

    #[test]
    fn test_plan_order() {
        let plan = write_plan(&ControlValues::default());
        let ids: Vec<ControlId> = plan.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            &ids[..3],
            &[
                ControlId::AutoExposure,
                ControlId::ExposureDynamicFramerate,
                ControlId::AutoWhiteBalance,
            ]
        );
        assert_eq!(ids.last(), Some(&ControlId::Exposure));
        assert_eq!(ids.len(), 11);
        assert_eq!(plan[0].1, EXPOSURE_MANUAL);
    }

    #[test]
    fn test_writes_reach_device_in_order() {
        let cam = SimCamera::new();
        let values = ControlValues::default().with_exposure(Exposure::new(800).unwrap());
        let failed = configure(&cam, Path::new(DEV), &values).unwrap();
        assert!(failed.is_empty());

        let expected: Vec<(u32, i64)> = write_plan(&values)
            .into_iter()
            .map(|(id, v)| (id.cid(), v))
            .collect();
        assert_eq!(cam.writes(), expected);
        assert_eq!(cam.writes().last(), Some(&(CID_EXPOSURE_ABSOLUTE, 800)));
        assert_eq!(cam.value(CID_AUTO_WHITE_BALANCE), Some(0));
    }

    #[test]
    fn test_write_failure_does_not_abort() {
        let cam = SimCamera::new().fail_writes(CID_GAMMA);
        let failed = configure(&cam, Path::new(DEV), &ControlValues::default()).unwrap();
        assert_eq!(failed, vec![ControlId::Gamma]);
        assert_eq!(cam.value(CID_EXPOSURE_ABSOLUTE), Some(512));
        assert_eq!(cam.writes().len(), 10);
    }

    #[test]
    fn test_handle_released() {
        let cam = SimCamera::new();
        configure(&cam, Path::new(DEV), &ControlValues::default()).unwrap();
        assert_eq!(cam.live_handles(), 0);
        assert_eq!(cam.opened(), vec![std::path::PathBuf::from(DEV)]);
    }

    #[test]
    fn test_open_failure() {
        let cam = SimCamera::new().fail_open();
        let err = configure(&cam, Path::new(DEV), &ControlValues::default()).unwrap_err();
        assert!(matches!(err, DeviceError::NotFound(_)));
        assert!(cam.writes().is_empty());
    }
}
