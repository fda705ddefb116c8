//! camlatch-core — Control catalog and the discover → configure → verify →
//! correct pipeline for pinning a USB camera's image controls.
//!
//! Hardware access goes through the [`device::ControlDevice`] and
//! [`resolver::MetadataQuery`] traits; `camlatch-hw` provides the V4L2 and
//! udev/sysfs implementations, [`sim`] provides an in-memory camera.

pub mod catalog;
pub mod configurator;
pub mod device;
pub mod exposure;
pub mod identity;
pub mod mode;
pub mod pipeline;
pub mod profile;
pub mod resolver;
pub mod sim;
pub mod values;
pub mod verifier;

pub use catalog::{ControlId, ControlSpec};
pub use device::{ControlDevice, DeviceError, DeviceOpener};
pub use exposure::{CorrectionState, ExposureCorrector};
pub use identity::TargetIdentity;
pub use mode::CaptureMode;
pub use pipeline::{configure_and_verify, Outcome};
pub use profile::Profile;
pub use resolver::{resolve, MetadataQuery, NodeSource, ResolveError};
pub use values::{ControlValues, Exposure, ValidationError};
pub use verifier::VerificationResult;
