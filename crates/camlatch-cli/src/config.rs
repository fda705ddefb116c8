use crate::cli::Flags;
use camlatch_core::{CaptureMode, ControlValues, Exposure, Profile, TargetIdentity};
use camlatch_hw::{DevNodes, MetadataSource};
use std::path::PathBuf;

/// Everything a run needs, resolved once at startup and read-only after.
///
/// Precedence: profile < `CAMLATCH_*` environment < command-line flags.
#[derive(Debug)]
pub struct RunConfig {
    pub identity: TargetIdentity,
    /// Display name of the profile in use.
    pub profile_name: String,
    pub values: ControlValues,
    pub mode: CaptureMode,
    /// Run the exposure bounce on mismatch.
    pub fix: bool,
    /// Directory scanned for `video*` nodes (default: /dev).
    pub dev_dir: PathBuf,
    pub metadata: MetadataSource,
    /// Frame size requested at capture handoff.
    pub capture_width: u32,
    pub capture_height: u32,
}

impl RunConfig {
    /// Build from flags and the process environment.
    pub fn from_env(flags: &Flags) -> anyhow::Result<Self> {
        Self::from_sources(flags, |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        flags: &Flags,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        // Flag validation comes first so a bad flag fails before any I/O.
        let mode: CaptureMode = flags.mode.parse()?;
        let exposure = flags.exposure.map(Exposure::new).transpose()?;

        let profile = match &flags.profile {
            Some(path) => Profile::load(path)?,
            None => Profile::builtin()?,
        };

        let vendor = flags
            .vendor
            .clone()
            .or_else(|| env("CAMLATCH_VENDOR_ID"))
            .unwrap_or_else(|| profile.device.vendor_id.clone());
        let model = flags
            .model
            .clone()
            .or_else(|| env("CAMLATCH_MODEL_ID"))
            .unwrap_or_else(|| profile.device.model_id.clone());
        let identity = TargetIdentity::new(&vendor, &model)?;

        let mut values = profile.values()?;
        if let Some(exposure) = exposure {
            values = values.with_exposure(exposure);
        }

        let metadata = match env("CAMLATCH_METADATA") {
            Some(name) => name.parse::<MetadataSource>()?,
            None => MetadataSource::default(),
        };

        Ok(Self {
            identity,
            profile_name: profile.name(),
            values,
            mode,
            fix: flags.fix,
            dev_dir: env("CAMLATCH_DEV_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/dev")),
            metadata,
            capture_width: env_u32(&env, "CAMLATCH_CAPTURE_WIDTH", 1280),
            capture_height: env_u32(&env, "CAMLATCH_CAPTURE_HEIGHT", 720),
        })
    }

    pub fn nodes(&self) -> DevNodes {
        DevNodes::new(&self.dev_dir)
    }
}

fn env_u32(env: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    env(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
