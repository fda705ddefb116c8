use anyhow::{Context, Result};
use camlatch_core::{
    configure_and_verify, resolve, ControlDevice, ControlId, DeviceOpener, MetadataQuery,
    NodeSource, Outcome,
};
use camlatch_hw::camera::{list_devices, prepare_capture};
use camlatch_hw::{CaptureFormat, V4lControls, V4lOpener};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

use cli::{Cli, Commands};
use config::RunConfig;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RunConfig::from_env(&cli.flags).context("invalid configuration")?;

    tracing::debug!(
        profile = %config.profile_name,
        identity = %config.identity,
        mode = %config.mode,
        exposure = config.values.exposure().get(),
        fix = config.fix,
        "configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Apply) {
        Commands::Apply => apply(&config, cli.json),
        Commands::List => list(&config, cli.json),
        Commands::Show { all, controls } => show(&config, all, &controls, cli.json),
    }
}

/// Locate the target camera; `None` once the failure is logged.
fn find_camera(
    config: &RunConfig,
    nodes: &dyn NodeSource,
    query: &dyn MetadataQuery,
) -> Option<PathBuf> {
    match resolve(&config.identity, nodes, query) {
        Ok(path) => {
            tracing::info!(device = %path.display(), "using camera device");
            Some(path)
        }
        Err(e) => {
            tracing::error!(error = %e, "camera lookup failed");
            None
        }
    }
}

#[derive(Serialize)]
struct ApplySummary<'a> {
    device: String,
    #[serde(flatten)]
    outcome: &'a Outcome,
    capture: Option<&'a CaptureFormat>,
}

/// Resolve the camera and run configure → verify → correct on it.
/// `None` means the run cannot continue and the reason is already logged.
fn pin_controls<O: DeviceOpener>(
    config: &RunConfig,
    opener: &O,
    nodes: &dyn NodeSource,
    query: &dyn MetadataQuery,
) -> Option<(PathBuf, Outcome)> {
    let path = find_camera(config, nodes, query)?;
    match configure_and_verify(opener, &path, &config.values, config.fix) {
        Ok(outcome) => Some((path, outcome)),
        Err(e) => {
            tracing::error!(device = %path.display(), error = %e, "device setup failed");
            None
        }
    }
}

fn apply(config: &RunConfig, json: bool) -> Result<ExitCode> {
    let Some((path, outcome)) =
        pin_controls(config, &V4lOpener, &config.nodes(), &config.metadata)
    else {
        return Ok(ExitCode::FAILURE);
    };

    let capture = match prepare_capture(
        &path,
        config.mode,
        config.capture_width,
        config.capture_height,
    ) {
        Ok(format) => Some(format),
        Err(e) => {
            tracing::error!(device = %path.display(), error = %e, "capture handoff failed");
            None
        }
    };

    if json {
        let summary = ApplySummary {
            device: path.display().to_string(),
            outcome: &outcome,
            capture: capture.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(if capture.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list(config: &RunConfig, json: bool) -> Result<ExitCode> {
    let devices = list_devices(&config.nodes(), &config.metadata);

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else if devices.is_empty() {
        println!("No video capture devices found");
    } else {
        for d in &devices {
            let ids = match (&d.vendor_id, &d.model_id) {
                (Some(v), Some(m)) => format!("{v}:{m}"),
                _ => "????:????".to_string(),
            };
            let marker = if d.vendor_id.as_deref() == Some(config.identity.vendor_id())
                && d.model_id.as_deref() == Some(config.identity.model_id())
            {
                " *"
            } else {
                ""
            };
            println!("{:<14} {ids}  {} ({}, {}){marker}", d.path, d.name, d.driver, d.bus);
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct ControlReading {
    control: ControlId,
    name: &'static str,
    value: Option<i64>,
    target: Option<i64>,
}

fn show(config: &RunConfig, all: bool, only: &[ControlId], json: bool) -> Result<ExitCode> {
    let Some(path) = find_camera(config, &config.nodes(), &config.metadata) else {
        return Ok(ExitCode::FAILURE);
    };
    let mut device = match V4lControls::open(&path) {
        Ok(device) => device,
        Err(e) => {
            tracing::error!(error = %e, "failed to open camera");
            return Ok(ExitCode::FAILURE);
        }
    };

    let readings: Vec<ControlReading> = ControlId::ALL
        .into_iter()
        .filter(|id| {
            if only.is_empty() {
                all || id.spec().display
            } else {
                only.contains(id)
            }
        })
        .map(|id| {
            let value = match device.get_control(id.cid()) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(control = id.name(), error = %e, "failed to read control");
                    None
                }
            };
            ControlReading {
                control: id,
                name: id.name(),
                value,
                target: config.values.get(id),
            }
        })
        .collect();
    drop(device);

    if json {
        println!("{}", serde_json::to_string_pretty(&readings)?);
    } else {
        println!("{} ({})", path.display(), config.profile_name);
        for r in &readings {
            let value = r.value.map_or_else(|| "unavailable".to_string(), |v| v.to_string());
            match r.target {
                Some(t) if r.value != Some(t) => {
                    println!("  {:<28} {value:>8}  (target {t})", r.name)
                }
                _ => println!("  {:<28} {value:>8}", r.name),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Flags;
    use camlatch_core::sim::SimCamera;
    use std::io;
    use std::path::Path;

    struct Nodes(Vec<&'static str>);

    impl NodeSource for Nodes {
        fn nodes(&self) -> io::Result<Vec<PathBuf>> {
            Ok(self.0.iter().map(PathBuf::from).collect())
        }
    }

    /// Reports the built-in camera's ids on `/dev/video2` only.
    struct Udev;

    impl MetadataQuery for Udev {
        fn query(&self, node: &Path) -> io::Result<String> {
            if node == Path::new("/dev/video2") {
                Ok("E: ID_VENDOR_ID=1bcf\nE: ID_MODEL_ID=0b09\n".to_string())
            } else {
                Ok("E: ID_VENDOR_ID=046d\nE: ID_MODEL_ID=0825\n".to_string())
            }
        }
    }

    fn config() -> RunConfig {
        let flags = Flags {
            mode: "mjpg".into(),
            ..Flags::default()
        };
        RunConfig::from_sources(&flags, |_| None).unwrap()
    }

    #[test]
    fn test_pin_controls_on_resolved_camera() {
        let camera = SimCamera::new();
        let (path, outcome) =
            pin_controls(&config(), &camera, &Nodes(vec!["/dev/video0", "/dev/video2"]), &Udev)
                .unwrap();
        assert_eq!(path, PathBuf::from("/dev/video2"));
        assert!(outcome.is_clean());
        assert!(camera.opened().iter().all(|p| p == &path));
        assert_eq!(camera.live_handles(), 0);
    }

    #[test]
    fn test_missing_camera_stops_before_device_access() {
        let camera = SimCamera::new();
        let result = pin_controls(&config(), &camera, &Nodes(vec!["/dev/video0"]), &Udev);
        assert!(result.is_none());
        assert!(camera.opened().is_empty());
    }

    #[test]
    fn test_open_failure_stops_run() {
        let camera = SimCamera::new().fail_open();
        let result = pin_controls(&config(), &camera, &Nodes(vec!["/dev/video2"]), &Udev);
        assert!(result.is_none());
        assert!(camera.writes().is_empty());
    }
}
