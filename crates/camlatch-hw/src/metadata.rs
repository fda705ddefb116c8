//! Device node enumeration and per-node metadata queries.
//!
//! Both query backends return udev-style `KEY=VALUE` text so the resolver
//! does not care where it came from.

use camlatch_core::identity::{MODEL_KEY, VENDOR_KEY};
use camlatch_core::{MetadataQuery, NodeSource};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MetadataError {
    #[error("unknown metadata source: {0} (need udevadm or sysfs)")]
    UnknownSource(String),
}

/// Lists `<dir>/video*` nodes in lexical order.
#[derive(Debug, Clone)]
pub struct DevNodes {
    dir: PathBuf,
}

impl DevNodes {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for DevNodes {
    fn default() -> Self {
        Self::new("/dev")
    }
}

impl NodeSource for DevNodes {
    fn nodes(&self) -> io::Result<Vec<PathBuf>> {
        let mut nodes = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_str().is_some_and(|n| n.starts_with("video")) {
                nodes.push(entry.path());
            }
        }
        nodes.sort();
        Ok(nodes)
    }
}

/// `udevadm info --query=all --name=<node>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Udevadm;

impl MetadataQuery for Udevadm {
    fn query(&self, node: &Path) -> io::Result<String> {
        let output = Command::new("udevadm")
            .arg("info")
            .arg("--query=all")
            .arg(format!("--name={}", node.display()))
            .output()?;

        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "udevadm {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reads USB VID:PID from sysfs and renders them as udev properties.
#[derive(Debug, Clone)]
pub struct Sysfs {
    class_dir: PathBuf,
}

impl Sysfs {
    pub fn new(class_dir: impl Into<PathBuf>) -> Self {
        Self {
            class_dir: class_dir.into(),
        }
    }
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new("/sys/class/video4linux")
    }
}

impl MetadataQuery for Sysfs {
    fn query(&self, node: &Path) -> io::Result<String> {
        // /dev/video2 → "video2"
        let name = node
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "not a device node"))?;
        // <class>/video2/device links to the USB interface dir; its parent
        // is the USB device dir holding idVendor/idProduct.
        let interface_dir = std::fs::canonicalize(self.class_dir.join(name).join("device"))?;
        let usb_device_dir = interface_dir
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no USB parent device"))?;

        let vid = std::fs::read_to_string(usb_device_dir.join("idVendor"))?;
        let pid = std::fs::read_to_string(usb_device_dir.join("idProduct"))?;
        Ok(format!(
            "{VENDOR_KEY}={}\n{MODEL_KEY}={}\n",
            vid.trim(),
            pid.trim()
        ))
    }
}

/// Metadata backend selected by configuration.
#[derive(Debug, Clone, Default)]
pub enum MetadataSource {
    #[default]
    Udevadm,
    Sysfs(Sysfs),
}

impl MetadataQuery for MetadataSource {
    fn query(&self, node: &Path) -> io::Result<String> {
        match self {
            MetadataSource::Udevadm => Udevadm.query(node),
            MetadataSource::Sysfs(sysfs) => sysfs.query(node),
        }
    }
}

impl FromStr for MetadataSource {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "udevadm" => Ok(MetadataSource::Udevadm),
            "sysfs" => Ok(MetadataSource::Sysfs(Sysfs::default())),
            other => Err(MetadataError::UnknownSource(other.to_string())),
        }
    }
}
