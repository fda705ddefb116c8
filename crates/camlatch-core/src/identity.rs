//! Target device identity (USB vendor + model id).

use crate::values::ValidationError;
use std::fmt;

/// udev property carrying the USB vendor id.
pub const VENDOR_KEY: &str = "ID_VENDOR_ID";
/// udev property carrying the USB model (product) id.
pub const MODEL_KEY: &str = "ID_MODEL_ID";

/// The camera to look for, as a pair of hex id strings (e.g. `1bcf`, `0b09`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIdentity {
    vendor_id: String,
    model_id: String,
}

impl TargetIdentity {
    /// Build an identity from hex id strings. Ids are compared
    /// case-insensitively and stored lowercase.
    pub fn new(vendor_id: &str, model_id: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            vendor_id: normalize_id(vendor_id)?,
            model_id: normalize_id(model_id)?,
        })
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Whether one line of metadata signals this identity's vendor id.
    pub fn is_vendor_signal(&self, line: &str) -> bool {
        property_equals(line, VENDOR_KEY, &self.vendor_id)
    }

    /// Whether one line of metadata signals this identity's model id.
    pub fn is_model_signal(&self, line: &str) -> bool {
        property_equals(line, MODEL_KEY, &self.model_id)
    }

    /// Whether a metadata text block carries both signals.
    pub fn matches_metadata(&self, text: &str) -> bool {
        let mut vendor = false;
        let mut model = false;
        for line in text.lines() {
            vendor |= self.is_vendor_signal(line);
            model |= self.is_model_signal(line);
            if vendor && model {
                return true;
            }
        }
        false
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vendor_id, self.model_id)
    }
}

fn normalize_id(raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidId(raw.to_string()));
    }
    Ok(id.to_ascii_lowercase())
}

/// Split one `KEY=VALUE` property line, tolerating the `E: ` prefix
/// `udevadm info` puts in front of properties.
fn parse_property(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let line = line.strip_prefix("E:").map(str::trim_start).unwrap_or(line);
    line.split_once('=').map(|(k, v)| (k, v.trim()))
}

fn property_equals(line: &str, key: &str, value: &str) -> bool {
    matches!(parse_property(line), Some((k, v)) if k == key && v.eq_ignore_ascii_case(value))
}

/// First value of `key` in a metadata text block.
pub fn property<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines()
        .filter_map(parse_property)
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}
