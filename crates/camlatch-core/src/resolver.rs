//! Locate the target camera among the system's video nodes.

use crate::identity::TargetIdentity;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("camera with vendor ID {vendor} and model ID {model} not found")]
    NotFound { vendor: String, model: String },
    #[error("failed to list video devices: {0}")]
    Enumerate(#[source] io::Error),
}

/// Lists candidate device nodes, in the order they should be tried.
pub trait NodeSource {
    fn nodes(&self) -> io::Result<Vec<PathBuf>>;
}

/// Returns the `KEY=VALUE` property text describing one device node.
///
/// Calls are blocking and may fail independently per node.
pub trait MetadataQuery {
    fn query(&self, node: &Path) -> io::Result<String>;
}

/// Return the first node whose metadata carries both the vendor and the
/// model signal of `identity`.
///
/// A failing metadata query skips that node.
pub fn resolve(
    identity: &TargetIdentity,
    source: &dyn NodeSource,
    query: &dyn MetadataQuery,
) -> Result<PathBuf, ResolveError> {
    let nodes = source.nodes().map_err(ResolveError::Enumerate)?;
    tracing::debug!(count = nodes.len(), "scanning video nodes");

    for node in nodes {
        let text = match query.query(&node) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(device = %node.display(), error = %e, "metadata query failed");
                continue;
            }
        };
        if identity.matches_metadata(&text) {
            tracing::info!(device = %node.display(), identity = %identity, "camera found");
            return Ok(node);
        }
        tracing::debug!(device = %node.display(), "identity does not match");
    }

    Err(ResolveError::NotFound {
        vendor: identity.vendor_id().to_string(),
        model: identity.model_id().to_string(),
    })
}
