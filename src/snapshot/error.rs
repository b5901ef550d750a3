//! Snapshot error types.

use thiserror::Error;

/// Failure to export or read back a [`Snapshot`](super::Snapshot).
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot binary encoding failed: {0}")]
    Binary(#[from] bincode::Error),

    /// The snapshot was written by an incompatible format revision.
    #[error("snapshot format v{found} cannot be read (this build reads v{supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
