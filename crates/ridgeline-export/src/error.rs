//! Error types for GeoJSON export.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing GeoJSON.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The output file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
