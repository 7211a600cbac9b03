use ridgeline_dem::DemError;
use ridgeline_export::ExportError;
use ridgeline_terrain::TerrainError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the `ridgeline` command line.
#[derive(Debug, Error)]
pub enum CliError {
    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    // ========================================================================
    // Pipeline stages
    // ========================================================================
    #[error(transparent)]
    Dem(#[from] DemError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize summary: {0}")]
    Summary(#[from] serde_yaml::Error),
}

impl CliError {
    /// Errors caused by the invocation or config rather than by data or I/O.
    pub fn is_configuration(&self) -> bool {
        match self {
            CliError::ConfigRead { .. } | CliError::ConfigParse { .. } | CliError::InvalidArgument { .. } => true,
            CliError::Dem(e) | CliError::Terrain(TerrainError::Grid(e)) => e.is_configuration(),
            CliError::Terrain(TerrainError::InvalidThreshold(_) | TerrainError::InvalidParameter { .. }) => true,
            _ => false,
        }
    }

    pub(crate) fn argument(name: &'static str, reason: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
