//! Error types for terrain computations.

use ridgeline_dem::DemError;
use thiserror::Error;

/// Errors from terrain metrics and feature extraction.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// The grid has too few rows/columns for the requested computation.
    #[error("Grid of size {grid_size} is too small (need at least {minimum}x{minimum})")]
    GridTooSmall {
        /// Actual grid dimension.
        grid_size: usize,
        /// Minimum dimension required.
        minimum: usize,
    },

    /// Peak/valley threshold must be a non-negative number.
    #[error("Invalid threshold {0}: must be a non-negative number")]
    InvalidThreshold(f64),

    /// A parameter is outside its valid range.
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// No elevations to summarize.
    #[error("No elevation values available")]
    NoElevationData,

    /// Grid construction or attachment failed.
    #[error(transparent)]
    Grid(#[from] DemError),
}
