//! # ridgeline-terrain
//!
//! Terrain metrics and feature extraction over square elevation grids.
//!
//! Everything here is a pure function of an [`ElevationGrid`](ridgeline_dem::ElevationGrid):
//! - [`metrics`]: slope, aspect, curvature and the Terrain Ruggedness Index
//! - [`features`]: peak and valley cells
//! - [`contour`]: marching-squares isolines at chosen levels
//! - [`stats`], [`classify`], [`profile`]: summaries, relief classes and transects
//!
//! ## Example
//!
//! ```no_run
//! use ridgeline_dem::{GridArea, SyntheticTerrain};
//! use ridgeline_terrain::{attach_metrics, default_contour_levels, detect_peaks_and_valleys, trace_contours};
//!
//! let mut grid = SyntheticTerrain::default().generate_seeded(&GridArea::default(), 1)?;
//! let metrics = attach_metrics(&mut grid)?;
//! let found = detect_peaks_and_valleys(&grid, 50.0)?;
//! let contours = trace_contours(&grid, &default_contour_levels());
//! println!(
//!     "TRI {:?}, {} peaks, {} valleys, {} contours",
//!     metrics.ruggedness,
//!     found.peaks.len(),
//!     found.valleys.len(),
//!     contours.len()
//! );
//! # Ok::<(), ridgeline_terrain::TerrainError>(())
//! ```

pub mod classify;
pub mod contour;
mod error;
pub mod features;
pub mod metrics;
pub mod profile;
pub mod stats;

pub use classify::{ElevationZone, SlopeClass, ZoneScheme};
pub use contour::{default_contour_levels, trace_contours, trace_level, Contour};
pub use error::TerrainError;
pub use features::{detect_peaks_and_valleys, FeatureKind, PeaksAndValleys, TerrainFeature, DEFAULT_THRESHOLD};
pub use metrics::{
    aspect, attach_metrics, compute_metrics, curvature, gradient, ruggedness_field, slope, terrain_ruggedness,
    Gradient, TerrainMetrics,
};
pub use profile::{elevation_profile, haversine_distance, ProfilePoint};
pub use stats::ElevationStatistics;

/// Result type for terrain operations.
pub type Result<T> = std::result::Result<T, TerrainError>;
