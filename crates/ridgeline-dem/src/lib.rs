//! # ridgeline-dem
//!
//! Elevation grid acquisition for terrain analysis.
//!
//! This crate produces square, row-major elevation grids from:
//! - Synthetic generation (ridges, canyons and noise around a center point)
//! - Remote point-elevation providers (Mapbox Tilequery, Open-Elevation),
//!   queried one point at a time with batch rate limiting
//! - Local files (GeoTIFF rasters and GeoJSON point collections)
//!
//! ## Grid layout
//!
//! An [`ElevationGrid`] of dimension `n` holds `n * n` points. The point at flat
//! index `i * n + j` is cell `(i, j)`: rows follow latitude (south to north for
//! generated grids), columns follow longitude (west to east). The dimension is
//! always passed explicitly and validated; it is never inferred from a length.
//!
//! ## Examples
//!
//! ### Synthetic terrain
//!
//! ```no_run
//! use ridgeline_dem::{GridArea, SyntheticTerrain};
//!
//! let area = GridArea { grid_size: 10, extent: 0.05, ..GridArea::default() };
//! let grid = SyntheticTerrain::default().generate_seeded(&area, 42)?;
//! assert_eq!(grid.len(), 100);
//! # Ok::<(), ridgeline_dem::DemError>(())
//! ```
//!
//! ### Remote acquisition
//!
//! ```no_run
//! use ridgeline_dem::{acquire, grid_coordinates, GridArea, RateLimit, RemoteSource};
//!
//! let area = GridArea { grid_size: 5, ..GridArea::default() };
//! let source = RemoteSource::open_elevation()?;
//! let samples = acquire(&source, &grid_coordinates(&area)?, &RateLimit::default())?;
//! let missing = samples.iter().filter(|s| s.elevation.is_none()).count();
//! println!("{} of {} points without elevation", missing, samples.len());
//! # Ok::<(), ridgeline_dem::DemError>(())
//! ```

mod error;
mod grid;
mod input;
mod memo;
mod raster;
mod remote;
mod resample;
mod synthetic;

pub use error::DemError;
pub use grid::{flatten, reshape, ElevationGrid, ElevationPoint, ElevationSample};
pub use input::{load_many, load_points, parse_geojson_points, read_geojson_points, InputFormat};
pub use memo::{AreaKey, BoundsKey, ElevationMemo, MemoKey, DEFAULT_MEMO_CAPACITY};
pub use raster::{read_raster, BoundingBox, DemRaster, NODATA_SENTINEL};
pub use remote::{
    acquire, describe_metrics, parse_mapbox_response, parse_open_elevation_response, ElevationLookup,
    Provider, RateLimit, RemoteSource, FAILURES_METRIC, MAPBOX_TILEQUERY_ENDPOINT, MAPBOX_TOKEN_ENV,
    OPEN_ELEVATION_ENDPOINT, REQUESTS_METRIC, REQUEST_TIMEOUT,
};
pub use resample::resample;
pub use synthetic::{
    grid_coordinates, linspace, Canyon, GridArea, Ridge, SyntheticTerrain, DEFAULT_CENTER_LAT,
    DEFAULT_CENTER_LON, DEFAULT_EXTENT, DEFAULT_GRID_SIZE,
};

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
