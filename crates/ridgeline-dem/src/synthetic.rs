//! Synthetic terrain generation.
//!
//! The surface is a base elevation plus sinusoidal ridges, Gaussian canyons and
//! per-cell Gaussian noise, clipped to a fixed range. All constants are
//! parameters; the defaults produce a plateau landscape around Prudentópolis, PR.

use crate::grid::{ElevationGrid, ElevationPoint};
use crate::{DemError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default grid center latitude.
pub const DEFAULT_CENTER_LAT: f64 = -25.1973;
/// Default grid center longitude.
pub const DEFAULT_CENTER_LON: f64 = -50.9780;
/// Default grid dimension.
pub const DEFAULT_GRID_SIZE: usize = 100;
/// Default half-width of the grid in degrees.
pub const DEFAULT_EXTENT: f64 = 0.15;

/// The square area covered by a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridArea {
    /// Center latitude in degrees.
    pub center_lat: f64,
    /// Center longitude in degrees.
    pub center_lon: f64,
    /// Number of rows and columns.
    pub grid_size: usize,
    /// Half-width in degrees; the grid spans `center +/- extent` on both axes.
    pub extent: f64,
}

impl Default for GridArea {
    fn default() -> Self {
        Self {
            center_lat: DEFAULT_CENTER_LAT,
            center_lon: DEFAULT_CENTER_LON,
            grid_size: DEFAULT_GRID_SIZE,
            extent: DEFAULT_EXTENT,
        }
    }
}

impl GridArea {
    /// Check grid size and extent.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(DemError::invalid("grid_size", self.grid_size, "must be at least 1"));
        }
        if !self.extent.is_finite() || self.extent < 0.0 {
            return Err(DemError::invalid("extent", self.extent, "must be finite and non-negative"));
        }
        Ok(())
    }

    /// Latitudes of the grid rows, south to north.
    pub fn latitudes(&self) -> Vec<f64> {
        linspace(self.center_lat - self.extent, self.center_lat + self.extent, self.grid_size)
    }

    /// Longitudes of the grid columns, west to east.
    pub fn longitudes(&self) -> Vec<f64> {
        linspace(self.center_lon - self.extent, self.center_lon + self.extent, self.grid_size)
    }
}

/// `n` evenly spaced values over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Row-major `(lat, lon)` coordinates of every cell in `area`.
pub fn grid_coordinates(area: &GridArea) -> Result<Vec<(f64, f64)>> {
    area.validate()?;
    let lons = area.longitudes();
    Ok(area
        .latitudes()
        .into_iter()
        .flat_map(|lat| lons.iter().map(move |&lon| (lat, lon)))
        .collect())
}

/// A sinusoidal ridge term: `amplitude * sin(dlat * lat_frequency + lat_phase) * cos(dlon * lon_frequency + lon_phase)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ridge {
    pub amplitude: f64,
    pub lat_frequency: f64,
    pub lon_frequency: f64,
    pub lat_phase: f64,
    pub lon_phase: f64,
}

impl Default for Ridge {
    fn default() -> Self {
        Self {
            amplitude: 300.0,
            lat_frequency: 30.0,
            lon_frequency: 20.0,
            lat_phase: 0.0,
            lon_phase: 0.0,
        }
    }
}

/// A Gaussian depression centered at `(lat_offset, lon_offset)` from the grid center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canyon {
    pub depth: f64,
    pub lat_offset: f64,
    pub lon_offset: f64,
    /// Denominator of the exponent, in squared degrees.
    pub spread: f64,
}

impl Default for Canyon {
    fn default() -> Self {
        Self {
            depth: 150.0,
            lat_offset: -0.05,
            lon_offset: 0.03,
            spread: 0.002,
        }
    }
}

/// Parameters of the synthetic surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticTerrain {
    pub base_elevation: f64,
    pub ridges: Vec<Ridge>,
    pub canyons: Vec<Canyon>,
    /// Standard deviation of the per-cell noise in meters. Zero disables noise.
    pub noise_std_dev: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
}

impl Default for SyntheticTerrain {
    fn default() -> Self {
        Self {
            base_elevation: 800.0,
            ridges: vec![Ridge::default()],
            canyons: vec![Canyon::default()],
            noise_std_dev: 25.0,
            min_elevation: 500.0,
            max_elevation: 1400.0,
        }
    }
}

impl SyntheticTerrain {
    /// Noise-free surface height at an offset from the grid center.
    pub fn surface(&self, dlat: f64, dlon: f64) -> f64 {
        let ridges: f64 = self
            .ridges
            .iter()
            .map(|r| {
                r.amplitude
                    * (dlat * r.lat_frequency + r.lat_phase).sin()
                    * (dlon * r.lon_frequency + r.lon_phase).cos()
            })
            .sum();
        let canyons: f64 = self
            .canyons
            .iter()
            .map(|c| {
                let d2 = (dlat - c.lat_offset).powi(2) + (dlon - c.lon_offset).powi(2);
                c.depth * (-d2 / c.spread).exp()
            })
            .sum();
        self.base_elevation + ridges - canyons
    }

    /// Check the noise scale, clip range and canyon spreads.
    pub fn validate(&self) -> Result<()> {
        if !(self.noise_std_dev >= 0.0 && self.noise_std_dev.is_finite()) {
            return Err(DemError::invalid(
                "noise_std_dev",
                self.noise_std_dev,
                "must be finite and non-negative",
            ));
        }
        if !(self.min_elevation <= self.max_elevation) {
            return Err(DemError::invalid(
                "min_elevation",
                self.min_elevation,
                format!("must not exceed max_elevation ({})", self.max_elevation),
            ));
        }
        if let Some(c) = self.canyons.iter().find(|c| !(c.spread > 0.0)) {
            return Err(DemError::invalid("spread", c.spread, "must be positive"));
        }
        Ok(())
    }

    /// Generate a grid using the given random source for noise.
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, area: &GridArea, rng: &mut R) -> Result<ElevationGrid> {
        self.validate()?;
        let noise = Normal::new(0.0, self.noise_std_dev)
            .map_err(|e| DemError::invalid("noise_std_dev", self.noise_std_dev, e.to_string()))?;

        let points: Vec<ElevationPoint> = grid_coordinates(area)?
            .into_iter()
            .map(|(lat, lon)| {
                let raw = self.surface(lat - area.center_lat, lon - area.center_lon) + noise.sample(rng);
                ElevationPoint::new(lat, lon, raw.clamp(self.min_elevation, self.max_elevation))
            })
            .collect();

        debug!(
            grid_size = area.grid_size,
            extent = area.extent,
            "Generated synthetic terrain"
        );
        ElevationGrid::from_points(points, area.grid_size)
    }

    /// Generate a reproducible grid from a seed.
    pub fn generate_seeded(&self, area: &GridArea, seed: u64) -> Result<ElevationGrid> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate_with_rng(area, &mut rng)
    }

    /// Generate a grid with fresh entropy; two calls give different noise.
    pub fn generate(&self, area: &GridArea) -> Result<ElevationGrid> {
        self.generate_with_rng(area, &mut rand::thread_rng())
    }
}
