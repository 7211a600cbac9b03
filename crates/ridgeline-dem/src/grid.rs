//! Square elevation grids and the flat-index mapping shared by all consumers.
//!
//! A grid of dimension `n` holds `n * n` points in row-major order: the point
//! at flat index `i * n + j` is cell `(i, j)`, where rows run along the
//! latitude axis and columns along the longitude axis.

use crate::{DemError, Result};
use serde::{Deserialize, Serialize};

/// A single elevation sample with a known height in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Elevation in meters.
    pub elevation: f64,
}

impl ElevationPoint {
    /// Create a new point.
    pub fn new(lat: f64, lon: f64, elevation: f64) -> Self {
        Self { lat, lon, elevation }
    }
}

/// A point as returned by remote acquisition, where the elevation may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Elevation in meters, `None` when the lookup failed or had no data.
    pub elevation: Option<f64>,
}

impl ElevationSample {
    /// Convert into a point, failing when the elevation is unknown.
    pub fn to_point(&self, index: usize) -> Result<ElevationPoint> {
        match self.elevation {
            Some(elevation) => Ok(ElevationPoint::new(self.lat, self.lon, elevation)),
            None => Err(DemError::MissingElevation {
                index,
                lat: self.lat,
                lon: self.lon,
            }),
        }
    }
}

impl From<ElevationPoint> for ElevationSample {
    fn from(p: ElevationPoint) -> Self {
        Self {
            lat: p.lat,
            lon: p.lon,
            elevation: Some(p.elevation),
        }
    }
}

/// An `n x n` grid of elevation points with optional per-cell attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    grid_size: usize,
    points: Vec<ElevationPoint>,
    /// Derived per-cell scalars in insertion order (e.g. slope, aspect).
    attributes: Vec<(String, Vec<f64>)>,
}

impl ElevationGrid {
    /// Build a grid from a row-major point list.
    ///
    /// Fails with [`DemError::ShapeMismatch`] unless `points.len() == grid_size * grid_size`.
    pub fn from_points(points: Vec<ElevationPoint>, grid_size: usize) -> Result<Self> {
        check_shape(points.len(), grid_size)?;
        Ok(Self {
            grid_size,
            points,
            attributes: Vec::new(),
        })
    }

    /// Build a grid from acquisition samples; every sample must carry an elevation.
    pub fn from_samples(samples: &[ElevationSample], grid_size: usize) -> Result<Self> {
        check_shape(samples.len(), grid_size)?;
        let points = samples
            .iter()
            .enumerate()
            .map(|(i, s)| s.to_point(i))
            .collect::<Result<Vec<_>>>()?;
        Self::from_points(points, grid_size)
    }

    /// Grid dimension (rows == cols).
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid has no cells. Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in row-major order.
    pub fn points(&self) -> &[ElevationPoint] {
        &self.points
    }

    /// Consume the grid and return its points in row-major order.
    pub fn into_points(self) -> Vec<ElevationPoint> {
        self.points
    }

    /// Flat index of cell `(row, col)`.
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.grid_size + col
    }

    /// Cell `(row, col)` of a flat index.
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.grid_size, index % self.grid_size)
    }

    /// Point at cell `(row, col)`, if inside the grid.
    pub fn point(&self, row: usize, col: usize) -> Option<&ElevationPoint> {
        if row >= self.grid_size || col >= self.grid_size {
            return None;
        }
        self.points.get(self.flat_index(row, col))
    }

    /// Elevations in row-major order.
    pub fn elevations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.elevation).collect()
    }

    /// Elevations as an `n x n` matrix indexed `[row][col]`.
    pub fn elevation_matrix(&self) -> Vec<Vec<f64>> {
        self.points
            .chunks(self.grid_size)
            .map(|row| row.iter().map(|p| p.elevation).collect())
            .collect()
    }

    /// Attach (or overwrite) a derived per-cell attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        check_shape(values.len(), self.grid_size)?;
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.attributes.push((name, values)),
        }
        Ok(())
    }

    /// A derived attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&[f64]> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// All derived attributes in the order they were first attached.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Point closest to `(lat, lon)` by planar distance in degrees.
    pub fn nearest_point(&self, lat: f64, lon: f64) -> &ElevationPoint {
        let dist = |p: &ElevationPoint| (p.lat - lat).powi(2) + (p.lon - lon).powi(2);
        // A constructed grid always has at least one point.
        let mut best = &self.points[0];
        for p in &self.points[1..] {
            if dist(p) < dist(best) {
                best = p;
            }
        }
        best
    }
}

/// Reshape a row-major slice into an `n x n` matrix.
pub fn reshape<T: Clone>(values: &[T], grid_size: usize) -> Result<Vec<Vec<T>>> {
    check_shape(values.len(), grid_size)?;
    Ok(values.chunks(grid_size).map(|row| row.to_vec()).collect())
}

/// Flatten a matrix back into row-major order.
pub fn flatten<T: Clone>(matrix: &[Vec<T>]) -> Vec<T> {
    matrix.iter().flat_map(|row| row.iter().cloned()).collect()
}

fn check_shape(actual: usize, grid_size: usize) -> Result<()> {
    if grid_size == 0 {
        return Err(DemError::invalid("grid_size", grid_size, "must be at least 1"));
    }
    let expected = grid_size * grid_size;
    if actual != expected {
        return Err(DemError::ShapeMismatch {
            grid_size,
            expected,
            actual,
        });
    }
    Ok(())
}
