//! Finite-difference terrain metrics: slope, aspect, curvature and ruggedness.
//!
//! All derivatives use unit grid spacing. Interior cells take central
//! differences; the first and last row/column take one-sided differences.
//! Results are flat vectors in the grid's row-major order.

use crate::{Result, TerrainError};
use ridgeline_dem::ElevationGrid;
use serde::Serialize;
use tracing::debug;

/// Attribute name used when slope is attached to a grid.
pub const SLOPE: &str = "slope";
/// Attribute name used when aspect is attached to a grid.
pub const ASPECT: &str = "aspect";
/// Attribute name used when curvature is attached to a grid.
pub const CURVATURE: &str = "curvature";

/// Largest representable slope strictly below 90 degrees.
fn max_slope() -> f64 {
    f64::from_bits(90.0f64.to_bits() - 1)
}

/// Derivatives of a row-major `n x n` field along both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    /// d/d(row), i.e. along latitude.
    pub dy: Vec<f64>,
    /// d/d(col), i.e. along longitude.
    pub dx: Vec<f64>,
}

/// Discrete gradient of `values` (row-major, `grid_size x grid_size`).
pub fn gradient(values: &[f64], grid_size: usize) -> Result<Gradient> {
    require_size(grid_size, 2)?;
    let n = grid_size;
    if values.len() != n * n {
        return Err(ridgeline_dem::DemError::ShapeMismatch {
            grid_size: n,
            expected: n * n,
            actual: values.len(),
        }
        .into());
    }

    let at = |i: usize, j: usize| values[i * n + j];
    let diff = |lo: f64, hi: f64, span: usize| (hi - lo) / span as f64;

    let mut dy = vec![0.0; n * n];
    let mut dx = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            dy[i * n + j] = match i {
                0 => diff(at(0, j), at(1, j), 1),
                _ if i == n - 1 => diff(at(n - 2, j), at(n - 1, j), 1),
                _ => diff(at(i - 1, j), at(i + 1, j), 2),
            };
            dx[i * n + j] = match j {
                0 => diff(at(i, 0), at(i, 1), 1),
                _ if j == n - 1 => diff(at(i, n - 2), at(i, n - 1), 1),
                _ => diff(at(i, j - 1), at(i, j + 1), 2),
            };
        }
    }
    Ok(Gradient { dy, dx })
}

/// Slope in degrees, `atan(sqrt(gx^2 + gy^2))`, in `[0, 90)`.
pub fn slope(grid: &ElevationGrid) -> Result<Vec<f64>> {
    let g = gradient(&grid.elevations(), grid.grid_size())?;
    Ok(slope_from_gradient(&g))
}

fn slope_from_gradient(g: &Gradient) -> Vec<f64> {
    g.dx
        .iter()
        .zip(&g.dy)
        .map(|(gx, gy)| gx.hypot(*gy).atan().to_degrees().min(max_slope()))
        .collect()
}

/// Aspect as a compass bearing in `[0, 360)`: 0 = North, 90 = East.
///
/// Computed as `(90 - degrees(atan2(-gy, gx))) mod 360`. A flat cell has
/// `atan2(0, 0) = 0` and therefore reports 90; this is a convention, not a
/// meaningful direction.
pub fn aspect(grid: &ElevationGrid) -> Result<Vec<f64>> {
    let g = gradient(&grid.elevations(), grid.grid_size())?;
    Ok(aspect_from_gradient(&g))
}

fn aspect_from_gradient(g: &Gradient) -> Vec<f64> {
    g.dx
        .iter()
        .zip(&g.dy)
        .map(|(gx, gy)| {
            let bearing = (90.0 - (-gy).atan2(*gx).to_degrees()).rem_euclid(360.0);
            // rem_euclid can round up to exactly 360 for tiny negatives
            if bearing >= 360.0 {
                0.0
            } else {
                bearing
            }
        })
        .collect()
}

/// Unsigned curvature `sqrt(gxx^2 + gyy^2)`.
///
/// `gxx` is the column derivative of `gx`, `gyy` the row derivative of `gy`.
/// This does not separate convex from concave terrain.
pub fn curvature(grid: &ElevationGrid) -> Result<Vec<f64>> {
    let n = grid.grid_size();
    let g = gradient(&grid.elevations(), n)?;
    curvature_from_gradient(&g, n)
}

fn curvature_from_gradient(g: &Gradient, n: usize) -> Result<Vec<f64>> {
    let gxx = gradient(&g.dx, n)?.dx;
    let gyy = gradient(&g.dy, n)?.dy;
    Ok(gxx.iter().zip(&gyy).map(|(a, b)| a.hypot(*b)).collect())
}

/// The 8 neighbours of interior cell `(i, j)`, row by row.
pub(crate) fn neighbors(values: &[f64], n: usize, i: usize, j: usize) -> [f64; 8] {
    let at = |r: usize, c: usize| values[r * n + c];
    [
        at(i - 1, j - 1),
        at(i - 1, j),
        at(i - 1, j + 1),
        at(i, j - 1),
        at(i, j + 1),
        at(i + 1, j - 1),
        at(i + 1, j),
        at(i + 1, j + 1),
    ]
}

/// Per-cell ruggedness: mean absolute difference to the 8 neighbours.
///
/// Border cells have no full neighbourhood and are `None`.
pub fn ruggedness_field(grid: &ElevationGrid) -> Result<Vec<Option<f64>>> {
    let n = grid.grid_size();
    require_size(n, 3)?;
    let values = grid.elevations();

    let mut field = vec![None; n * n];
    for i in 1..n - 1 {
        for j in 1..n - 1 {
            let center = values[i * n + j];
            let total: f64 = neighbors(&values, n, i, j)
                .iter()
                .map(|v| (center - v).abs())
                .sum();
            field[i * n + j] = Some(total / 8.0);
        }
    }
    Ok(field)
}

/// Terrain Ruggedness Index: mean of the per-cell values over interior cells.
pub fn terrain_ruggedness(grid: &ElevationGrid) -> Result<f64> {
    let field = ruggedness_field(grid)?;
    let interior: Vec<f64> = field.into_iter().flatten().collect();
    Ok(interior.iter().sum::<f64>() / interior.len() as f64)
}

/// All metrics for one grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainMetrics {
    pub slope: Vec<f64>,
    pub aspect: Vec<f64>,
    pub curvature: Vec<f64>,
    /// Terrain-level TRI; `None` for grids without interior cells.
    pub ruggedness: Option<f64>,
}

/// Compute slope, aspect, curvature and TRI in one pass over the gradient.
pub fn compute_metrics(grid: &ElevationGrid) -> Result<TerrainMetrics> {
    let n = grid.grid_size();
    let g = gradient(&grid.elevations(), n)?;
    let ruggedness = match terrain_ruggedness(grid) {
        Ok(tri) => Some(tri),
        Err(TerrainError::GridTooSmall { .. }) => None,
        Err(e) => return Err(e),
    };
    Ok(TerrainMetrics {
        slope: slope_from_gradient(&g),
        aspect: aspect_from_gradient(&g),
        curvature: curvature_from_gradient(&g, n)?,
        ruggedness,
    })
}

/// Compute metrics and attach slope, aspect and curvature to the grid.
///
/// Re-running overwrites earlier values; grid topology is unchanged.
pub fn attach_metrics(grid: &mut ElevationGrid) -> Result<TerrainMetrics> {
    let metrics = compute_metrics(grid)?;
    grid.set_attribute(SLOPE, metrics.slope.clone())?;
    grid.set_attribute(ASPECT, metrics.aspect.clone())?;
    grid.set_attribute(CURVATURE, metrics.curvature.clone())?;
    debug!(
        grid_size = grid.grid_size(),
        ruggedness = ?metrics.ruggedness,
        "Attached terrain metrics"
    );
    Ok(metrics)
}

fn require_size(grid_size: usize, minimum: usize) -> Result<()> {
    if grid_size < minimum {
        return Err(TerrainError::GridTooSmall { grid_size, minimum });
    }
    Ok(())
}
