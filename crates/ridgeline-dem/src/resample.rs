//! Nearest-neighbour resampling of scattered points onto a square grid.

use crate::grid::{ElevationGrid, ElevationPoint};
use crate::synthetic::linspace;
use crate::{DemError, Result};

/// Resample `points` onto a `target_resolution x target_resolution` grid.
///
/// The grid spans the bounding box of the input. Each cell takes the
/// elevation of the closest input point (planar distance in degrees; ties go
/// to the earlier point).
pub fn resample(points: &[ElevationPoint], target_resolution: usize) -> Result<ElevationGrid> {
    if target_resolution == 0 {
        return Err(DemError::invalid("target_resolution", target_resolution, "must be at least 1"));
    }
    if points.is_empty() {
        return Err(DemError::invalid("points", 0, "cannot resample an empty point set"));
    }

    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }

    let lats = linspace(min_lat, max_lat, target_resolution);
    let lons = linspace(min_lon, max_lon, target_resolution);

    let mut cells = Vec::with_capacity(target_resolution * target_resolution);
    for &lat in &lats {
        for &lon in &lons {
            let nearest = nearest(points, lat, lon);
            cells.push(ElevationPoint::new(lat, lon, nearest.elevation));
        }
    }

    ElevationGrid::from_points(cells, target_resolution)
}

fn nearest(points: &[ElevationPoint], lat: f64, lon: f64) -> &ElevationPoint {
    let mut best = &points[0];
    let mut best_d = f64::INFINITY;
    for p in points {
        let d = (p.lat - lat).powi(2) + (p.lon - lon).powi(2);
        if d < best_d {
            best = p;
            best_d = d;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_identity_on_regular_grid() {
        let points: Vec<ElevationPoint> = (0..3)
            .flat_map(|i| (0..3).map(move |j| ElevationPoint::new(i as f64, j as f64, (i * 3 + j) as f64)))
            .collect();
        let grid = resample(&points, 3).unwrap();
        assert_eq!(grid.points(), points.as_slice());
    }

    #[test]
    fn test_resample_scattered_points() {
        let points = vec![
            ElevationPoint::new(0.0, 0.0, 10.0),
            ElevationPoint::new(1.0, 1.0, 20.0),
            ElevationPoint::new(0.1, 0.9, 30.0),
        ];
        let grid = resample(&points, 2).unwrap();
        let elevations = grid.elevations();
        assert_eq!(elevations, vec![10.0, 30.0, 10.0, 20.0]);
    }

    #[test]
    fn test_resample_rejects_empty_input() {
        assert!(resample(&[], 4).unwrap_err().is_configuration());
        assert!(resample(&[ElevationPoint::new(0.0, 0.0, 1.0)], 0).is_err());
    }
}
