//! Elevation transects between two coordinates.

use crate::{Result, TerrainError};
use ridgeline_dem::{linspace, ElevationGrid};
use serde::Serialize;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One sample along a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub lat: f64,
    pub lon: f64,
    /// Elevation of the nearest grid point.
    pub elevation: f64,
    /// Cumulative distance from the start, in kilometres.
    pub distance_km: f64,
}

/// Sample `num_points` evenly spaced positions on the straight line from
/// `start` to `end` (both `(lat, lon)`), each taking the elevation of the
/// nearest grid point.
pub fn elevation_profile(
    grid: &ElevationGrid,
    start: (f64, f64),
    end: (f64, f64),
    num_points: usize,
) -> Result<Vec<ProfilePoint>> {
    if num_points < 2 {
        return Err(TerrainError::InvalidParameter {
            name: "num_points",
            value: num_points.to_string(),
            reason: "a profile needs at least 2 points".to_string(),
        });
    }

    let lats = linspace(start.0, end.0, num_points);
    let lons = linspace(start.1, end.1, num_points);

    let mut profile: Vec<ProfilePoint> = Vec::with_capacity(num_points);
    for (&lat, &lon) in lats.iter().zip(&lons) {
        let distance_km = match profile.last() {
            Some(prev) => prev.distance_km + haversine_distance(prev.lat, prev.lon, lat, lon) / 1000.0,
            None => 0.0,
        };
        profile.push(ProfilePoint {
            lat,
            lon,
            elevation: grid.nearest_point(lat, lon).elevation,
            distance_km,
        });
    }
    Ok(profile)
}

/// Great-circle distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ridgeline_dem::ElevationPoint;

    #[test]
    fn test_haversine_distance() {
        // One degree of latitude is about 111 km.
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert_relative_eq!(d, 111_195.0, max_relative = 1e-3);
        assert_eq!(haversine_distance(-25.0, -50.0, -25.0, -50.0), 0.0);
    }

    #[test]
    fn test_profile_samples_nearest_points() {
        let points = (0..9)
            .map(|k| ElevationPoint::new((k / 3) as f64 * 0.01, (k % 3) as f64 * 0.01, k as f64 * 10.0))
            .collect();
        let grid = ElevationGrid::from_points(points, 3).unwrap();

        let profile = elevation_profile(&grid, (0.0, 0.0), (0.02, 0.02), 3).unwrap();
        assert_eq!(profile.len(), 3);
        let elevations: Vec<f64> = profile.iter().map(|p| p.elevation).collect();
        assert_eq!(elevations, vec![0.0, 40.0, 80.0]);

        assert_eq!(profile[0].distance_km, 0.0);
        assert!(profile[1].distance_km > 0.0);
        assert!(profile[2].distance_km > profile[1].distance_km);
        assert_relative_eq!(
            profile[2].distance_km,
            haversine_distance(0.0, 0.0, 0.02, 0.02) / 1000.0,
            max_relative = 1e-4
        );
    }

    #[test]
    fn test_profile_needs_two_points() {
        let grid = ElevationGrid::from_points(vec![ElevationPoint::new(0.0, 0.0, 1.0)], 1).unwrap();
        assert!(elevation_profile(&grid, (0.0, 0.0), (1.0, 1.0), 1).is_err());
    }
}
