//! Peak and valley detection by thresholded 8-neighbour comparison.

use crate::metrics::neighbors;
use crate::{Result, TerrainError};
use ridgeline_dem::ElevationGrid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default minimum height difference, in meters.
pub const DEFAULT_THRESHOLD: f64 = 50.0;

/// Kind of a detected feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Peak,
    Valley,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Peak => "peak",
            FeatureKind::Valley => "valley",
        }
    }
}

/// A grid cell classified as a peak or valley. Coordinates and elevation are
/// the cell's own values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeature {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    pub kind: FeatureKind,
}

/// Detected peaks and valleys, each in row-major cell order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeaksAndValleys {
    pub peaks: Vec<TerrainFeature>,
    pub valleys: Vec<TerrainFeature>,
}

/// Find interior cells that stand above (peaks) or below (valleys) all 8
/// neighbours by more than `threshold`.
///
/// Every qualifying cell is reported on its own; adjacent qualifying cells are
/// not merged. Grids smaller than 3x3 have no interior cells and yield nothing.
pub fn detect_peaks_and_valleys(grid: &ElevationGrid, threshold: f64) -> Result<PeaksAndValleys> {
    if !(threshold >= 0.0) {
        return Err(TerrainError::InvalidThreshold(threshold));
    }

    let n = grid.grid_size();
    let mut found = PeaksAndValleys::default();
    if n < 3 {
        return Ok(found);
    }

    let values = grid.elevations();
    for i in 1..n - 1 {
        for j in 1..n - 1 {
            let center = values[i * n + j];
            let around = neighbors(&values, n, i, j);

            let kind = if around.iter().all(|&v| center > v + threshold) {
                FeatureKind::Peak
            } else if around.iter().all(|&v| center < v - threshold) {
                FeatureKind::Valley
            } else {
                continue;
            };

            let p = grid.points()[i * n + j];
            let feature = TerrainFeature {
                lat: p.lat,
                lon: p.lon,
                elevation: p.elevation,
                kind,
            };
            match kind {
                FeatureKind::Peak => found.peaks.push(feature),
                FeatureKind::Valley => found.valleys.push(feature),
            }
        }
    }

    debug!(
        threshold,
        peaks = found.peaks.len(),
        valleys = found.valleys.len(),
        "Detected terrain features"
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use ridgeline_dem::ElevationPoint;

    fn grid_from(values: &[f64], n: usize) -> ElevationGrid {
        let points = values
            .iter()
            .enumerate()
            .map(|(k, &e)| ElevationPoint::new(-25.0 + (k / n) as f64 * 0.01, -51.0 + (k % n) as f64 * 0.01, e))
            .collect();
        ElevationGrid::from_points(points, n).unwrap()
    }

    #[test]
    fn test_single_central_peak() {
        let grid = grid_from(&[100.0, 100.0, 100.0, 100.0, 500.0, 100.0, 100.0, 100.0, 100.0], 3);
        let found = detect_peaks_and_valleys(&grid, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.peaks.len(), 1);
        assert!(found.valleys.is_empty());

        let peak = found.peaks[0];
        assert_eq!(peak.kind, FeatureKind::Peak);
        assert_eq!(peak.elevation, 500.0);
        assert_eq!((peak.lat, peak.lon), (grid.points()[4].lat, grid.points()[4].lon));
    }

    #[test]
    fn test_single_central_valley() {
        let grid = grid_from(&[500.0, 500.0, 500.0, 500.0, 100.0, 500.0, 500.0, 500.0, 500.0], 3);
        let found = detect_peaks_and_valleys(&grid, DEFAULT_THRESHOLD).unwrap();
        assert!(found.peaks.is_empty());
        assert_eq!(found.valleys.len(), 1);
        assert_eq!(found.valleys[0].kind, FeatureKind::Valley);
    }

    #[test]
    fn test_difference_must_exceed_threshold() {
        let grid = grid_from(&[100.0, 100.0, 100.0, 100.0, 150.0, 100.0, 100.0, 100.0, 100.0], 3);
        assert!(detect_peaks_and_valleys(&grid, 50.0).unwrap().peaks.is_empty());
        assert_eq!(detect_peaks_and_valleys(&grid, 49.9).unwrap().peaks.len(), 1);
    }

    #[test]
    fn test_plateau_is_not_a_peak() {
        // Two equal adjacent high cells never exceed each other.
        let mut values = vec![0.0; 16];
        values[5] = 300.0;
        values[6] = 300.0;
        let grid = grid_from(&values, 4);
        assert!(detect_peaks_and_valleys(&grid, 0.0).unwrap().peaks.is_empty());
    }

    #[test]
    fn test_small_grid_and_bad_threshold() {
        let grid = grid_from(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(detect_peaks_and_valleys(&grid, 0.0).unwrap(), PeaksAndValleys::default());
        assert!(matches!(
            detect_peaks_and_valleys(&grid, -1.0).unwrap_err(),
            TerrainError::InvalidThreshold(_)
        ));
        assert!(detect_peaks_and_valleys(&grid, f64::NAN).is_err());
    }

    #[test]
    fn test_exclusion_and_threshold_monotonicity() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..40 {
            let n = rng.gen_range(3..12);
            let values: Vec<f64> = (0..n * n).map(|_| rng.gen_range(0.0..1000.0)).collect();
            let grid = grid_from(&values, n);

            let mut previous = usize::MAX;
            for threshold in [0.0, 10.0, 50.0, 100.0, 300.0, 1000.0] {
                let found = detect_peaks_and_valleys(&grid, threshold).unwrap();
                for peak in &found.peaks {
                    assert!(!found
                        .valleys
                        .iter()
                        .any(|v| v.lat == peak.lat && v.lon == peak.lon));
                }
                assert!(found.peaks.len() <= previous);
                previous = found.peaks.len();
            }
        }
    }
}
