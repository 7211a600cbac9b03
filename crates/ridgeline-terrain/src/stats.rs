//! Descriptive statistics of elevation values.

use crate::{Result, TerrainError};
use ridgeline_dem::{ElevationGrid, ElevationSample};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, Max, Median, Min};

/// Summary of a set of elevations, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std_dev: Option<f64>,
    pub range: f64,
    /// 25th percentile, interpolated linearly between ranks.
    pub q25: f64,
    /// 75th percentile, interpolated linearly between ranks.
    pub q75: f64,
}

impl ElevationStatistics {
    /// Summarize finite values; NaN and infinities are ignored.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Result<Self> {
        let mut values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return Err(TerrainError::NoElevationData);
        }
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let q25 = linear_quantile(&values, 0.25);
        let q75 = linear_quantile(&values, 0.75);
        let mut data = Data::new(values);

        let min = data.min();
        let max = data.max();
        let mean = data.mean().ok_or(TerrainError::NoElevationData)?;
        let std_dev = if count > 1 {
            data.std_dev()
        } else {
            None
        };
        let median = data.median();

        Ok(Self {
            count,
            min,
            max,
            mean,
            median,
            std_dev,
            range: max - min,
            q25,
            q75,
        })
    }

    /// Statistics of a grid's elevations.
    pub fn for_grid(grid: &ElevationGrid) -> Result<Self> {
        Self::from_values(grid.points().iter().map(|p| p.elevation))
    }

    /// Statistics of acquired samples, skipping those without elevation.
    pub fn for_samples(samples: &[ElevationSample]) -> Result<Self> {
        Self::from_values(samples.iter().filter_map(|s| s.elevation))
    }
}

/// Quantile of sorted, non-empty values at rank `(n - 1) * p`, interpolating
/// between the neighbouring values.
fn linear_quantile(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * p;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_statistics() {
        let stats = ElevationStatistics::from_values([600.0, 800.0, 700.0, 900.0, 1000.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 600.0);
        assert_eq!(stats.max, 1000.0);
        assert_eq!(stats.range, 400.0);
        assert_relative_eq!(stats.mean, 800.0);
        assert_relative_eq!(stats.median, 800.0);
        assert_relative_eq!(stats.std_dev.unwrap(), 250.0f64.sqrt() * 10.0, epsilon = 1e-9);
        assert!(stats.min <= stats.q25 && stats.q25 <= stats.median);
        assert!(stats.median <= stats.q75 && stats.q75 <= stats.max);
    }

    #[test]
    fn test_quartiles_interpolate_between_ranks() {
        let stats = ElevationStatistics::from_values([600.0, 800.0, 700.0, 900.0, 1000.0]).unwrap();
        assert_relative_eq!(stats.q25, 700.0);
        assert_relative_eq!(stats.q75, 900.0);

        let stats = ElevationStatistics::from_values([10.0, 40.0, 20.0, 30.0]).unwrap();
        assert_relative_eq!(stats.q25, 17.5);
        assert_relative_eq!(stats.q75, 32.5);
        assert_relative_eq!(stats.median, 25.0);
    }

    #[test]
    fn test_single_value() {
        let stats = ElevationStatistics::from_values([512.0]).unwrap();
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.q25, 512.0);
        assert_eq!(stats.q75, 512.0);
        assert_eq!(stats.range, 0.0);
    }

    #[test]
    fn test_samples_skip_nulls() {
        let samples = [
            ElevationSample { lat: 0.0, lon: 0.0, elevation: Some(10.0) },
            ElevationSample { lat: 0.0, lon: 1.0, elevation: None },
            ElevationSample { lat: 1.0, lon: 0.0, elevation: Some(30.0) },
        ];
        let stats = ElevationStatistics::for_samples(&samples).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 20.0);

        let none = [ElevationSample { lat: 0.0, lon: 0.0, elevation: None }];
        assert!(matches!(
            ElevationStatistics::for_samples(&none).unwrap_err(),
            TerrainError::NoElevationData
        ));
    }
}
