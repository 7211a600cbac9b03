//! End-to-end runs: acquire a grid, derive metrics and features, write GeoJSON.

use crate::config::{AnalysisConfig, OutputConfig, SourceConfig};
use crate::{CliError, Result};
use chrono::{DateTime, Utc};
use ridgeline_dem::{
    acquire, grid_coordinates, load_points, resample, ElevationGrid, ElevationMemo, ElevationSample, GridArea,
    MemoKey,
};
use ridgeline_export::{
    contours_to_feature_collection, grid_records, points_to_feature_collection, write_feature_collection,
};
use ridgeline_terrain::{
    attach_metrics, detect_peaks_and_valleys, elevation_profile, trace_contours, ElevationStatistics, ElevationZone,
    ProfilePoint, SlopeClass,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const POINTS_FILE: &str = "points.geojson";
pub const PEAKS_FILE: &str = "peaks.geojson";
pub const VALLEYS_FILE: &str = "valleys.geojson";
pub const CONTOURS_FILE: &str = "contours.geojson";
pub const SUMMARY_FILE: &str = "summary.yaml";

/// Outcome of `analyze`, also written as `summary.yaml`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub area: GridArea,
    pub grid_size: usize,
    pub statistics: ElevationStatistics,
    /// Terrain Ruggedness Index, absent below 3x3.
    pub ruggedness: Option<f64>,
    pub peak_count: usize,
    pub valley_count: usize,
    pub contour_count: usize,
    /// Cells per slope class.
    pub slope_classes: BTreeMap<String, usize>,
    /// Cells per altitude zone.
    pub elevation_zones: BTreeMap<String, usize>,
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Outcome of `fetch`.
#[derive(Debug, Clone, Serialize)]
pub struct FetchSummary {
    pub generated_at: DateTime<Utc>,
    pub provider: String,
    pub requested: usize,
    pub missing: usize,
    pub statistics: Option<ElevationStatistics>,
    pub output: PathBuf,
}

/// Runs pipelines and keeps built grids for reuse within the process.
#[derive(Debug, Default)]
pub struct Session {
    memo: ElevationMemo<ElevationGrid>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized grids.
    pub fn cached_grids(&self) -> usize {
        self.memo.len()
    }

    /// Forget every memoized grid.
    pub fn clear(&mut self) {
        self.memo.clear();
    }

    /// Build the configured grid, or reuse it when the same inputs were seen before.
    pub fn grid(&mut self, config: &AnalysisConfig) -> Result<ElevationGrid> {
        let area = config.area;
        let grid = match &config.source {
            SourceConfig::Synthetic { terrain, seed } => {
                let key = MemoKey::synthetic(terrain, &area, *seed)?;
                self.memo.get_or_insert_with(key, || match seed {
                    Some(seed) => terrain.generate_seeded(&area, *seed),
                    None => terrain.generate(&area),
                })?
            }
            SourceConfig::Remote(remote) => {
                let key = MemoKey::remote(&area, remote.provider, remote.effective_endpoint());
                let source = remote.source()?;
                let rate = remote.rate_limit()?;
                self.memo.get_or_insert_with(key, || {
                    let samples = acquire(&source, &grid_coordinates(&area)?, &rate)?;
                    ElevationGrid::from_samples(&samples, area.grid_size)
                })?
            }
            SourceConfig::Raster(raster) => {
                let key = MemoKey::file(&raster.path, raster.bbox.as_ref(), Some(raster.resample));
                self.memo.get_or_insert_with(key, || {
                    let points = load_points(&raster.path, raster.bbox.as_ref())?;
                    debug!(path = %raster.path.display(), points = points.len(), "Loaded input points");
                    resample(&points, raster.resample)
                })?
            }
        };
        Ok(grid.clone())
    }

    /// Full analysis: grid, metrics, peaks and valleys, contours, statistics,
    /// GeoJSON layers and a YAML summary in the output directory.
    pub fn analyze(&mut self, config: &AnalysisConfig) -> Result<AnalysisSummary> {
        config.validate()?;
        let generated_at = Utc::now();
        info!(source = %config.source.label(), grid_size = config.area.grid_size, "Starting analysis");

        let mut grid = self.grid(config)?;
        let metrics = attach_metrics(&mut grid)?;
        let found = detect_peaks_and_valleys(&grid, config.features.threshold)?;
        let contours = trace_contours(&grid, &config.features.contour_levels);
        let statistics = ElevationStatistics::for_grid(&grid)?;
        info!(
            peaks = found.peaks.len(),
            valleys = found.valleys.len(),
            contours = contours.len(),
            "Extracted terrain features"
        );

        let mut slope_classes = BTreeMap::new();
        for &s in &metrics.slope {
            *slope_classes.entry(SlopeClass::from_degrees(s).label().to_string()).or_insert(0) += 1;
        }
        let mut elevation_zones = BTreeMap::new();
        for p in grid.points() {
            let zone = ElevationZone::classify(p.elevation, config.features.zone_scheme);
            *elevation_zones.entry(zone.label().to_string()).or_insert(0) += 1;
        }

        let output_dir = prepare_output_dir(&config.output, generated_at)?;
        let primary = config.output.primary_property.as_str();
        let mut files = Vec::new();

        let path = output_dir.join(POINTS_FILE);
        write_feature_collection(&path, &points_to_feature_collection(&grid_records(&grid), primary))?;
        files.push(path);
        let path = output_dir.join(PEAKS_FILE);
        write_feature_collection(&path, &points_to_feature_collection(&found.peaks, primary))?;
        files.push(path);
        let path = output_dir.join(VALLEYS_FILE);
        write_feature_collection(&path, &points_to_feature_collection(&found.valleys, primary))?;
        files.push(path);
        let path = output_dir.join(CONTOURS_FILE);
        write_feature_collection(&path, &contours_to_feature_collection(&contours))?;
        files.push(path);

        let summary_path = output_dir.join(SUMMARY_FILE);
        files.push(summary_path.clone());
        let summary = AnalysisSummary {
            generated_at,
            source: config.source.label(),
            area: config.area,
            grid_size: grid.grid_size(),
            statistics,
            ruggedness: metrics.ruggedness,
            peak_count: found.peaks.len(),
            valley_count: found.valleys.len(),
            contour_count: contours.len(),
            slope_classes,
            elevation_zones,
            output_dir: output_dir.clone(),
            files,
        };
        write_text(&summary_path, &serde_yaml::to_string(&summary)?)?;

        info!(dir = %output_dir.display(), "Analysis complete");
        Ok(summary)
    }

    /// Acquire the configured area from the remote provider and write every
    /// sample, including those without elevation, to `output`.
    pub fn fetch(&self, config: &AnalysisConfig, output: &Path) -> Result<FetchSummary> {
        let SourceConfig::Remote(remote) = &config.source else {
            return Err(CliError::argument("source", "fetch needs a remote source"));
        };
        config.validate()?;
        let generated_at = Utc::now();
        let source = remote.source()?;
        let coords = grid_coordinates(&config.area)?;
        let samples = acquire(&source, &coords, &remote.rate_limit()?)?;

        let missing = samples.iter().filter(|s| s.elevation.is_none()).count();
        if missing > 0 {
            warn!(missing, total = samples.len(), "Some points have no elevation");
        }
        let statistics = sample_statistics(&samples);

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        let collection = points_to_feature_collection(&samples, &config.output.primary_property);
        write_feature_collection(output, &collection)?;
        info!(path = %output.display(), points = samples.len(), missing, "Fetch complete");

        Ok(FetchSummary {
            generated_at,
            provider: remote.provider.to_string(),
            requested: coords.len(),
            missing,
            statistics,
            output: output.to_path_buf(),
        })
    }

    /// Elevation transect across the configured grid.
    pub fn profile(
        &mut self,
        config: &AnalysisConfig,
        start: (f64, f64),
        end: (f64, f64),
        num_points: usize,
    ) -> Result<Vec<ProfilePoint>> {
        config.validate()?;
        let grid = self.grid(config)?;
        Ok(elevation_profile(&grid, start, end, num_points)?)
    }
}

fn sample_statistics(samples: &[ElevationSample]) -> Option<ElevationStatistics> {
    ElevationStatistics::for_samples(samples).ok()
}

/// Output directory for a run, created if needed.
fn prepare_output_dir(output: &OutputConfig, generated_at: DateTime<Utc>) -> Result<PathBuf> {
    let dir = if output.timestamped {
        output.directory.join(generated_at.format("%Y%m%dT%H%M%SZ").to_string())
    } else {
        output.directory.clone()
    };
    create_dir(&dir)?;
    Ok(dir)
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| CliError::Output {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|source| CliError::Output {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `LAT,LON`.
pub fn parse_coordinate(text: &str) -> Result<(f64, f64)> {
    let invalid = || CliError::argument("coordinate", format!("expected LAT,LON, got '{}'", text));
    let (lat, lon) = text.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok((lat, lon))
}

/// Render a profile as an aligned text table.
pub fn format_profile(profile: &[ProfilePoint]) -> String {
    let mut out = format!(
        "{:>12} {:>12} {:>12} {:>14}\n",
        "lat", "lon", "elevation_m", "distance_km"
    );
    for p in profile {
        out.push_str(&format!(
            "{:>12.6} {:>12.6} {:>12.1} {:>14.3}\n",
            p.lat, p.lon, p.elevation, p.distance_km
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(grid_size: usize, seed: u64) -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.area.grid_size = grid_size;
        config.source = SourceConfig::Synthetic {
            terrain: Default::default(),
            seed: Some(seed),
        };
        config
    }

    #[test]
    fn test_grid_is_memoized() {
        let mut session = Session::new();
        let config = synthetic(12, 3);
        let first = session.grid(&config).unwrap();
        let second = session.grid(&config).unwrap();
        assert_eq!(first, second);
        assert_eq!(session.cached_grids(), 1);

        session.grid(&synthetic(12, 4)).unwrap();
        assert_eq!(session.cached_grids(), 2);
        session.clear();
        assert_eq!(session.cached_grids(), 0);
    }

    #[test]
    fn test_unseeded_grid_is_reused() {
        let mut session = Session::new();
        let mut config = synthetic(8, 0);
        config.source = SourceConfig::default();
        assert_eq!(session.grid(&config).unwrap(), session.grid(&config).unwrap());
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("-25.2,-50.9").unwrap(), (-25.2, -50.9));
        assert_eq!(parse_coordinate(" -25.2 , -50.9 ").unwrap(), (-25.2, -50.9));
        assert!(parse_coordinate("-25.2").is_err());
        assert!(parse_coordinate("abc,1").is_err());
        assert!(parse_coordinate("95,0").unwrap_err().is_configuration());
    }

    #[test]
    fn test_format_profile() {
        let profile = vec![
            ProfilePoint {
                lat: -25.0,
                lon: -51.0,
                elevation: 900.0,
                distance_km: 0.0,
            },
            ProfilePoint {
                lat: -25.1,
                lon: -51.0,
                elevation: 950.5,
                distance_km: 11.12,
            },
        ];
        let table = format_profile(&profile);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("elevation_m"));
        assert!(lines[2].contains("950.5"));
        assert!(lines[2].contains("11.120"));
    }

    #[test]
    fn test_fetch_requires_remote_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::new()
            .fetch(&synthetic(4, 1), &dir.path().join("out.geojson"))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_profile_uses_grid() {
        let mut session = Session::new();
        let config = synthetic(10, 5);
        let area = config.area;
        let start = (area.center_lat - area.extent, area.center_lon - area.extent);
        let end = (area.center_lat + area.extent, area.center_lon + area.extent);
        let profile = session.profile(&config, start, end, 5).unwrap();
        assert_eq!(profile.len(), 5);

        let grid = session.grid(&config).unwrap();
        assert_eq!(profile[0].elevation, grid.points()[0].elevation);
        assert_eq!(profile[4].elevation, grid.points()[99].elevation);
    }
}
