//! YAML analysis configuration.
//!
//! Every section is optional; a missing file or an empty document yields the
//! defaults (a synthetic 100x100 grid around the default center).
//!
//! ```yaml
//! area:
//!   grid_size: 60
//!   extent: 0.1
//! source:
//!   kind: remote
//!   provider: open_elevation
//!   batch_size: 50
//! features:
//!   threshold: 40
//! output:
//!   directory: out
//! ```

use crate::{CliError, Result};
use ridgeline_dem::{
    BoundingBox, GridArea, Provider, RateLimit, RemoteSource, SyntheticTerrain, DEFAULT_GRID_SIZE, MAPBOX_TOKEN_ENV,
};
use ridgeline_export::DEFAULT_PRIMARY_PROPERTY;
use ridgeline_terrain::{default_contour_levels, ZoneScheme, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration of an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub area: GridArea,
    pub source: SourceConfig,
    pub features: FeatureConfig,
    pub output: OutputConfig,
}

/// Where elevations come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Synthetic {
        #[serde(default)]
        terrain: SyntheticTerrain,
        /// Fixed seed for reproducible noise.
        #[serde(default)]
        seed: Option<u64>,
    },
    Remote(RemoteConfig),
    Raster(RasterConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Synthetic {
            terrain: SyntheticTerrain::default(),
            seed: None,
        }
    }
}

impl SourceConfig {
    /// Short label used in logs and the run summary.
    pub fn label(&self) -> String {
        match self {
            SourceConfig::Synthetic { .. } => "synthetic".to_string(),
            SourceConfig::Remote(remote) => format!("remote:{}", remote.provider),
            SourceConfig::Raster(raster) => format!("raster:{}", raster.path.display()),
        }
    }
}

/// Remote provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub provider: Provider,
    /// Overrides the provider's public endpoint.
    pub endpoint: Option<String>,
    /// Mapbox access token. Falls back to `MAPBOX_TOKEN`.
    pub token: Option<String>,
    pub batch_size: usize,
    pub delay_secs: f64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        let limit = RateLimit::default();
        Self {
            provider: Provider::OpenElevation,
            endpoint: None,
            token: None,
            batch_size: limit.batch_size,
            delay_secs: limit.delay.as_secs_f64(),
        }
    }
}

impl RemoteConfig {
    /// Token from the config, else from the environment.
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(MAPBOX_TOKEN_ENV).ok())
    }

    /// Build the HTTP source. Fails before any request when a required token is missing.
    pub fn source(&self) -> Result<RemoteSource> {
        let token = if self.provider.requires_token() {
            self.resolve_token()
        } else {
            None
        };
        Ok(RemoteSource::new(self.provider, self.endpoint.clone(), token)?)
    }

    pub fn rate_limit(&self) -> Result<RateLimit> {
        Ok(RateLimit::new(self.batch_size, self.delay_secs)?)
    }

    /// Endpoint actually queried, used as part of the memo key.
    pub fn effective_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.provider.default_endpoint().to_string())
    }
}

/// Local raster or GeoJSON input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    /// Side of the resampled grid.
    #[serde(default = "default_resample")]
    pub resample: usize,
}

fn default_resample() -> usize {
    DEFAULT_GRID_SIZE
}

/// Feature extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Minimum elevation difference for a peak or valley, in meters.
    pub threshold: f64,
    pub contour_levels: Vec<f64>,
    /// Altitude zoning reported in the summary.
    pub zone_scheme: ZoneScheme,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            contour_levels: default_contour_levels(),
            zone_scheme: ZoneScheme::default(),
        }
    }
}

/// Output files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Headline property of point features.
    pub primary_property: String,
    /// Write into a UTC-timestamped subdirectory per run.
    pub timestamped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            primary_property: DEFAULT_PRIMARY_PROPERTY.to_string(),
            timestamped: false,
        }
    }
}

impl AnalysisConfig {
    /// Parse a YAML document.
    pub fn from_yaml(text: &str, origin: &Path) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| CliError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text, path)?;
        debug!(path = %path.display(), source = %config.source.label(), "Loaded config");
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check the values that would otherwise fail deep inside a run.
    pub fn validate(&self) -> Result<()> {
        self.area.validate()?;
        match &self.source {
            SourceConfig::Synthetic { terrain, .. } => terrain.validate()?,
            SourceConfig::Remote(remote) => {
                remote.rate_limit()?;
            }
            SourceConfig::Raster(raster) => {
                if raster.resample == 0 {
                    return Err(CliError::argument("resample", "must be at least 1"));
                }
            }
        }
        if !(self.features.threshold >= 0.0) {
            return Err(CliError::argument("threshold", "must be a non-negative number"));
        }
        if self.output.primary_property.trim().is_empty() {
            return Err(CliError::argument("primary_property", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(text: &str) -> AnalysisConfig {
        AnalysisConfig::from_yaml(text, Path::new("test.yaml")).unwrap()
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse(""), AnalysisConfig::default());
        assert_eq!(parse("{}"), AnalysisConfig::default());

        let config = AnalysisConfig::default();
        assert_eq!(config.area.grid_size, 100);
        assert_eq!(config.features.threshold, 50.0);
        assert_eq!(config.features.contour_levels.first(), Some(&600.0));
        assert_eq!(config.output.primary_property, "elevation");
        assert_eq!(config.features.zone_scheme, ZoneScheme::Parana);
        assert!(matches!(config.source, SourceConfig::Synthetic { seed: None, .. }));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = parse(
            "area:\n  grid_size: 20\nsource:\n  kind: synthetic\n  seed: 7\n  terrain:\n    noise_std_dev: 0.0\n",
        );
        assert_eq!(config.area.grid_size, 20);
        assert_eq!(config.area.extent, 0.15);
        assert_eq!(parse("features:\n  zone_scheme: generic\n").features.zone_scheme, ZoneScheme::Generic);
        match config.source {
            SourceConfig::Synthetic { terrain, seed } => {
                assert_eq!(seed, Some(7));
                assert_eq!(terrain.noise_std_dev, 0.0);
                assert_eq!(terrain.base_elevation, 800.0);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_remote_source() {
        let config = parse("source:\n  kind: remote\n  provider: mapbox\n  token: abc\n  batch_size: 10\n");
        let SourceConfig::Remote(remote) = &config.source else {
            panic!("expected remote source");
        };
        assert_eq!(remote.provider, Provider::Mapbox);
        assert_eq!(remote.resolve_token().as_deref(), Some("abc"));
        assert_eq!(remote.effective_endpoint(), Provider::Mapbox.default_endpoint());

        let limit = remote.rate_limit().unwrap();
        assert_eq!(limit.batch_size, 10);
        assert_eq!(limit.delay, Duration::from_millis(100));
        assert_eq!(config.source.label(), "remote:mapbox");
    }

    #[test]
    fn test_raster_source() {
        let config = parse(
            "source:\n  kind: raster\n  path: dem.tif\n  bbox: {min_lon: -51.1, min_lat: -25.3, max_lon: -50.9, max_lat: -25.1}\n",
        );
        let SourceConfig::Raster(raster) = &config.source else {
            panic!("expected raster source");
        };
        assert_eq!(raster.path, PathBuf::from("dem.tif"));
        assert_eq!(raster.resample, 100);
        assert_eq!(raster.bbox, Some(BoundingBox::new(-51.1, -25.3, -50.9, -25.1)));
    }

    #[test]
    fn test_invalid_documents() {
        let origin = Path::new("bad.yaml");
        assert!(matches!(
            AnalysisConfig::from_yaml("source:\n  kind: satellite\n", origin),
            Err(CliError::ConfigParse { .. })
        ));
        assert!(matches!(
            AnalysisConfig::from_yaml("source:\n  kind: raster\n", origin),
            Err(CliError::ConfigParse { .. })
        ));
        assert!(matches!(
            AnalysisConfig::load("/definitely/not/here.yaml"),
            Err(CliError::ConfigRead { .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());

        let mut config = AnalysisConfig::default();
        config.features.threshold = -1.0;
        assert!(config.validate().unwrap_err().is_configuration());

        let mut config = AnalysisConfig::default();
        config.area.grid_size = 0;
        assert!(config.validate().is_err());

        let config = parse("source:\n  kind: remote\n  batch_size: 0\n");
        assert!(config.validate().unwrap_err().is_configuration());
    }
}
