//! Error types for the DEM crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing elevation data.
#[derive(Debug, Error)]
pub enum DemError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF decode error: {0}")]
    TiffDecode(#[from] tiff::TiffError),

    /// Invalid GeoTIFF - missing required tags.
    #[error("Invalid GeoTIFF: {0}")]
    InvalidGeoTiff(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON structure error.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The file extension is not handled by any reader.
    #[error("Unsupported input format: {}", path.display())]
    UnsupportedFormat {
        /// Offending file.
        path: PathBuf,
    },

    /// A provider that needs a credential was configured without one.
    #[error("Missing access token for provider '{provider}'")]
    MissingCredential {
        /// Provider name.
        provider: &'static str,
    },

    /// A parameter is outside its valid range.
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value, formatted.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A flat point list does not form the requested square grid.
    #[error("Point count {actual} does not form a {grid_size}x{grid_size} grid (expected {expected} points)")]
    ShapeMismatch {
        /// Requested grid dimension.
        grid_size: usize,
        /// `grid_size * grid_size`.
        expected: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// A sample without elevation was supplied where a grid cell needs one.
    #[error("No elevation for point {index} ({lat}, {lon})")]
    MissingElevation {
        /// Flat index of the sample.
        index: usize,
        /// Latitude of the sample.
        lat: f64,
        /// Longitude of the sample.
        lon: f64,
    },

    /// HTTP transport error.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Requested URL (without credentials).
        url: String,
    },

    /// The provider answered with a body that could not be interpreted.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl DemError {
    /// Per-point acquisition failures; recovered as a null elevation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DemError::HttpRequest(_) | DemError::HttpStatus { .. } | DemError::MalformedResponse(_)
        )
    }

    /// Errors raised before any work is attempted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DemError::MissingCredential { .. } | DemError::InvalidParameter { .. }
        )
    }

    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        DemError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
