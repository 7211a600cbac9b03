//! Per-point elevation lookups against remote HTTP providers.
//!
//! Two providers are supported:
//! - Mapbox Tilequery on the `mapbox-terrain-v2` contour layer (needs an access
//!   token, answers with the nearest contour elevation or nothing)
//! - Open-Elevation (no token, interpolated SRTM elevation)
//!
//! [`acquire`] drives any [`ElevationLookup`] over a coordinate list one point at
//! a time, pausing after every batch. A failed point becomes a sample with a
//! `None` elevation; the batch never aborts because of it.

use crate::grid::ElevationSample;
use crate::{DemError, Result};
use metrics::{counter, describe_counter, Unit};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Mapbox Tilequery endpoint for the terrain tileset.
pub const MAPBOX_TILEQUERY_ENDPOINT: &str =
    "https://api.mapbox.com/v4/mapbox.mapbox-terrain-v2/tilequery";

/// Public Open-Elevation lookup endpoint.
pub const OPEN_ELEVATION_ENDPOINT: &str = "https://api.open-elevation.com/api/v1/lookup";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable consulted for the Mapbox token.
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Counter of lookups attempted.
pub const REQUESTS_METRIC: &str = "ridgeline_acquisition_requests_total";
/// Counter of lookups that ended without an elevation because of an error.
pub const FAILURES_METRIC: &str = "ridgeline_acquisition_failures_total";

/// Register descriptions for the acquisition counters.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_METRIC, Unit::Count, "Point elevation lookups attempted");
    describe_counter!(
        FAILURES_METRIC,
        Unit::Count,
        "Point elevation lookups that failed and were recorded as null"
    );
}

/// Something that can return the elevation of a single coordinate.
///
/// `Ok(None)` means the provider answered but had no data for the point.
pub trait ElevationLookup {
    /// Look up the elevation at `(lat, lon)`.
    fn lookup(&self, lat: f64, lon: f64) -> Result<Option<f64>>;

    /// Short name used in logs and metric labels.
    fn provider_name(&self) -> &str {
        "custom"
    }
}

/// Which remote service to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Mapbox Tilequery, token required.
    Mapbox,
    /// Open-Elevation, no token.
    OpenElevation,
}

impl Provider {
    /// Name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Mapbox => "mapbox",
            Provider::OpenElevation => "open_elevation",
        }
    }

    /// Endpoint used when none is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Mapbox => MAPBOX_TILEQUERY_ENDPOINT,
            Provider::OpenElevation => OPEN_ELEVATION_ENDPOINT,
        }
    }

    /// Whether lookups need an access token.
    pub fn requires_token(&self) -> bool {
        matches!(self, Provider::Mapbox)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured HTTP elevation provider.
#[derive(Debug)]
pub struct RemoteSource {
    provider: Provider,
    endpoint: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl RemoteSource {
    /// Create a source for `provider`.
    ///
    /// `endpoint` overrides the provider's public URL. A provider that needs a
    /// token fails here with [`DemError::MissingCredential`] when `token` is
    /// absent or blank, before any request is made.
    pub fn new(provider: Provider, endpoint: Option<String>, token: Option<String>) -> Result<Self> {
        let token = token.filter(|t| !t.trim().is_empty());
        if provider.requires_token() && token.is_none() {
            return Err(DemError::MissingCredential {
                provider: provider.as_str(),
            });
        }

        let endpoint = endpoint
            .unwrap_or_else(|| provider.default_endpoint().to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            provider,
            endpoint,
            token,
            client,
        })
    }

    /// Mapbox source; falls back to `MAPBOX_TOKEN` when `token` is `None`.
    pub fn mapbox(token: Option<String>) -> Result<Self> {
        let token = token.or_else(|| std::env::var(MAPBOX_TOKEN_ENV).ok());
        Self::new(Provider::Mapbox, None, token)
    }

    /// Open-Elevation source on the public endpoint.
    pub fn open_elevation() -> Result<Self> {
        Self::new(Provider::OpenElevation, None, None)
    }

    /// The provider this source talks to.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Base endpoint in use.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request URL and query parameters for a coordinate. The token is kept
    /// out of the URL so it never shows up in logs.
    fn request(&self, lat: f64, lon: f64) -> (String, Vec<(&'static str, String)>) {
        match self.provider {
            Provider::Mapbox => {
                let url = format!("{}/{},{}.json", self.endpoint, lon, lat);
                let mut query = vec![("layers", "contour".to_string())];
                if let Some(token) = &self.token {
                    query.push(("access_token", token.clone()));
                }
                (url, query)
            }
            Provider::OpenElevation => (
                self.endpoint.clone(),
                vec![("locations", format!("{},{}", lat, lon))],
            ),
        }
    }
}

impl ElevationLookup for RemoteSource {
    fn lookup(&self, lat: f64, lon: f64) -> Result<Option<f64>> {
        let (url, query) = self.request(lat, lon);
        debug!(provider = %self.provider, %url, "Requesting elevation");

        let response = self.client.get(&url).query(&query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DemError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text()?;
        let json: Value = serde_json::from_str(&body)
            .map_err(|e| DemError::MalformedResponse(format!("invalid JSON from {}: {}", url, e)))?;

        match self.provider {
            Provider::Mapbox => parse_mapbox_response(&json),
            Provider::OpenElevation => parse_open_elevation_response(&json),
        }
    }

    fn provider_name(&self) -> &str {
        self.provider.as_str()
    }
}

/// Elevation from a Tilequery answer: `features[0].properties.ele`.
///
/// An empty `features` array, or a feature without `ele`, means no data.
pub fn parse_mapbox_response(json: &Value) -> Result<Option<f64>> {
    let features = json
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| DemError::MalformedResponse("missing 'features' array".to_string()))?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    match first.get("properties").and_then(|p| p.get("ele")) {
        None | Some(Value::Null) => Ok(None),
        Some(ele) => ele
            .as_f64()
            .map(Some)
            .ok_or_else(|| DemError::MalformedResponse(format!("non-numeric 'ele': {}", ele))),
    }
}

/// Elevation from an Open-Elevation answer: `results[0].elevation`.
pub fn parse_open_elevation_response(json: &Value) -> Result<Option<f64>> {
    let first = json
        .get("results")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .ok_or_else(|| DemError::MalformedResponse("missing 'results[0]'".to_string()))?;

    match first.get("elevation") {
        None | Some(Value::Null) => Ok(None),
        Some(e) => e
            .as_f64()
            .map(Some)
            .ok_or_else(|| DemError::MalformedResponse(format!("non-numeric 'elevation': {}", e))),
    }
}

/// Pause `delay` after every `batch_size` lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    pub batch_size: usize,
    pub delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            batch_size: 100,
            delay: Duration::from_millis(100),
        }
    }
}

impl RateLimit {
    /// Build from a batch size and a delay in seconds.
    pub fn new(batch_size: usize, delay_secs: f64) -> Result<Self> {
        let delay = Duration::try_from_secs_f64(delay_secs)
            .map_err(|e| DemError::invalid("delay", delay_secs, format!("not a usable duration: {}", e)))?;
        let limit = Self { batch_size, delay };
        limit.validate()?;
        Ok(limit)
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DemError::invalid("batch_size", self.batch_size, "must be at least 1"));
        }
        Ok(())
    }
}

/// Look up every coordinate in order, sequentially.
///
/// Returns one sample per input coordinate, in input order. Lookup errors are
/// logged and recorded as `None`. Only an invalid `rate` is an error.
pub fn acquire<L: ElevationLookup + ?Sized>(
    lookup: &L,
    coordinates: &[(f64, f64)],
    rate: &RateLimit,
) -> Result<Vec<ElevationSample>> {
    rate.validate()?;

    let provider = lookup.provider_name().to_string();
    let total = coordinates.len();
    let mut samples = Vec::with_capacity(total);
    let mut failures = 0usize;

    for (i, &(lat, lon)) in coordinates.iter().enumerate() {
        counter!(REQUESTS_METRIC, "provider" => provider.clone()).increment(1);

        let elevation = match lookup.lookup(lat, lon) {
            Ok(elevation) => elevation,
            Err(e) => {
                failures += 1;
                counter!(FAILURES_METRIC, "provider" => provider.clone()).increment(1);
                warn!(provider = %provider, lat, lon, error = %e, "Elevation lookup failed");
                None
            }
        };
        samples.push(ElevationSample { lat, lon, elevation });

        let done = i + 1;
        if done % rate.batch_size == 0 && done < total {
            info!("Processed {}/{} points", done, total);
            if !rate.delay.is_zero() {
                std::thread::sleep(rate.delay);
            }
        }
    }

    info!(
        provider = %provider,
        total,
        failures,
        "Acquisition complete"
    );
    Ok(samples)
}
