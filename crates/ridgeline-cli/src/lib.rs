//! # ridgeline-cli
//!
//! Configuration and pipelines behind the `ridgeline` binary.
//!
//! - [`config`]: the YAML [`AnalysisConfig`]
//! - [`pipeline`]: [`Session`] runs `analyze`, `fetch` and `profile`, reusing
//!   grids it has already built

pub mod config;
mod error;
pub mod pipeline;

pub use config::{AnalysisConfig, FeatureConfig, OutputConfig, RasterConfig, RemoteConfig, SourceConfig};
pub use error::CliError;
pub use pipeline::{format_profile, parse_coordinate, AnalysisSummary, FetchSummary, Session};

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
