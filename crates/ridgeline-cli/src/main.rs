//! `ridgeline`: terrain analysis from the command line.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ridgeline_cli::{
    format_profile, parse_coordinate, AnalysisConfig, CliError, RasterConfig, RemoteConfig, Result, Session,
    SourceConfig,
};
use ridgeline_dem::{describe_metrics, Provider};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "ridgeline")]
#[command(author, version, about = "Terrain analysis over elevation grids", long_about = None)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML config file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a grid, derive metrics and features, write GeoJSON layers
    Analyze {
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Minimum elevation difference for peaks and valleys (m)
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Contour levels, comma separated
        #[arg(short, long, value_delimiter = ',')]
        levels: Option<Vec<f64>>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write into a timestamped subdirectory
        #[arg(long)]
        timestamped: bool,
    },
    /// Query a remote provider for every grid point and write GeoJSON
    Fetch {
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Output GeoJSON file
        #[arg(short, long, default_value = "elevation.geojson")]
        output: PathBuf,
    },
    /// Print an elevation transect between two points
    Profile {
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Start as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        from: String,
        /// End as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        to: String,
        /// Number of samples
        #[arg(short = 'n', long, default_value = "50")]
        points: usize,
    },
}

#[derive(Args)]
struct AreaArgs {
    /// Center latitude (degrees)
    #[arg(long, allow_hyphen_values = true)]
    center_lat: Option<f64>,
    /// Center longitude (degrees)
    #[arg(long, allow_hyphen_values = true)]
    center_lon: Option<f64>,
    /// Rows and columns of the grid
    #[arg(short, long)]
    grid_size: Option<usize>,
    /// Half-width of the area (degrees)
    #[arg(short, long)]
    extent: Option<f64>,
}

#[derive(Args)]
struct SourceArgs {
    /// Query a remote provider instead of the configured source
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,
    /// Provider endpoint URL
    #[arg(long)]
    endpoint: Option<String>,
    /// Mapbox access token (default: MAPBOX_TOKEN)
    #[arg(long)]
    token: Option<String>,
    /// Requests per batch before pausing
    #[arg(long)]
    batch_size: Option<usize>,
    /// Pause between batches (seconds)
    #[arg(long)]
    delay: Option<f64>,
    /// Read a GeoTIFF or GeoJSON file instead of the configured source
    #[arg(short, long, conflicts_with = "provider")]
    input: Option<PathBuf>,
    /// Seed for synthetic noise
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Mapbox,
    OpenElevation,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Mapbox => Provider::Mapbox,
            ProviderArg::OpenElevation => Provider::OpenElevation,
        }
    }
}

// ─── Config overrides ───────────────────────────────────────────────────

impl AreaArgs {
    fn apply(&self, config: &mut AnalysisConfig) {
        let area = &mut config.area;
        if let Some(v) = self.center_lat {
            area.center_lat = v;
        }
        if let Some(v) = self.center_lon {
            area.center_lon = v;
        }
        if let Some(v) = self.grid_size {
            area.grid_size = v;
        }
        if let Some(v) = self.extent {
            area.extent = v;
        }
    }
}

impl SourceArgs {
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(path) = &self.input {
            config.source = SourceConfig::Raster(RasterConfig {
                path: path.clone(),
                bbox: None,
                resample: config.area.grid_size,
            });
        }
        if let Some(provider) = self.provider {
            let mut remote = match &config.source {
                SourceConfig::Remote(remote) => remote.clone(),
                _ => RemoteConfig::default(),
            };
            remote.provider = provider.into();
            config.source = SourceConfig::Remote(remote);
        }

        match &mut config.source {
            SourceConfig::Remote(remote) => {
                if self.endpoint.is_some() {
                    remote.endpoint = self.endpoint.clone();
                }
                if self.token.is_some() {
                    remote.token = self.token.clone();
                }
                if let Some(v) = self.batch_size {
                    remote.batch_size = v;
                }
                if let Some(v) = self.delay {
                    remote.delay_secs = v;
                }
            }
            SourceConfig::Synthetic { seed, .. } => {
                if self.seed.is_some() {
                    *seed = self.seed;
                }
            }
            SourceConfig::Raster(_) => {}
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AnalysisConfig::load_or_default(cli.config.as_deref())?;
    let mut session = Session::new();

    match cli.command {
        Commands::Analyze {
            area,
            source,
            threshold,
            levels,
            output,
            timestamped,
        } => {
            area.apply(&mut config);
            source.apply(&mut config);
            if let Some(t) = threshold {
                config.features.threshold = t;
            }
            if let Some(levels) = levels {
                config.features.contour_levels = levels;
            }
            if let Some(dir) = output {
                config.output.directory = dir;
            }
            config.output.timestamped |= timestamped;

            let summary = session.analyze(&config)?;
            println!("Source: {}", summary.source);
            println!("Grid: {0} x {0}", summary.grid_size);
            println!(
                "Elevation: min {:.1} m, max {:.1} m, mean {:.1} m",
                summary.statistics.min, summary.statistics.max, summary.statistics.mean
            );
            if let Some(tri) = summary.ruggedness {
                println!("Terrain Ruggedness Index: {:.2}", tri);
            }
            println!(
                "Peaks: {}, valleys: {}, contours: {}",
                summary.peak_count, summary.valley_count, summary.contour_count
            );
            println!("Output: {}", summary.output_dir.display());
        }
        Commands::Fetch { area, source, output } => {
            area.apply(&mut config);
            source.apply(&mut config);
            if !matches!(config.source, SourceConfig::Remote(_)) {
                config.source = SourceConfig::Remote(RemoteConfig::default());
                source.apply(&mut config);
            }

            let summary = session.fetch(&config, &output)?;
            println!(
                "Fetched {} points from {} ({} without elevation)",
                summary.requested, summary.provider, summary.missing
            );
            println!("Output: {}", summary.output.display());
        }
        Commands::Profile {
            area,
            source,
            from,
            to,
            points,
        } => {
            area.apply(&mut config);
            source.apply(&mut config);
            let start = parse_coordinate(&from)?;
            let end = parse_coordinate(&to)?;

            let profile = session.profile(&config, start, end, points)?;
            print!("{}", format_profile(&profile));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    describe_metrics();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            exit_code(&e)
        }
    }
}

fn exit_code(e: &CliError) -> ExitCode {
    if e.is_configuration() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
