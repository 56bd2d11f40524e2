//! Street record enrichment.
//!
//! Repairs latitude/longitude cells, reverse geocodes every row against
//! Nominatim and writes the dataset back out with street and neighborhood
//! columns.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bairro::config::Config;
use bairro::dataset::DatasetLayout;
use bairro::diagnostics::{Diagnostics, TracingDiagnostics};
use bairro::enrichment::Enricher;
use bairro::geocode::{build_session, GeocodeClient};
use bairro::normalize::{NormalizePolicy, Normalizer, UnresolvedRows};
use bairro::{Pipeline, RunSummary};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "enrich")]
#[command(about = "Repair coordinates and add street/neighborhood names to a CSV of street records")]
struct Args {
    /// Input CSV (optionally .gz)
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV
    #[arg(short, long)]
    output: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Coordinate repair policy: digit-shift, preserve-decimal or decimal-comma
    #[arg(long)]
    policy: Option<NormalizePolicy>,

    /// What to do with rows whose coordinates cannot be repaired: drop or keep
    #[arg(long)]
    unresolved: Option<UnresolvedRows>,

    /// Reverse geocoding endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// User-Agent sent to the geocoder
    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Maximum concurrent lookups (0 = unbounded)
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Only repair coordinates; skip geocoding
    #[arg(long)]
    normalize_only: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Load the config file (if any) and layer command-line overrides on top
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(policy) = self.policy {
            config.normalize.policy = policy;
        }
        if let Some(unresolved) = self.unresolved {
            config.normalize.unresolved = unresolved;
        }
        if let Some(ref endpoint) = self.endpoint {
            config.geocoder.endpoint = endpoint.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            config.geocoder.user_agent = user_agent.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.geocoder.timeout_secs = timeout_secs;
        }
        if let Some(max_in_flight) = self.max_in_flight {
            config.geocoder.max_in_flight = max_in_flight;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.resolve_config()?;

    info!("Bairro street enrichment");
    info!("Input: {}", args.input.display());
    info!(
        "Policy: {:?}, unresolved rows: {:?}",
        config.normalize.policy, config.normalize.unresolved
    );

    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
    let normalizer = Normalizer::new(config.normalize.policy, diagnostics.clone());
    let layout = DatasetLayout {
        latitude_column: config.dataset.latitude_column.clone(),
        longitude_column: config.dataset.longitude_column.clone(),
        delimiter: config.dataset.delimiter as u8,
    };
    let pipeline = Pipeline::new(
        layout,
        normalizer,
        config.normalize.unresolved,
        config.geocoder.placeholders(),
        diagnostics.clone(),
    );

    let start = Instant::now();

    let summary = if args.normalize_only {
        pipeline.normalize_only(&args.input, &args.output)?
    } else {
        let session = build_session(&config.geocoder)?;
        let client = GeocodeClient::new(session, &config.geocoder, diagnostics.clone())?;

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
                )?
                .progress_chars("#>-"),
        );

        let enricher = Enricher::new(
            client,
            config.geocoder.placeholders(),
            config.geocoder.max_in_flight,
        )
        .with_progress(pb);

        pipeline.run(&args.input, &args.output, &enricher).await?
    };

    report(&summary);
    info!("Finished in {:.2} seconds", start.elapsed().as_secs_f64());

    Ok(())
}

fn report(summary: &RunSummary) {
    info!(
        "Loaded {} rows, dropped {}, {} with usable coordinates",
        summary.loaded, summary.dropped, summary.eligible
    );
    if summary.merged {
        info!(
            "Resolved {} rows, {} not found",
            summary.resolved, summary.not_found
        );
    }
    if !summary.written {
        tracing::error!("Output was not written");
    }
}
