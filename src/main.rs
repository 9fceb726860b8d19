//! # Release Calendar
//!
//! Scrapes a year of monthly game release listings and publishes them as an
//! iCalendar feed that calendar apps can subscribe to.
//!
//! ## Usage
//!
//! ```sh
//! release_calendar                      # writes ./ics/game_release.ics
//! release_calendar -y 2026 -o feed.ics
//! ```
//!
//! ## Architecture
//!
//! The application is a straight pipeline:
//! 1. **Collecting**: Fetch the twelve monthly listing pages, one after another
//! 2. **Normalizing**: Turn raw entries into records with canonical release dates
//! 3. **Rendering**: Serialize the records into one `VCALENDAR` document
//! 4. **Output**: Write the `.ics` file (and optionally a JSON dump)
//!
//! A month that can't be fetched contributes no events; only configuration
//! and output errors end the run with a failure.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::load_config;
use models::Period;
use normalize::Normalizer;
use outputs::ics::{self, CalendarWriter};
use outputs::json;
use scrapers::collect_periods;
use scrapers::gamersky::GamerskySource;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("release_calendar starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = load_config(args.config.as_deref()).await?;
    config.apply_cli(&args);
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e);
    }
    let normalizer = Normalizer::from_config(&config)?;
    info!(
        year = config.source.year,
        platform = %config.source.platform,
        ?normalizer,
        "Configuration resolved"
    );

    // Early check: ensure the output dir exists and is writable
    if let Err(e) = ensure_writable_dir(&args.output).await {
        error!(
            path = %args.output,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Collect listings ----
    let source = GamerskySource::new(&config.source)?;
    let periods = Period::year_of(config.source.year);
    let listings = collect_periods(&source, &periods).await;

    // ---- Normalize ----
    let records = normalizer.normalize_listings(&listings);
    info!(count = records.len(), "Normalized game records");

    // ---- Render & write calendar ----
    let document = CalendarWriter::new(config.calendar.clone()).render(&records);
    if let Err(e) = ics::write_calendar(&document, &args.output).await {
        error!(path = %args.output, error = %e, "Failed writing calendar");
        return Err(e);
    }

    if let Some(ref json_path) = args.json_output {
        if let Err(e) = json::write_records(&records, json_path).await {
            error!(path = %json_path, error = %e, "Failed writing JSON records");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        path = %args.output,
        events = records.len(),
        ?elapsed,
        "Execution complete"
    );

    Ok(())
}
