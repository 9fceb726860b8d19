//! Command-line interface definitions for the release calendar.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option is optional: running the binary with no arguments scrapes the
//! default feed and writes `./ics/game_release.ics`.

use clap::Parser;

/// Command-line arguments for the release calendar.
///
/// Options given here take precedence over the YAML configuration file.
///
/// # Examples
///
/// ```sh
/// # Defaults: PS5 listings for 2025 into ./ics/game_release.ics
/// release_calendar
///
/// # Another year and platform, plus a JSON dump of the records
/// release_calendar --year 2026 --platform switch --json-output ./ics/games.json
///
/// # Feed settings from a file
/// release_calendar -c feed.yaml -o /srv/www/games.ics
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Destination of the generated calendar file
    #[arg(short, long, default_value = "./ics/game_release.ics")]
    pub output: String,

    /// Optional path to a YAML feed configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Year whose twelve monthly listings are collected
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Platform slug used in the listing URLs (e.g. ps5, switch)
    #[arg(long)]
    pub platform: Option<String>,

    /// Fall back to the first day of the scraped month for unreadable dates
    #[arg(long)]
    pub per_period_fallback: bool,

    /// Also write the normalized records to this JSON file
    #[arg(long)]
    pub json_output: Option<String>,
}
