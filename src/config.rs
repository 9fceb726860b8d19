//! Feed configuration.
//!
//! Every constant that ends up in the scraped requests or in the produced
//! calendar lives here rather than in the code that uses it: the listing
//! site, the calendar header values, the UID domain, and the fallback values
//! used when a release date can't be read.
//!
//! A YAML file may override any subset of fields; everything missing keeps
//! its default. Command-line flags are applied on top via
//! [`FeedConfig::apply_cli`].
//!
//! ```yaml
//! source:
//!   year: 2026
//!   platform: switch
//! calendar:
//!   calendar_name: Switch游戏发售表
//! normalize:
//!   per_period_fallback: true
//! ```

use crate::cli::Cli;
use crate::normalize::FallbackPolicy;
use chrono::NaiveDate;
use serde::Deserialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Top-level configuration, split by the component that consumes it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub source: SourceConfig,
    pub calendar: CalendarConfig,
    pub normalize: NormalizeConfig,
}

/// Where and how listing pages are fetched.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Root of the release listings, without trailing slash.
    pub base_url: String,
    /// Platform slug in the listing path (`ps5` in `/release/ps5_202503/`).
    pub platform: String,
    /// Year whose twelve months are collected.
    pub year: i32,
    pub user_agent: String,
    pub referer: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ku.gamersky.com/release".to_string(),
            platform: "ps5".to_string(),
            year: 2025,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:136.0) Gecko/20100101 Firefox/136.0"
                .to_string(),
            referer: "https://ku.gamersky.com/release/ps5_202503/".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Fixed values written into the calendar document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarConfig {
    pub prod_id: String,
    pub calendar_name: String,
    pub timezone: String,
    /// Domain part of every event UID (`game_<n>@<uid_domain>`).
    pub uid_domain: String,
    /// `YYYYMMDD` used for DTSTART when a record's date can't be parsed.
    pub fallback_compact_date: String,
    /// Label preceding the game type in DESCRIPTION.
    pub type_label: String,
    /// Label preceding the more-info link in DESCRIPTION.
    pub more_info_label: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            prod_id: "-//Gamersky//PS5 Game Release Schedule//CN".to_string(),
            calendar_name: "PS5游戏发售表".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            uid_domain: "gamersky.com".to_string(),
            fallback_compact_date: "20250301".to_string(),
            type_label: "类型：".to_string(),
            more_info_label: "详细信息：".to_string(),
        }
    }
}

/// Sentinels applied while normalizing raw entries.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Type label used when a listing has none.
    pub unknown_type: String,
    /// Release date used when the date text can't be read (`YYYY-MM-DD`).
    pub fallback_date: String,
    /// Use the first day of the scraped month instead of `fallback_date`.
    pub per_period_fallback: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            unknown_type: "未知类型".to_string(),
            fallback_date: "2025-03-01".to_string(),
            per_period_fallback: false,
        }
    }
}

impl FeedConfig {
    /// Parse a YAML document into a config.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        let config: FeedConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that would otherwise produce malformed output.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !(1..=9999).contains(&self.source.year) {
            return Err(format!("source.year must be a four-digit year, got {}", self.source.year).into());
        }
        self.fallback_policy()?;

        let compact = &self.calendar.fallback_compact_date;
        let well_formed = compact.len() == 8
            && compact.bytes().all(|b| b.is_ascii_digit())
            && NaiveDate::parse_from_str(compact, "%Y%m%d").is_ok();
        if !well_formed {
            return Err(format!("calendar.fallback_compact_date must be a YYYYMMDD date, got {compact:?}").into());
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(year) = cli.year {
            self.source.year = year;
        }
        if let Some(ref platform) = cli.platform {
            self.source.platform = platform.clone();
        }
        if cli.per_period_fallback {
            self.normalize.per_period_fallback = true;
        }
    }

    /// Resolve the configured fallback into a [`FallbackPolicy`].
    ///
    /// # Errors
    ///
    /// Fails when `normalize.fallback_date` is not a valid `YYYY-MM-DD` date
    /// and the fixed policy is in effect.
    pub fn fallback_policy(&self) -> Result<FallbackPolicy, Box<dyn Error>> {
        if self.normalize.per_period_fallback {
            return Ok(FallbackPolicy::PeriodStart);
        }
        let date = NaiveDate::parse_from_str(&self.normalize.fallback_date, "%Y-%m-%d").map_err(
            |e| format!("invalid normalize.fallback_date {:?}: {e}", self.normalize.fallback_date),
        )?;
        Ok(FallbackPolicy::Fixed(date))
    }
}

/// Load the configuration from `path`, or the defaults when no path is given.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<FeedConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let yaml = fs::read_to_string(path).await?;
            let config = FeedConfig::from_yaml(&yaml)?;
            info!(path, "Loaded configuration");
            Ok(config)
        }
        None => {
            info!("No config file given; using defaults");
            Ok(FeedConfig::default())
        }
    }
}
