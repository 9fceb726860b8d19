//! Release-date normalization.
//!
//! Listing pages show release dates in several shapes:
//!
//! | Raw text | Normalized |
//! |----------|------------|
//! | `发行日期：2025-03-15` | `2025-03-15` |
//! | `2025-03-15（预定）` | `2025-03-15` |
//! | `2025年9月` | `2025-09-01` |
//! | `待定`, empty, anything else | fallback date |
//!
//! A [`Normalizer`] turns each [`RawGameEntry`] into a [`GameRecord`] whose
//! `release_date` is always a valid `YYYY-MM-DD` string. Nothing in this
//! module returns an error; unreadable input resolves to configured defaults.

use crate::config::FeedConfig;
use crate::models::{GameRecord, Period, RawGameEntry};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use tracing::debug;

/// Label the site puts in front of the date ("release date:").
const DATE_LABEL: &str = "发行日期：";

static FULL_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap());
static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})年([0-9]{1,2})月").unwrap());

/// Release date used when the raw text can't be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Same date for every record regardless of the month it was listed under.
    Fixed(NaiveDate),
    /// First day of the month whose listing produced the record.
    PeriodStart,
}

impl FallbackPolicy {
    fn resolve(&self, period: &Period) -> NaiveDate {
        match self {
            FallbackPolicy::Fixed(date) => *date,
            FallbackPolicy::PeriodStart => {
                debug_assert!((1..=12).contains(&period.month), "period month out of range: {period}");
                period.first_day().unwrap_or_default()
            }
        }
    }
}

/// Applies the date policy and the "unknown type" sentinel to raw entries.
#[derive(Debug, Clone)]
pub struct Normalizer {
    unknown_type: String,
    fallback: FallbackPolicy,
}

impl Normalizer {
    pub fn new(unknown_type: impl Into<String>, fallback: FallbackPolicy) -> Self {
        Self {
            unknown_type: unknown_type.into(),
            fallback,
        }
    }

    /// Build a normalizer from the `normalize` section of the config.
    pub fn from_config(config: &FeedConfig) -> Result<Self, Box<dyn Error>> {
        Ok(Self::new(
            config.normalize.unknown_type.clone(),
            config.fallback_policy()?,
        ))
    }

    /// Normalize one raw entry scraped from `period`'s listing.
    pub fn normalize(&self, raw: &RawGameEntry, period: &Period) -> GameRecord {
        let game_type = raw
            .type_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.unknown_type.as_str())
            .to_string();

        GameRecord {
            name: raw.name.trim().to_string(),
            link: raw.link.clone(),
            release_date: self.release_date(&raw.raw_date, period),
            game_type,
            more_link: raw.more_link.clone(),
        }
    }

    /// Normalize a batch of entries scraped from the same period.
    pub fn normalize_all(&self, raws: &[RawGameEntry], period: &Period) -> Vec<GameRecord> {
        raws.iter().map(|raw| self.normalize(raw, period)).collect()
    }

    /// Normalize collected listings into one ordered record list.
    pub fn normalize_listings(&self, listings: &[(Period, Vec<RawGameEntry>)]) -> Vec<GameRecord> {
        listings
            .iter()
            .flat_map(|(period, raws)| self.normalize_all(raws, period))
            .collect()
    }

    /// Resolve raw date text to `YYYY-MM-DD`, applying the fallback policy.
    pub fn release_date(&self, raw_date: &str, period: &Period) -> String {
        match parse_release_date(raw_date) {
            Some(date) => date,
            None => {
                let fallback = self.fallback.resolve(period).format("%Y-%m-%d").to_string();
                debug!(raw_date, %period, %fallback, "Unreadable release date; using fallback");
                fallback
            }
        }
    }
}

/// Read a release date out of raw listing text.
///
/// Returns `None` when neither a full date nor a year-month is found at the
/// start of the text (after the label).
pub fn parse_release_date(raw_date: &str) -> Option<String> {
    let text = raw_date.replace(DATE_LABEL, "");
    let text = text.trim();

    if let Some(m) = FULL_DATE.find(text) {
        return Some(m.as_str().to_string());
    }

    let caps = YEAR_MONTH.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{year:04}-{month:02}-01"))
}
