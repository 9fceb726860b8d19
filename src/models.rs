//! Data models for scraped listings and their normalized representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Period`]: One month of the release schedule that gets scraped
//! - [`RawGameEntry`]: Raw field values as extracted from a listing page
//! - [`GameRecord`]: A normalized game release, ready for calendar output

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// One month of the release schedule.
///
/// The collector walks twelve of these (January through December of the
/// configured year) and fetches one listing page per period. Periods built by
/// [`Period::year_of`] always have `month` in `1..=12`, so [`Period::first_day`]
/// is `Some` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// Calendar year, e.g. `2025`.
    pub year: i32,
    /// Month number, `1..=12`.
    pub month: u32,
}

impl Period {
    /// All twelve months of `year`, in calendar order.
    pub fn year_of(year: i32) -> Vec<Period> {
        (1..=12).map(|month| Period { year, month }).collect()
    }

    /// The `YYYYMM` slug used by the listing URLs.
    pub fn slug(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// First day of the period, if the period is a real month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Raw field values for a single game, as they appear on a listing page.
///
/// Nothing here is validated. The only guarantee the collector makes is that
/// `name` is non-empty; entries without a title are dropped before they get
/// this far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGameEntry {
    /// Title text of the game.
    pub name: String,
    /// Link to the game's page (may be empty).
    pub link: String,
    /// Free-form release date text, e.g. `发行日期：2025-03-15` or `2025年9月`.
    pub raw_date: String,
    /// Type/genre label, absent when the page has none.
    pub type_text: Option<String>,
    /// "More info" link (may be empty).
    pub more_link: String,
}

/// A normalized game release.
///
/// `release_date` is always a well-formed `YYYY-MM-DD` string once a record
/// comes out of [`crate::normalize::Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    /// Game title, trimmed.
    pub name: String,
    /// Link to the game's page.
    pub link: String,
    /// Release date as `YYYY-MM-DD`.
    pub release_date: String,
    /// Type label, or the configured "unknown type" sentinel.
    pub game_type: String,
    /// "More info" link.
    pub more_link: String,
}
