//! iCalendar output.
//!
//! Serializes [`GameRecord`]s into a single `VCALENDAR` document with one
//! all-day `VEVENT` per release:
//!
//! ```text
//! BEGIN:VCALENDAR
//! VERSION:2.0
//! PRODID:-//Gamersky//PS5 Game Release Schedule//CN
//! ...
//! BEGIN:VEVENT
//! UID:game_1@gamersky.com
//! DTSTAMP:20250301T120000Z
//! DTSTART;VALUE=DATE:20250301
//! SUMMARY:Game A
//! DESCRIPTION:类型：动作游戏; 详细信息：https://...
//! END:VEVENT
//! END:VCALENDAR
//! ```
//!
//! # Known limitation
//!
//! SUMMARY and DESCRIPTION are written verbatim. Commas, semicolons,
//! backslashes and newlines are not escaped, so a title containing a newline
//! yields a broken document.

use crate::config::CalendarConfig;
use crate::models::GameRecord;
use chrono::{DateTime, NaiveDate, Utc};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

const CRLF: &str = "\r\n";

/// Rough per-event size used to pre-size the output buffer.
const EVENT_SIZE_HINT: usize = 256;

/// Renders calendar documents using the configured header values and
/// fallbacks.
#[derive(Debug, Clone)]
pub struct CalendarWriter {
    config: CalendarConfig,
}

impl CalendarWriter {
    pub fn new(config: CalendarConfig) -> Self {
        Self { config }
    }

    /// Render `records` in order, stamping each event with the current UTC time.
    pub fn render(&self, records: &[GameRecord]) -> String {
        self.render_with_clock(records, Utc::now)
    }

    /// Render `records` in order, asking `now` for each event's DTSTAMP.
    pub fn render_with_clock<F>(&self, records: &[GameRecord], mut now: F) -> String
    where
        F: FnMut() -> DateTime<Utc>,
    {
        let mut out = String::with_capacity(EVENT_SIZE_HINT * (records.len() + 1));
        self.push_header(&mut out);
        for (idx, record) in records.iter().enumerate() {
            self.push_event(&mut out, idx + 1, record, now());
        }
        push_line(&mut out, "END:VCALENDAR");
        out
    }

    fn push_header(&self, out: &mut String) {
        push_line(out, "BEGIN:VCALENDAR");
        push_line(out, "VERSION:2.0");
        push_line(out, &format!("PRODID:{}", self.config.prod_id));
        push_line(out, "CALSCALE:GREGORIAN");
        push_line(out, "METHOD:PUBLISH");
        push_line(out, &format!("X-WR-CALNAME:{}", self.config.calendar_name));
        push_line(out, &format!("X-WR-TIMEZONE:{}", self.config.timezone));
    }

    fn push_event(&self, out: &mut String, index: usize, record: &GameRecord, stamp: DateTime<Utc>) {
        let dtstart = compact_date(&record.release_date)
            .unwrap_or_else(|| self.config.fallback_compact_date.clone());

        push_line(out, "BEGIN:VEVENT");
        push_line(out, &format!("UID:game_{}@{}", index, self.config.uid_domain));
        push_line(out, &format!("DTSTAMP:{}", stamp.format("%Y%m%dT%H%M%SZ")));
        push_line(out, &format!("DTSTART;VALUE=DATE:{dtstart}"));
        push_line(out, &format!("SUMMARY:{}", record.name));
        push_line(
            out,
            &format!(
                "DESCRIPTION:{}{}; {}{}",
                self.config.type_label, record.game_type, self.config.more_info_label, record.more_link
            ),
        );
        push_line(out, "END:VEVENT");
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(CRLF);
}

/// Convert a `YYYY-MM-DD` date into the `YYYYMMDD` form used by `DTSTART`.
///
/// Returns `None` when the input is not a real calendar date.
pub fn compact_date(release_date: &str) -> Option<String> {
    NaiveDate::parse_from_str(release_date, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y%m%d").to_string())
}

/// Write a rendered document to `path`.
///
/// The parent directory must already exist; see
/// [`crate::utils::ensure_writable_dir`].
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn write_calendar(document: &str, path: &str) -> Result<(), Box<dyn Error>> {
    fs::write(path, document).await?;
    info!(bytes = document.len(), "Wrote calendar file");
    Ok(())
}
