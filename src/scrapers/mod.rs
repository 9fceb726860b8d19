//! Release listing scrapers.
//!
//! A scraper turns one [`Period`] into the raw entries found on that month's
//! listing page. Scrapers never fail: a page that can't be fetched or read is
//! logged and contributes zero entries, so one bad month doesn't lose the
//! rest of the year.
//!
//! # Supported Sources
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Gamersky release lists | [`gamersky`] | HTML scraping |

use crate::models::{Period, RawGameEntry};
use futures::stream::{self, StreamExt};
use tracing::{info, instrument};

pub mod gamersky;

/// A site that publishes one release listing per month.
pub trait ListingSource {
    /// Fetch and extract the entries listed for `period`.
    ///
    /// Returns an empty vector when the page is unavailable.
    async fn fetch_period(&self, period: &Period) -> Vec<RawGameEntry>;
}

/// Fetch every period in order, one page at a time.
///
/// Each period's entries are kept alongside it so normalization can apply
/// period-relative fallbacks.
#[instrument(level = "info", skip_all, fields(periods = periods.len()))]
pub async fn collect_periods<S>(source: &S, periods: &[Period]) -> Vec<(Period, Vec<RawGameEntry>)>
where
    S: ListingSource,
{
    let listings: Vec<(Period, Vec<RawGameEntry>)> = stream::iter(periods.iter().copied())
        .then(|period| async move {
            let entries = source.fetch_period(&period).await;
            (period, entries)
        })
        .collect()
        .await;

    let total: usize = listings.iter().map(|(_, entries)| entries.len()).sum();
    let empty = listings.iter().filter(|(_, entries)| entries.is_empty()).count();
    info!(total, empty_periods = empty, "Collected release listings");
    listings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Serves canned entries and records the order periods were requested in.
    struct StubSource {
        requested: RefCell<Vec<Period>>,
    }

    impl ListingSource for StubSource {
        async fn fetch_period(&self, period: &Period) -> Vec<RawGameEntry> {
            self.requested.borrow_mut().push(*period);
            // Odd months "fail" and return nothing.
            if period.month % 2 == 1 {
                return Vec::new();
            }
            vec![RawGameEntry {
                name: format!("Game {}", period.month),
                ..RawGameEntry::default()
            }]
        }
    }

    #[tokio::test]
    async fn test_collect_periods_in_order_with_gaps() {
        let source = StubSource {
            requested: RefCell::new(Vec::new()),
        };
        let periods = Period::year_of(2025);

        let listings = collect_periods(&source, &periods).await;

        assert_eq!(*source.requested.borrow(), periods);
        assert_eq!(listings.len(), 12);
        let names: Vec<_> = listings
            .iter()
            .flat_map(|(_, entries)| entries.iter().map(|e| e.name.as_str()))
            .collect();
        assert_eq!(names, ["Game 2", "Game 4", "Game 6", "Game 8", "Game 10", "Game 12"]);
    }

    #[tokio::test]
    async fn test_collect_no_periods() {
        let source = StubSource {
            requested: RefCell::new(Vec::new()),
        };
        assert!(collect_periods(&source, &[]).await.is_empty());
    }
}
