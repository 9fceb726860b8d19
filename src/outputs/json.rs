//! JSON dump of the normalized records.
//!
//! Optional side output (`--json-output`) for inspecting what the scraper
//! saw, or for feeding the records to something other than a calendar app.

use crate::models::GameRecord;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `records` as a pretty-printed JSON array to `path`.
///
/// Creates the parent directory if needed.
#[instrument(level = "info", skip_all, fields(%path, count = records.len()))]
pub async fn write_records(records: &[GameRecord], path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON records file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_records() {
        let dir = std::env::temp_dir().join("release_calendar_json_test");
        let path = dir.join("games.json");
        let path = path.to_str().unwrap();
        let records = vec![GameRecord {
            name: "Game A".to_string(),
            link: "https://ku.gamersky.com/2025/game-a/".to_string(),
            release_date: "2025-03-01".to_string(),
            game_type: "未知类型".to_string(),
            more_link: String::new(),
        }];

        write_records(&records, path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written[0]["name"], "Game A");
        assert_eq!(written[0]["release_date"], "2025-03-01");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
