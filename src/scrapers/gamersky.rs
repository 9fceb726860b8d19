//! Gamersky release list scraper.
//!
//! Scrapes the monthly release pages on [ku.gamersky.com](https://ku.gamersky.com),
//! one per platform and month, e.g. `https://ku.gamersky.com/release/ps5_202503/`.
//!
//! # Page layout
//!
//! ```text
//! ul.PF
//! └── li.lx1                       one game
//!     ├── div.tit a[href]          title + game page
//!     ├── div.txt                  "发行日期：2025-03-15" ...
//!     │   └── a[href^=".../sp/"]   type label
//!     └── div.more a[href]         more-info link
//! ```

use crate::config::SourceConfig;
use crate::models::{Period, RawGameEntry};
use crate::scrapers::ListingSource;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

static ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("ul.PF li.lx1").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.tit a").unwrap());
static DATE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.txt").unwrap());
static TYPE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div.txt a[href^="http://ku.gamersky.com/sp/"]"#).unwrap());
static MORE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.more a").unwrap());

/// HTTP-backed [`ListingSource`] for Gamersky release lists.
#[derive(Debug, Clone)]
pub struct GamerskySource {
    client: Client,
    base_url: String,
    platform: String,
}

impl GamerskySource {
    /// Build a client with browser-like headers from the source config.
    ///
    /// Requests ask for uncompressed bodies (`Accept-Encoding: identity`).
    pub fn new(config: &SourceConfig) -> Result<Self, Box<dyn Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(
                "zh-CN,zh;q=0.8,zh-TW;q=0.7,zh-HK;q=0.5,en-US;q=0.3,en;q=0.2",
            ),
        );
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(header::REFERER, HeaderValue::from_str(&config.referer)?);
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            platform: config.platform.clone(),
        })
    }

    /// Listing page URL for `period`.
    pub fn listing_url(&self, period: &Period) -> String {
        format!("{}/{}_{}/", self.base_url, self.platform, period.slug())
    }

    /// Fetch a listing page body, or `None` on a non-200 response.
    async fn fetch_page(&self, url: &str) -> Result<Option<String>, Box<dyn Error>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, %status, "Listing request failed");
            return Ok(None);
        }
        // Always decode as UTF-8 regardless of what the headers claim.
        let bytes = response.bytes().await?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl ListingSource for GamerskySource {
    #[instrument(level = "info", skip_all, fields(%period))]
    async fn fetch_period(&self, period: &Period) -> Vec<RawGameEntry> {
        let url = self.listing_url(period);
        let page_url = match Url::parse(&url) {
            Ok(u) => u,
            Err(e) => {
                error!(%url, error = %e, "Invalid listing URL");
                return Vec::new();
            }
        };

        match self.fetch_page(&url).await {
            Ok(Some(html)) => {
                let entries = parse_listing(&html, &page_url);
                info!(%url, count = entries.len(), "Parsed release listing");
                entries
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(%url, error = %e, "Error while fetching release listing");
                Vec::new()
            }
        }
    }
}

/// Extract raw entries from a listing page.
///
/// Items without a title link, or with an empty title, are skipped. Relative
/// links are resolved against `page_url`.
pub fn parse_listing(html: &str, page_url: &Url) -> Vec<RawGameEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for item in document.select(&ITEM) {
        let Some(title) = item.select(&TITLE).next() else {
            debug!(item = %truncate_for_log(&item.html(), 120), "Skipping item without title");
            continue;
        };
        let name = stripped_text(title);
        if name.is_empty() {
            continue;
        }

        let raw_date = item.select(&DATE).next().map(stripped_text).unwrap_or_default();
        let type_text = item.select(&TYPE).next().map(stripped_text);
        let more_link = item
            .select(&MORE)
            .next()
            .map(|a| resolve_href(a, page_url))
            .unwrap_or_default();

        entries.push(RawGameEntry {
            name,
            link: resolve_href(title, page_url),
            raw_date,
            type_text,
            more_link,
        });
    }

    entries
}

/// All descendant text with each fragment trimmed, concatenated.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

fn resolve_href(element: ElementRef<'_>, page_url: &Url) -> String {
    match element.value().attr("href").map(str::trim) {
        Some("") | None => String::new(),
        Some(href) => page_url
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
        <ul class="PF">
          <li class="lx1">
            <div class="tit"><a href="https://ku.gamersky.com/2025/game-a/">  Game A  </a></div>
            <div class="txt">发行日期：<span>2025-03-15</span></div>
            <div class="txt">类型：<a href="http://ku.gamersky.com/sp/1/">动作游戏</a></div>
            <div class="more"><a href="/2025/game-a/more/">更多</a></div>
          </li>
          <li class="lx1">
            <div class="tit"><a href="/2025/game-b/">Game B</a></div>
            <div class="txt">发行日期：2025年9月</div>
          </li>
          <li class="lx1">
            <div class="txt">发行日期：2025-04-01</div>
          </li>
          <li class="lx1">
            <div class="tit"><a href="/2025/blank/">   </a></div>
          </li>
          <li class="lx1">
            <div class="tit"><a>Game C</a></div>
            <div class="more"><a>更多</a></div>
          </li>
        </ul>
        <ul class="other"><li class="lx1"><div class="tit"><a href="/x/">Not a game</a></div></li></ul>
        </body></html>
    "#;

    fn page_url() -> Url {
        Url::parse("https://ku.gamersky.com/release/ps5_202503/").unwrap()
    }

    #[test]
    fn test_parse_listing_extracts_fields() {
        let entries = parse_listing(LISTING, &page_url());
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Game A", "Game B", "Game C"]);

        let a = &entries[0];
        assert_eq!(a.link, "https://ku.gamersky.com/2025/game-a/");
        assert_eq!(a.raw_date, "发行日期：2025-03-15");
        assert_eq!(a.type_text.as_deref(), Some("动作游戏"));
        assert_eq!(a.more_link, "https://ku.gamersky.com/2025/game-a/more/");
    }

    #[test]
    fn test_parse_listing_defaults_missing_parts() {
        let entries = parse_listing(LISTING, &page_url());

        let b = &entries[1];
        assert_eq!(b.link, "https://ku.gamersky.com/2025/game-b/");
        assert_eq!(b.raw_date, "发行日期：2025年9月");
        assert_eq!(b.type_text, None);
        assert_eq!(b.more_link, "");

        let c = &entries[2];
        assert_eq!(c.link, "");
        assert_eq!(c.raw_date, "");
        assert_eq!(c.more_link, "");
    }

    #[test]
    fn test_parse_listing_without_items() {
        assert!(parse_listing("<html><body><p>维护中</p></body></html>", &page_url()).is_empty());
        assert!(parse_listing("", &page_url()).is_empty());
    }

    #[test]
    fn test_listing_url() {
        let source = GamerskySource::new(&SourceConfig::default()).unwrap();
        assert_eq!(
            source.listing_url(&Period { year: 2025, month: 3 }),
            "https://ku.gamersky.com/release/ps5_202503/"
        );

        let config = SourceConfig {
            base_url: "http://localhost:8080/release/".to_string(),
            platform: "switch".to_string(),
            ..SourceConfig::default()
        };
        let source = GamerskySource::new(&config).unwrap();
        assert_eq!(
            source.listing_url(&Period { year: 2026, month: 11 }),
            "http://localhost:8080/release/switch_202611/"
        );
    }

    /// Serve a single HTTP response on an ephemeral port and return the
    /// listing base URL pointing at it.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/release")
    }

    fn local_source(base_url: String) -> GamerskySource {
        let config = SourceConfig {
            base_url,
            timeout_secs: 5,
            ..SourceConfig::default()
        };
        GamerskySource::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_period_parses_served_listing() {
        let base_url = serve_once("200 OK", LISTING).await;
        let source = local_source(base_url.clone());

        let entries = source.fetch_period(&Period { year: 2025, month: 3 }).await;

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Game A", "Game B", "Game C"]);
        assert_eq!(entries[0].raw_date, "发行日期：2025-03-15");
        assert_eq!(entries[0].type_text.as_deref(), Some("动作游戏"));
        let host = base_url.trim_end_matches("/release");
        assert_eq!(entries[1].link, format!("{host}/2025/game-b/"));
    }

    #[tokio::test]
    async fn test_non_success_status_yields_no_entries() {
        let base_url = serve_once("404 Not Found", LISTING).await;
        let source = local_source(base_url);

        let entries = source.fetch_period(&Period { year: 2025, month: 3 }).await;

        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_no_entries() {
        let config = SourceConfig {
            base_url: "http://127.0.0.1:9/release".to_string(),
            timeout_secs: 2,
            ..SourceConfig::default()
        };
        let source = GamerskySource::new(&config).unwrap();
        let entries = source.fetch_period(&Period { year: 2025, month: 1 }).await;
        assert!(entries.is_empty());
    }
}
