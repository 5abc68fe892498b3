//! Feed retrieval over HTTP or from a local file.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use monitor_core::{MonitorError, Result};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use tracing::debug;

use crate::reader::read_feed_file;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ── FeedSource ────────────────────────────────────────────────────────────────

/// Where the CSV feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    /// Pick the source from the configured options; a file wins over a URL.
    pub fn from_options(url: Option<&str>, file: Option<PathBuf>) -> Result<Self> {
        match (file, url) {
            (Some(path), _) => Ok(FeedSource::File(path)),
            (None, Some(url)) if !url.trim().is_empty() => Ok(FeedSource::Url(url.trim().to_string())),
            _ => Err(MonitorError::Config(
                "no feed configured; pass --feed-url or --feed-file".to_string(),
            )),
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Url(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ── FeedClient ────────────────────────────────────────────────────────────────

/// Fetches feed text with caching disabled end to end.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| MonitorError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Retrieve the raw feed text from `source`.
    pub async fn fetch_text(&self, source: &FeedSource) -> Result<String> {
        match source {
            FeedSource::File(path) => read_feed_file(path),
            FeedSource::Url(url) => self.fetch_url(url).await,
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<String> {
        let busted = cache_busted_url(url, unix_millis());
        debug!("Fetching feed from {}", busted);

        let fetch_err = |reason: String| MonitorError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&busted)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP status {}", status)));
        }

        response.text().await.map_err(|e| fetch_err(e.to_string()))
    }
}

/// Append the `t=<millis>` cache-busting query parameter.
///
/// ```
/// use monitor_data::fetch::cache_busted_url;
///
/// assert_eq!(cache_busted_url("https://h/a.csv", 42), "https://h/a.csv?t=42");
/// assert_eq!(cache_busted_url("https://h/a.csv?x=1", 42), "https://h/a.csv?x=1&t=42");
/// ```
pub fn cache_busted_url(url: &str, millis: u128) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (url, None),
    };
    let sep = if base.contains('?') { '&' } else { '?' };
    match fragment {
        Some(f) => format!("{}{}t={}#{}", base, sep, millis, f),
        None => format!("{}{}t={}", base, sep, millis),
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cache_busted_url_variants() {
        assert_eq!(cache_busted_url("https://h/a.csv", 1), "https://h/a.csv?t=1");
        assert_eq!(cache_busted_url("https://h/a.csv?", 1), "https://h/a.csv?&t=1");
        assert_eq!(cache_busted_url("https://h/a.csv#top", 7), "https://h/a.csv?t=7#top");
    }

    #[test]
    fn test_unix_millis_is_recent() {
        // 2020-01-01 in millis
        assert!(unix_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_feed_source_file_wins() {
        let src = FeedSource::from_options(Some("https://h/a.csv"), Some(PathBuf::from("/tmp/a.csv"))).unwrap();
        assert_eq!(src, FeedSource::File(PathBuf::from("/tmp/a.csv")));
    }

    #[test]
    fn test_feed_source_url() {
        let src = FeedSource::from_options(Some(" https://h/a.csv "), None).unwrap();
        assert_eq!(src, FeedSource::Url("https://h/a.csv".to_string()));
        assert_eq!(src.to_string(), "https://h/a.csv");
    }

    #[test]
    fn test_feed_source_missing() {
        assert!(matches!(
            FeedSource::from_options(None, None),
            Err(MonitorError::Config(_))
        ));
        assert!(FeedSource::from_options(Some("  "), None).is_err());
    }

    #[tokio::test]
    async fn test_fetch_text_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "price_check_date,initial_price,best_price\n2024-01-01,1200,1000").unwrap();
        let client = FeedClient::new(DEFAULT_TIMEOUT).unwrap();
        let text = client
            .fetch_text(&FeedSource::File(file.path().to_path_buf()))
            .await
            .unwrap();
        assert!(text.starts_with("price_check_date"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_url_is_fetch_error() {
        let client = FeedClient::new(Duration::from_secs(2)).unwrap();
        // Port 9 on localhost is the discard service; nothing listens in CI.
        let err = client
            .fetch_text(&FeedSource::Url("http://127.0.0.1:9/history.csv".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Fetch { .. }));
        assert!(err.to_string().contains("http://127.0.0.1:9/history.csv"));
    }
}
