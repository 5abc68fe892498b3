//! Feed loader for the monitoring runtime.
//!
//! Wraps [`load_feed`] with the configured source and HTTP client. Loads are
//! single-shot: a failure is reported to the caller and never retried
//! automatically.

use std::time::Duration;

use monitor_core::Result;
use monitor_data::analysis::{load_feed, FeedLoad};
use monitor_data::fetch::{FeedClient, FeedSource};

// ── DataManager ───────────────────────────────────────────────────────────────

/// Owns the feed source and client.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use monitor_data::fetch::FeedSource;
/// use monitor_runtime::data_manager::DataManager;
///
/// # async fn run() -> monitor_core::Result<()> {
/// let source = FeedSource::Url("https://example.com/history.csv".into());
/// let mgr = DataManager::new(source, Duration::from_secs(30))?;
/// let feed = mgr.load().await?;
/// println!("{} observations", feed.series.len());
/// # Ok(())
/// # }
/// ```
pub struct DataManager {
    source: FeedSource,
    client: FeedClient,
}

impl DataManager {
    pub fn new(source: FeedSource, timeout: Duration) -> Result<Self> {
        Ok(Self {
            source,
            client: FeedClient::new(timeout)?,
        })
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Fetch and parse the feed once.
    pub async fn load(&self) -> Result<FeedLoad> {
        tracing::debug!(source = %self.source, "loading feed");
        let outcome = load_feed(&self.client, &self.source).await;

        match &outcome {
            Ok(feed) => tracing::debug!(
                observations = feed.metadata.observations,
                dropped = feed.metadata.rows_dropped(),
                fetch_seconds = feed.metadata.fetch_time_seconds,
                "feed loaded"
            ),
            Err(e) => tracing::warn!(error = %e, "feed load failed"),
        }
        outcome
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn feed_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{}", contents).expect("write");
        file
    }

    fn make_manager(path: &std::path::Path) -> DataManager {
        DataManager::new(FeedSource::File(path.to_path_buf()), Duration::from_secs(5))
            .expect("manager")
    }

    #[tokio::test]
    async fn test_load_success_returns_metadata() {
        let file = feed_file("price_check_date,initial_price,best_price\n2024-01-01,1200,1000");
        let mgr = make_manager(file.path());

        let feed = mgr.load().await.expect("load");
        assert_eq!(feed.series.len(), 1);
        assert_eq!(feed.metadata.observations, 1);
        assert_eq!(feed.metadata.source, file.path().display().to_string());
        assert!(feed.metadata.fetch_time_seconds >= 0.0);
    }

    #[tokio::test]
    async fn test_load_empty_dataset_is_load_failure() {
        let file = feed_file("price_check_date,initial_price,best_price\n");
        let mgr = make_manager(file.path());

        let err = mgr.load().await.unwrap_err();
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn test_reload_after_failure_is_not_cached() {
        let file = feed_file("");
        let mgr = make_manager(file.path());
        assert!(mgr.load().await.is_err());

        std::fs::write(
            file.path(),
            "price_check_date,initial_price,best_price\n2024-01-01,1200,1000",
        )
        .expect("rewrite");
        assert_eq!(mgr.load().await.expect("reload").series.len(), 1);
    }
}
