//! Feed load pipeline.
//!
//! Fetches the feed, parses it and rejects loads that produce no usable
//! observations, returning a [`FeedLoad`] ready for the runtime layer.

use chrono::{DateTime, Utc};
use monitor_core::models::PriceSeries;
use monitor_core::{MonitorError, Result};
use tracing::{info, warn};

use crate::fetch::{FeedClient, FeedSource};
use crate::reader::parse;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a loaded series.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadMetadata {
    /// When this load completed.
    pub loaded_at: DateTime<Utc>,
    /// The feed URL or file path.
    pub source: String,
    /// Non-empty data lines in the feed.
    pub rows_read: usize,
    /// Observations kept after ingestion.
    pub observations: usize,
    /// Wall-clock seconds spent fetching.
    pub fetch_time_seconds: f64,
}

impl LoadMetadata {
    /// Rows dropped for a missing or unparseable date.
    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.observations)
    }
}

/// The complete output of [`load_feed`].
#[derive(Debug, Clone)]
pub struct FeedLoad {
    pub series: PriceSeries,
    pub metadata: LoadMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full load pipeline.
///
/// 1. Fetch the raw text from `source`.
/// 2. Parse it into a [`PriceSeries`].
/// 3. Fail with [`MonitorError::EmptyDataset`] when nothing survived.
pub async fn load_feed(client: &FeedClient, source: &FeedSource) -> Result<FeedLoad> {
    let fetch_start = std::time::Instant::now();
    let raw = client.fetch_text(source).await.map_err(|e| {
        warn!("Feed fetch failed: {}", e);
        e
    })?;
    let fetch_time = fetch_start.elapsed().as_secs_f64();

    let feed = build_load(&raw, source.to_string(), fetch_time)?;
    info!(
        "Loaded {} observations from {} ({} rows dropped)",
        feed.metadata.observations,
        feed.metadata.source,
        feed.metadata.rows_dropped()
    );
    Ok(feed)
}

/// Parse already-fetched text into a [`FeedLoad`].
pub fn build_load(raw: &str, source: String, fetch_time_seconds: f64) -> Result<FeedLoad> {
    let series = parse(raw)?;
    if series.is_empty() {
        warn!("Feed {} contains no usable observations", source);
        return Err(MonitorError::EmptyDataset);
    }

    let metadata = LoadMetadata {
        loaded_at: Utc::now(),
        source,
        rows_read: count_data_rows(raw),
        observations: series.len(),
        fetch_time_seconds,
    };
    Ok(FeedLoad { series, metadata })
}

fn count_data_rows(raw: &str) -> usize {
    raw.trim()
        .split('\n')
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
