//! Dashboard state owner.
//!
//! [`DashboardSession`] holds the current series and display range. Loads
//! replace the series wholesale and range changes replace the range; every
//! derived view is recomputed from the full series on demand.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use monitor_core::calculations::{StatisticsCalculator, DEFAULT_TREND_WINDOW};
use monitor_core::projection::{table_rows, ChartSeries, TableRow, TableSort};
use monitor_core::range::{self, DisplayRange};
use monitor_core::time_utils::today_in;
use monitor_core::{PriceSeries, Result, StatisticsSnapshot};
use monitor_data::analysis::{FeedLoad, LoadMetadata};
use monitor_data::export::write_export;

// ── LoadInfo ──────────────────────────────────────────────────────────────────

/// How the current series was loaded, for the header.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadInfo {
    /// Completion time in the configured timezone.
    pub loaded_at: NaiveDateTime,
    pub fetch_seconds: f64,
    /// Rows dropped for a missing or unparseable date.
    pub rows_dropped: usize,
}

impl LoadInfo {
    fn from_metadata(metadata: &LoadMetadata, timezone: Tz) -> Self {
        Self {
            loaded_at: metadata.loaded_at.with_timezone(&timezone).naive_local(),
            fetch_seconds: metadata.fetch_time_seconds,
            rows_dropped: metadata.rows_dropped(),
        }
    }
}

// ── DashboardView ─────────────────────────────────────────────────────────────

/// Everything the presentation layer draws for one frame.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub range: DisplayRange,
    /// Statistics over the full series; `None` when it is empty.
    pub stats: Option<StatisticsSnapshot>,
    /// Chart data for observations inside `range`.
    pub chart: ChartSeries,
    /// Table rows for the full series.
    pub rows: Vec<TableRow>,
    pub sort: TableSort,
    /// Observations inside `range`.
    pub visible_count: usize,
    /// `None` until a load succeeded.
    pub load: Option<LoadInfo>,
}

// ── DashboardSession ──────────────────────────────────────────────────────────

pub struct DashboardSession {
    series: PriceSeries,
    range: DisplayRange,
    trend_window: usize,
    timezone: Tz,
    metadata: Option<LoadMetadata>,
}

impl DashboardSession {
    pub fn new(range: DisplayRange, trend_window: usize, timezone: Tz) -> Self {
        Self {
            series: PriceSeries::default(),
            range,
            trend_window,
            timezone,
            metadata: None,
        }
    }

    /// Swap in a freshly loaded series.
    pub fn replace_series(&mut self, feed: FeedLoad) {
        tracing::debug!(
            previous = self.series.len(),
            next = feed.series.len(),
            "replacing series"
        );
        self.series = feed.series;
        self.metadata = Some(feed.metadata);
    }

    pub fn set_range(&mut self, range: DisplayRange) {
        if range != self.range {
            tracing::debug!(from = %self.range, to = %range, "display range changed");
        }
        self.range = range;
    }

    pub fn range(&self) -> DisplayRange {
        self.range
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }

    pub fn trend_window(&self) -> usize {
        self.trend_window
    }

    /// Today in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        today_in(self.timezone)
    }

    pub fn statistics(&self) -> Option<StatisticsSnapshot> {
        StatisticsCalculator::calculate(&self.series, self.trend_window)
    }

    /// Build the frame for `today`.
    pub fn view_at(&self, today: NaiveDate, sort: TableSort) -> DashboardView {
        let visible = range::filter(&self.series, self.range, today);
        DashboardView {
            range: self.range,
            stats: self.statistics(),
            chart: ChartSeries::from_observations(&visible),
            rows: table_rows(&self.series, sort),
            sort,
            visible_count: visible.len(),
            load: self
                .metadata
                .as_ref()
                .map(|m| LoadInfo::from_metadata(m, self.timezone)),
        }
    }

    pub fn view(&self, sort: TableSort) -> DashboardView {
        self.view_at(self.today(), sort)
    }

    /// Write the full series to `dir` as today's export file.
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        write_export(&self.series, dir, self.today())
    }
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(DisplayRange::default(), DEFAULT_TREND_WINDOW, Tz::UTC)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
