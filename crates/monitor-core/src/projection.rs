//! Shapes observations into what the chart and the table draw.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::formatting::format_date_label;
use crate::models::{Price, PriceObservation, PriceSeries};

// ── Chart ─────────────────────────────────────────────────────────────────────

/// Parallel vectors for the price chart, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    /// `"Jan 15, 2024"` style labels.
    pub labels: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// `None` marks a gap (not-a-number).
    pub best_prices: Vec<Option<i64>>,
    pub initial_prices: Vec<Option<i64>>,
}

impl ChartSeries {
    /// Build from already-filtered observations in any order.
    pub fn from_observations(observations: &[&PriceObservation]) -> Self {
        let mut sorted = observations.to_vec();
        sorted.sort_by_key(|o| o.observed_at);

        let mut chart = ChartSeries::default();
        for obs in sorted {
            chart.labels.push(format_date_label(obs.observed_at));
            chart.dates.push(obs.observed_at);
            chart.best_prices.push(obs.best_price.value());
            chart.initial_prices.push(obs.initial_price.value());
        }
        chart
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Minimum and maximum across both lines, ignoring gaps.
    pub fn price_bounds(&self) -> Option<(i64, i64)> {
        let values = self
            .best_prices
            .iter()
            .chain(self.initial_prices.iter())
            .flatten()
            .copied();
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// `(x, y)` points for a line, x being the index. Gaps are skipped.
    pub fn points(values: &[Option<i64>]) -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v as f64)))
            .collect()
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// One display row of the price table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub observed_at: NaiveDate,
    pub best_price: Price,
    pub initial_price: Price,
    /// `initial − best`.
    pub savings: Option<i64>,
    /// `savings / initial × 100`, rounded down.
    pub discount_percent: Option<i64>,
}

impl TableRow {
    pub fn from_observation(obs: &PriceObservation) -> Self {
        Self {
            observed_at: obs.observed_at,
            best_price: obs.best_price,
            initial_price: obs.initial_price,
            savings: obs.savings(),
            discount_percent: obs.discount_percent(),
        }
    }
}

/// Table ordering, cycled with the `s` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableSort {
    #[default]
    DateDesc,
    DateAsc,
    /// Cheapest first; not-a-number rows last.
    BestPriceAsc,
}

impl TableSort {
    pub fn next(self) -> Self {
        match self {
            TableSort::DateDesc => TableSort::DateAsc,
            TableSort::DateAsc => TableSort::BestPriceAsc,
            TableSort::BestPriceAsc => TableSort::DateDesc,
        }
    }

    fn compare(self, a: &TableRow, b: &TableRow) -> Ordering {
        match self {
            TableSort::DateDesc => b.observed_at.cmp(&a.observed_at),
            TableSort::DateAsc => a.observed_at.cmp(&b.observed_at),
            TableSort::BestPriceAsc => match (a.best_price.value(), b.best_price.value()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for TableSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableSort::DateDesc => "date ↓",
            TableSort::DateAsc => "date ↑",
            TableSort::BestPriceAsc => "best price ↑",
        })
    }
}

/// One row per observation of the full series, ordered by `sort`.
///
/// Ties keep feed order.
pub fn table_rows(series: &PriceSeries, sort: TableSort) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = series.iter().map(TableRow::from_observation).collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}
