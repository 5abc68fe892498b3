//! CSV price feed parsing.
//!
//! The feed is a plain comma-separated table with a header line. Quoting and
//! escaping are not supported; values are split on `,` and trimmed.

use std::path::Path;

use monitor_core::models::{Price, PriceObservation, PriceSeries, BEST_PRICE_KEY, DATE_KEY, INITIAL_PRICE_KEY};
use monitor_core::time_utils::parse_observation_date;
use monitor_core::{MonitorError, Result};
use tracing::debug;

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse raw feed text into a [`PriceSeries`].
///
/// Rows with a missing or unparseable `price_check_date` are dropped. A
/// header-only feed yields an empty series; empty input is an error.
pub fn parse(raw: &str) -> Result<PriceSeries> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(MonitorError::Parse("feed is empty".to_string()));
    }

    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let header: Vec<String> = lines
        .next()
        .map(|h| h.split(',').map(|k| k.trim().to_string()).collect())
        .ok_or_else(|| MonitorError::Parse("no header line".to_string()))?;
    let columns = Columns::locate(&header);

    let mut observations = Vec::new();
    let mut dropped = 0usize;
    // Line numbers are 1-based and count the header.
    for (idx, line) in lines.enumerate() {
        match parse_row(&header, &columns, line, idx + 2) {
            Ok(obs) => observations.push(obs),
            Err(e) => {
                dropped += 1;
                debug!("{}", e);
            }
        }
    }

    debug!(
        "Parsed {} observations ({} rows dropped)",
        observations.len(),
        dropped
    );

    Ok(PriceSeries::new(header, observations))
}

/// Read feed text from a local file.
pub fn read_feed_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| MonitorError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Positions of the required keys in the header.
struct Columns {
    date: Option<usize>,
    best: Option<usize>,
    initial: Option<usize>,
}

impl Columns {
    fn locate(header: &[String]) -> Self {
        let find = |key: &str| header.iter().position(|h| h == key);
        Self {
            date: find(DATE_KEY),
            best: find(BEST_PRICE_KEY),
            initial: find(INITIAL_PRICE_KEY),
        }
    }
}

/// Map one data line onto the header.
///
/// Missing values become empty strings; extra values are ignored.
fn parse_row(header: &[String], columns: &Columns, line: &str, line_no: usize) -> Result<PriceObservation> {
    let mut values = line.split(',').map(str::trim);
    let fields: Vec<String> = header
        .iter()
        .map(|_| values.next().unwrap_or_default().to_string())
        .collect();

    let value_at = |col: Option<usize>| col.and_then(|i| fields.get(i)).map(String::as_str).unwrap_or_default();

    let raw_date = value_at(columns.date);
    if raw_date.is_empty() {
        return Err(MonitorError::MalformedRow {
            line: line_no,
            reason: format!("missing {}", DATE_KEY),
        });
    }
    let observed_at = parse_observation_date(raw_date).ok_or_else(|| MonitorError::MalformedRow {
        line: line_no,
        reason: format!("unparseable {} \"{}\"", DATE_KEY, raw_date),
    })?;

    let best_price = Price::parse(value_at(columns.best));
    let initial_price = Price::parse(value_at(columns.initial));

    Ok(PriceObservation {
        observed_at,
        best_price,
        initial_price,
        fields,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
