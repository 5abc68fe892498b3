//! Price-change alerts.
//!
//! The latest two observations in feed order are compared; a differing
//! `best_price` produces a [`PriceChangeAlert`]. The date and raw best price
//! of the last alerted observation are persisted to
//! `~/.price-monitor/alert_state.json` so that the same change is reported
//! only once.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formatting::{format_date_iso, PriceFormatter};
use crate::models::{Price, PriceSeries, BEST_PRICE_KEY};
use crate::settings::app_dir;

/// Optional pass-through keys describing the trip being priced.
pub const START_DATE_KEY: &str = "start_date";
pub const END_DATE_KEY: &str = "end_date";

const STATE_FILE: &str = "alert_state.json";

// ── PriceChangeAlert ──────────────────────────────────────────────────────────

/// A change of `best_price` between the two most recent feed rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChangeAlert {
    pub previous_date: NaiveDate,
    pub previous_best: Price,
    pub previous_initial: Price,
    pub latest_date: NaiveDate,
    pub latest_best: Price,
    pub latest_initial: Price,
    /// Trimmed `best_price` field of the latest row.
    pub latest_best_raw: String,
    /// `latest − previous`; `None` when either is not a number or the
    /// difference overflows.
    pub difference: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl PriceChangeAlert {
    /// One-line subject, e.g. `"Price Alert: price changed on 2024-01-15"`.
    pub fn subject(&self) -> String {
        format!(
            "Price Alert: price changed on {}",
            format_date_iso(self.latest_date)
        )
    }

    /// Plain-text alert body.
    pub fn text_body(&self, fmt: &dyn PriceFormatter) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.subject());

        if self.start_date.is_some() || self.end_date.is_some() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Trip details:");
            let _ = writeln!(out, "  Check-in:  {}", self.start_date.as_deref().unwrap_or("-"));
            let _ = writeln!(out, "  Check-out: {}", self.end_date.as_deref().unwrap_or("-"));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Price comparison:");
        let _ = writeln!(
            out,
            "  {}: {} (best) / {} (initial)",
            format_date_iso(self.previous_date),
            fmt.format(self.previous_best),
            fmt.format(self.previous_initial)
        );
        let _ = writeln!(
            out,
            "  {}: {} (best) / {} (initial)",
            format_date_iso(self.latest_date),
            fmt.format(self.latest_best),
            fmt.format(self.latest_initial)
        );

        let _ = writeln!(out);
        match self.difference {
            Some(d) if d > 0 => {
                let _ = write!(out, "UP by {}", fmt.format_amount(d));
            }
            Some(d) if d < 0 => {
                let _ = write!(out, "DOWN by {}", fmt.format_amount(-d));
            }
            _ => {
                let _ = write!(out, "Changed (difference unavailable)");
            }
        }
        out
    }
}

/// Compare the last two observations in feed order.
///
/// Raw `best_price` strings are compared, so `"900"` → `"abc"` is a change
/// even though no difference can be computed.
pub fn detect_price_change(series: &PriceSeries) -> Option<PriceChangeAlert> {
    let observations = series.observations();
    if observations.len() < 2 {
        tracing::debug!("not enough observations to compare");
        return None;
    }
    let latest = &observations[observations.len() - 1];
    let previous = &observations[observations.len() - 2];

    let latest_raw = series.field(latest, BEST_PRICE_KEY).unwrap_or_default();
    let previous_raw = series.field(previous, BEST_PRICE_KEY).unwrap_or_default();
    tracing::debug!(
        previous = %previous_raw,
        latest = %latest_raw,
        "comparing latest best prices"
    );
    if latest_raw == previous_raw {
        return None;
    }

    let non_empty = |key: &str| {
        series
            .field(latest, key)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Some(PriceChangeAlert {
        previous_date: previous.observed_at,
        previous_best: previous.best_price,
        previous_initial: previous.initial_price,
        latest_date: latest.observed_at,
        latest_best: latest.best_price,
        latest_initial: latest.initial_price,
        latest_best_raw: latest_raw.to_string(),
        difference: latest
            .best_price
            .value()
            .zip(previous.best_price.value())
            .and_then(|(l, p)| l.checked_sub(p)),
        start_date: non_empty(START_DATE_KEY),
        end_date: non_empty(END_DATE_KEY),
    })
}

// ── AlertState ────────────────────────────────────────────────────────────────

/// Persisted record of the last reported alert.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlertState {
    /// `latest_date` of the last reported alert.
    pub last_alerted_date: Option<NaiveDate>,
    /// Raw latest `best_price` of the last reported alert.
    #[serde(default)]
    pub last_alerted_price: Option<String>,
    /// When it was reported.
    pub alerted_at: Option<DateTime<Utc>>,
}

// ── AlertStateStore ───────────────────────────────────────────────────────────

/// Loads and persists [`AlertState`] so alerts survive process restarts.
///
/// Read and write failures are logged as warnings and never fail the caller.
pub struct AlertStateStore {
    state_file: PathBuf,
    state: AlertState,
}

impl AlertStateStore {
    /// Create a store that persists state to `config_dir`.
    pub fn new(config_dir: &Path) -> Self {
        let state_file = config_dir.join(STATE_FILE);
        let state = Self::load_state(&state_file);
        Self { state_file, state }
    }

    /// Store under the application directory.
    pub fn with_default_path() -> Self {
        Self::new(&app_dir())
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// `true` unless `alert` was already reported.
    ///
    /// The feed producer rewrites a same-day row in place, so a new price on
    /// an already-alerted date is a new alert.
    pub fn should_alert(&self, alert: &PriceChangeAlert) -> bool {
        self.state.last_alerted_date != Some(alert.latest_date)
            || self.state.last_alerted_price.as_deref() != Some(alert.latest_best_raw.as_str())
    }

    /// Record `alert` as reported and persist.
    pub fn mark_alerted(&mut self, alert: &PriceChangeAlert) {
        self.state = AlertState {
            last_alerted_date: Some(alert.latest_date),
            last_alerted_price: Some(alert.latest_best_raw.clone()),
            alerted_at: Some(Utc::now()),
        };
        self.save_state();
    }

    fn load_state(path: &Path) -> AlertState {
        if !path.exists() {
            return AlertState::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "failed to deserialise alert state; starting fresh"
                );
                AlertState::default()
            }),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "failed to read alert state file; starting fresh"
                );
                AlertState::default()
            }
        }
    }

    fn save_state(&self) {
        if let Err(e) = self.write_state() {
            tracing::warn!(
                error = %e,
                path = %self.state_file.display(),
                "failed to save alert state"
            );
        }
    }

    fn write_state(&self) -> Result<()> {
        if let Some(parent) = self.state_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(&self.state_file, json)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
