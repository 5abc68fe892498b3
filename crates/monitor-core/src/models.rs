use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Feed keys ─────────────────────────────────────────────────────────────────

/// Header key holding the observation date.
pub const DATE_KEY: &str = "price_check_date";
/// Header key holding the lowest price found at observation time.
pub const BEST_PRICE_KEY: &str = "best_price";
/// Header key holding the baseline/list price at observation time.
pub const INITIAL_PRICE_KEY: &str = "initial_price";

/// Column order written by the feed producer for the three required keys.
pub const CANONICAL_HEADER: [&str; 3] = [DATE_KEY, INITIAL_PRICE_KEY, BEST_PRICE_KEY];

// ── Price ─────────────────────────────────────────────────────────────────────

/// An integer currency amount coerced from a feed field.
///
/// Fields that are not decimal integers become [`Price::NotANumber`]; any
/// arithmetic involving such a value yields no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Price {
    Value(i64),
    NotANumber,
}

impl Price {
    /// Coerce a raw field into a price.
    ///
    /// ```
    /// use monitor_core::models::Price;
    ///
    /// assert_eq!(Price::parse("1200"), Price::Value(1200));
    /// assert_eq!(Price::parse(" 950 "), Price::Value(950));
    /// assert_eq!(Price::parse("abc"), Price::NotANumber);
    /// assert_eq!(Price::parse("12.50"), Price::NotANumber);
    /// assert_eq!(Price::parse(""), Price::NotANumber);
    /// ```
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map(Price::Value)
            .unwrap_or(Price::NotANumber)
    }

    /// The numeric value, or `None` for not-a-number.
    pub fn value(self) -> Option<i64> {
        match self {
            Price::Value(v) => Some(v),
            Price::NotANumber => None,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Price::NotANumber)
    }
}

impl From<i64> for Price {
    fn from(v: i64) -> Self {
        Price::Value(v)
    }
}

// ── PriceObservation ──────────────────────────────────────────────────────────

/// One row of the price feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceObservation {
    /// Calendar date of the price check.
    pub observed_at: NaiveDate,
    /// Lowest price found at observation time.
    pub best_price: Price,
    /// Baseline/list price at observation time.
    pub initial_price: Price,
    /// Trimmed raw field values, aligned with the series header.
    pub fields: Vec<String>,
}

impl PriceObservation {
    /// Build an observation laid out in [`CANONICAL_HEADER`] order.
    pub fn new(observed_at: NaiveDate, best_price: impl Into<Price>, initial_price: impl Into<Price>) -> Self {
        let best_price = best_price.into();
        let initial_price = initial_price.into();
        let fields = vec![
            observed_at.format("%Y-%m-%d").to_string(),
            price_field(initial_price),
            price_field(best_price),
        ];
        Self {
            observed_at,
            best_price,
            initial_price,
            fields,
        }
    }

    /// `initial − best`, when both prices are numbers and the difference
    /// fits in an `i64`.
    pub fn savings(&self) -> Option<i64> {
        self.initial_price
            .value()?
            .checked_sub(self.best_price.value()?)
    }

    /// `savings / initial × 100`, rounded down.
    ///
    /// `None` when either price is not a number or the initial price is zero.
    pub fn discount_percent(&self) -> Option<i64> {
        let initial = self.initial_price.value()?;
        if initial == 0 {
            return None;
        }
        let savings = self.savings()?;
        Some(((savings as f64 / initial as f64) * 100.0).floor() as i64)
    }
}

fn price_field(price: Price) -> String {
    price.value().map(|v| v.to_string()).unwrap_or_default()
}

// ── PriceSeries ───────────────────────────────────────────────────────────────

/// All observations of the current load, in feed order, plus the feed header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    header: Vec<String>,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(header: Vec<String>, observations: Vec<PriceObservation>) -> Self {
        Self {
            header,
            observations,
        }
    }

    /// Build a series from observations created with [`PriceObservation::new`].
    pub fn from_observations(observations: Vec<PriceObservation>) -> Self {
        let header = CANONICAL_HEADER.iter().map(|k| k.to_string()).collect();
        Self::new(header, observations)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceObservation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Look up the raw value of `key` for `observation`.
    pub fn field<'a>(&self, observation: &'a PriceObservation, key: &str) -> Option<&'a str> {
        let idx = self.header.iter().position(|h| h == key)?;
        observation.fields.get(idx).map(String::as_str)
    }

    /// Most recent first. Equal dates keep feed order.
    pub fn sorted_desc(&self) -> Vec<&PriceObservation> {
        let mut sorted: Vec<&PriceObservation> = self.observations.iter().collect();
        sorted.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
        sorted
    }

    /// Oldest first. Equal dates keep feed order.
    pub fn sorted_asc(&self) -> Vec<&PriceObservation> {
        let mut sorted: Vec<&PriceObservation> = self.observations.iter().collect();
        sorted.sort_by_key(|o| o.observed_at);
        sorted
    }
}

// ── Derived statistics ────────────────────────────────────────────────────────

/// How a price movement reads for someone waiting to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    /// The price went down.
    Favorable,
    /// The price went up.
    Unfavorable,
    NoChange,
    /// One of the prices is not a number.
    Unknown,
}

impl ChangeDirection {
    /// Classify a signed change amount (`current − previous`).
    pub fn from_amount(amount: Option<i64>) -> Self {
        match amount {
            Some(a) if a < 0 => ChangeDirection::Favorable,
            Some(a) if a > 0 => ChangeDirection::Unfavorable,
            Some(_) => ChangeDirection::NoChange,
            None => ChangeDirection::Unknown,
        }
    }
}

/// Direction of the rolling-window trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

impl TrendDirection {
    pub fn from_amount(amount: Option<i64>) -> Self {
        match amount {
            Some(a) if a > 0 => TrendDirection::Increasing,
            Some(a) if a < 0 => TrendDirection::Decreasing,
            Some(_) => TrendDirection::Stable,
            None => TrendDirection::Unknown,
        }
    }
}

/// Movement between the latest and the previous observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub previous_price: Price,
    pub previous_date: NaiveDate,
    /// `current − previous`.
    pub amount: Option<i64>,
    /// `amount / previous × 100`, one decimal.
    pub percent: Option<f64>,
    pub direction: ChangeDirection,
}

/// Movement across the most recent observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    /// Number of observations in the window (at least 2).
    pub window_size: usize,
    pub oldest_price: Price,
    pub oldest_date: NaiveDate,
    /// `current − oldest`.
    pub change: Option<i64>,
    /// `change / oldest × 100`, one decimal.
    pub percent: Option<f64>,
    pub direction: TrendDirection,
}

/// Minimum best price across the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LowestPrice {
    pub price: i64,
    pub observed_at: NaiveDate,
}

/// Point-in-time statistics derived from a non-empty series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub current_price: Price,
    /// Date of the most recent observation.
    pub last_update: NaiveDate,
    /// `None` with fewer than two observations.
    pub change: Option<PriceChange>,
    /// `None` when no observation has a numeric best price.
    pub lowest: Option<LowestPrice>,
    /// `None` when the window holds fewer than two observations.
    pub trend: Option<Trend>,
    pub observation_count: usize,
}
