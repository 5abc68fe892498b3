use chrono::NaiveDate;

use crate::models::Price;

/// Rendered in place of a price that is not a number.
pub const NOT_AVAILABLE: &str = "N/A";

// ── PriceFormatter ────────────────────────────────────────────────────────────

/// Strategy for turning integer prices into display strings.
///
/// Every price shown by the dashboard and the text summaries goes through the
/// active formatter, so masking is a matter of swapping the implementation.
pub trait PriceFormatter: Send + Sync {
    /// Format a known amount, e.g. `1234` → `"$1,234"`.
    fn format_amount(&self, amount: i64) -> String;

    /// Format a coerced price; not-a-number renders as [`NOT_AVAILABLE`].
    fn format(&self, price: Price) -> String {
        match price {
            Price::Value(v) => self.format_amount(v),
            Price::NotANumber => NOT_AVAILABLE.to_string(),
        }
    }

    /// Format a signed difference with an explicit `+` for increases.
    fn format_change(&self, amount: i64) -> String {
        if amount > 0 {
            format!("+{}", self.format_amount(amount))
        } else {
            self.format_amount(amount)
        }
    }

    /// Format an optional amount; `None` renders as [`NOT_AVAILABLE`].
    fn format_opt(&self, amount: Option<i64>) -> String {
        amount
            .map(|v| self.format_amount(v))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

/// Exact dollar amounts with thousands separators.
///
/// ```
/// use monitor_core::formatting::{FullPrice, PriceFormatter};
///
/// assert_eq!(FullPrice.format_amount(12345), "$12,345");
/// assert_eq!(FullPrice.format_amount(-100), "-$100");
/// assert_eq!(FullPrice.format_change(250), "+$250");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPrice;

impl PriceFormatter for FullPrice {
    fn format_amount(&self, amount: i64) -> String {
        let sign = if amount < 0 { "-" } else { "" };
        format!("{}${}", sign, group_thousands(&amount.unsigned_abs().to_string()))
    }
}

/// Thousand-scale precision only.
///
/// ```
/// use monitor_core::formatting::{MaskedPrice, PriceFormatter};
///
/// assert_eq!(MaskedPrice.format_amount(12345), "$12,xxx");
/// assert_eq!(MaskedPrice.format_amount(1_250_000), "$1,250,xxx");
/// assert_eq!(MaskedPrice.format_amount(950), "$xxx");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskedPrice;

impl PriceFormatter for MaskedPrice {
    fn format_amount(&self, amount: i64) -> String {
        let sign = if amount < 0 { "-" } else { "" };
        let thousands = amount.unsigned_abs() / 1000;
        if thousands == 0 {
            format!("{}$xxx", sign)
        } else {
            format!("{}${},xxx", sign, group_thousands(&thousands.to_string()))
        }
    }
}

/// Pick the formatter for the `--mask-prices` setting.
pub fn price_formatter(masked: bool) -> Box<dyn PriceFormatter> {
    if masked {
        Box::new(MaskedPrice)
    } else {
        Box::new(FullPrice)
    }
}

// ── Percentages ───────────────────────────────────────────────────────────────

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `None` when `whole` is zero.
///
/// # Examples
///
/// ```
/// use monitor_core::formatting::percentage;
///
/// assert_eq!(percentage(-100.0, 1000.0, 1), Some(-10.0));
/// assert_eq!(percentage(1.0, 3.0, 1), Some(33.3));
/// assert_eq!(percentage(5.0, 0.0, 1), None);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> Option<f64> {
    if whole == 0.0 {
        return None;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    Some((raw * factor).round() / factor)
}

/// Signed percentage with one decimal, e.g. `"+10.0%"` / `"-3.3%"`.
pub fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) if p > 0.0 => format!("+{:.1}%", p),
        Some(p) => format!("{:.1}%", p),
        None => NOT_AVAILABLE.to_string(),
    }
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Chart and card label, e.g. `"Jan 15, 2024"`.
///
/// ```
/// use chrono::NaiveDate;
/// use monitor_core::formatting::format_date_label;
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(format_date_label(d), "Jan 5, 2024");
/// ```
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// ISO form used in tables and file names.
pub fn format_date_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
