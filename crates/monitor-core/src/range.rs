use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::models::{PriceObservation, PriceSeries};

/// Rolling calendar-day window applied to what is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DisplayRange {
    /// The last `n` days, inclusive of the cutoff date.
    Days(u32),
    All,
}

/// Ranges offered by the dashboard, in key order (`1`..`4`).
pub const RANGE_OPTIONS: [DisplayRange; 4] = [
    DisplayRange::Days(7),
    DisplayRange::Days(30),
    DisplayRange::Days(90),
    DisplayRange::All,
];

impl Default for DisplayRange {
    fn default() -> Self {
        DisplayRange::Days(30)
    }
}

impl DisplayRange {
    /// Human label, e.g. `"Last 30 days"` / `"All time"`.
    pub fn label(self) -> String {
        match self {
            DisplayRange::Days(1) => "Last day".to_string(),
            DisplayRange::Days(n) => format!("Last {} days", n),
            DisplayRange::All => "All time".to_string(),
        }
    }

    /// Earliest date kept, or `None` for [`DisplayRange::All`].
    pub fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DisplayRange::Days(n) => Some(
                today
                    .checked_sub_days(Days::new(u64::from(n)))
                    .unwrap_or(NaiveDate::MIN),
            ),
            DisplayRange::All => None,
        }
    }

    /// Range selected by dashboard key `'1'`..`'4'`.
    pub fn from_key(key: char) -> Option<Self> {
        let idx = key.to_digit(10)? as usize;
        idx.checked_sub(1).and_then(|i| RANGE_OPTIONS.get(i)).copied()
    }
}

impl fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayRange::Days(n) => write!(f, "{}", n),
            DisplayRange::All => f.write_str("all"),
        }
    }
}

impl FromStr for DisplayRange {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(DisplayRange::All);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(DisplayRange::Days(n)),
            _ => Err(MonitorError::InvalidRange(s.to_string())),
        }
    }
}

impl TryFrom<String> for DisplayRange {
    type Error = MonitorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DisplayRange> for String {
    fn from(range: DisplayRange) -> Self {
        range.to_string()
    }
}

/// Observations of `series` inside `range`, in original order.
///
/// `Days(n)` keeps every observation dated on or after `today − n days`.
pub fn filter(series: &PriceSeries, range: DisplayRange, today: NaiveDate) -> Vec<&PriceObservation> {
    match range.cutoff(today) {
        None => series.iter().collect(),
        Some(cutoff) => series.iter().filter(|o| o.observed_at >= cutoff).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(dates: &[NaiveDate]) -> PriceSeries {
        PriceSeries::from_observations(
            dates
                .iter()
                .map(|&d| PriceObservation::new(d, 1000, 1200))
                .collect(),
        )
    }

    #[test]
    fn test_parse_range() {
        assert_eq!("7".parse::<DisplayRange>().unwrap(), DisplayRange::Days(7));
        assert_eq!("90".parse::<DisplayRange>().unwrap(), DisplayRange::Days(90));
        assert_eq!("14".parse::<DisplayRange>().unwrap(), DisplayRange::Days(14));
        assert_eq!("all".parse::<DisplayRange>().unwrap(), DisplayRange::All);
        assert_eq!("ALL".parse::<DisplayRange>().unwrap(), DisplayRange::All);
    }

    #[test]
    fn test_parse_range_rejects_invalid() {
        assert!("0".parse::<DisplayRange>().is_err());
        assert!("-3".parse::<DisplayRange>().is_err());
        assert!("week".parse::<DisplayRange>().is_err());
    }

    #[test]
    fn test_display_roundtrip_and_default() {
        assert_eq!(DisplayRange::default(), DisplayRange::Days(30));
        assert_eq!(DisplayRange::Days(7).to_string(), "7");
        assert_eq!(DisplayRange::All.to_string(), "all");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&DisplayRange::Days(90)).unwrap();
        assert_eq!(json, "\"90\"");
        let back: DisplayRange = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(back, DisplayRange::All);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DisplayRange::Days(7).label(), "Last 7 days");
        assert_eq!(DisplayRange::All.label(), "All time");
    }

    #[test]
    fn test_from_key() {
        assert_eq!(DisplayRange::from_key('1'), Some(DisplayRange::Days(7)));
        assert_eq!(DisplayRange::from_key('3'), Some(DisplayRange::Days(90)));
        assert_eq!(DisplayRange::from_key('4'), Some(DisplayRange::All));
        assert_eq!(DisplayRange::from_key('0'), None);
        assert_eq!(DisplayRange::from_key('5'), None);
        assert_eq!(DisplayRange::from_key('x'), None);
    }

    #[test]
    fn test_cutoff_calendar_subtraction() {
        assert_eq!(
            DisplayRange::Days(7).cutoff(date(2024, 3, 3)),
            Some(date(2024, 2, 25))
        );
        assert_eq!(DisplayRange::All.cutoff(date(2024, 3, 3)), None);
    }

    #[test]
    fn test_filter_all_is_identity() {
        let s = series(&[date(2020, 1, 1), date(2024, 1, 1), date(2019, 6, 6)]);
        let kept = filter(&s, DisplayRange::All, date(2024, 1, 2));
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].observed_at, date(2020, 1, 1));
        assert_eq!(kept[2].observed_at, date(2019, 6, 6));
    }

    #[test]
    fn test_filter_days_inclusive_cutoff() {
        let today = date(2024, 1, 31);
        let s = series(&[
            date(2024, 1, 23), // before cutoff
            date(2024, 1, 24), // exactly cutoff
            date(2024, 1, 30),
        ]);
        let kept = filter(&s, DisplayRange::Days(7), today);
        let dates: Vec<NaiveDate> = kept.iter().map(|o| o.observed_at).collect();
        assert_eq!(dates, vec![date(2024, 1, 24), date(2024, 1, 30)]);
    }

    #[test]
    fn test_filter_keeps_original_order() {
        let today = date(2024, 1, 31);
        let s = series(&[date(2024, 1, 30), date(2024, 1, 25), date(2024, 1, 28)]);
        let kept = filter(&s, DisplayRange::Days(30), today);
        let dates: Vec<NaiveDate> = kept.iter().map(|o| o.observed_at).collect();
        assert_eq!(dates, vec![date(2024, 1, 30), date(2024, 1, 25), date(2024, 1, 28)]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let today = date(2024, 1, 31);
        let s = series(&[date(2023, 12, 1), date(2024, 1, 20), date(2024, 1, 29)]);
        let once: Vec<PriceObservation> = filter(&s, DisplayRange::Days(30), today)
            .into_iter()
            .cloned()
            .collect();
        let again = PriceSeries::from_observations(once.clone());
        let twice: Vec<PriceObservation> = filter(&again, DisplayRange::Days(30), today)
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(once, twice);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_filter_future_dates_kept() {
        let s = series(&[date(2025, 1, 1)]);
        assert_eq!(filter(&s, DisplayRange::Days(7), date(2024, 1, 1)).len(), 1);
    }
}
