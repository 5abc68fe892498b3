use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Value of `--timezone` that defers to the system timezone.
pub const AUTO_TIMEZONE: &str = "auto";

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Validate that `tz_name` is a recognised IANA timezone identifier.
pub fn validate_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

/// Resolve a configured timezone name.
///
/// `"auto"` uses the system timezone. Unrecognised names fall back to UTC
/// with a warning.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    let name = if tz_name.eq_ignore_ascii_case(AUTO_TIMEZONE) {
        get_system_timezone()
    } else {
        tz_name.to_string()
    };
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("unrecognised timezone \"{}\", falling back to UTC", name);
        Tz::UTC
    })
}

// ── Today ─────────────────────────────────────────────────────────────────────

/// The calendar date of `now` in `tz`.
pub fn date_in(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Today's calendar date in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    date_in(Utc::now(), tz)
}

// ── Observation dates ─────────────────────────────────────────────────────────

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a feed `price_check_date` value.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY` and RFC 3339 date-times
/// (the date portion is used). Returns `None` for anything else.
///
/// ```
/// use chrono::NaiveDate;
/// use monitor_core::time_utils::parse_observation_date;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
/// assert_eq!(parse_observation_date("2024-01-15"), expected);
/// assert_eq!(parse_observation_date("01/15/2024"), expected);
/// assert_eq!(parse_observation_date("2024-01-15T08:00:00Z"), expected);
/// assert_eq!(parse_observation_date("yesterday"), None);
/// ```
pub fn parse_observation_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Naive date-time without offset, e.g. "2024-01-15T08:00:00".
    const DATETIME_FMTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
    DATETIME_FMTS
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.date())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── validate_timezone ────────────────────────────────────────────────────

    #[test]
    fn test_validate_timezone_valid() {
        assert!(validate_timezone("America/New_York"));
        assert!(validate_timezone("Europe/London"));
        assert!(validate_timezone("UTC"));
    }

    #[test]
    fn test_validate_timezone_invalid() {
        assert!(!validate_timezone("Mars/Olympus"));
        assert!(!validate_timezone(""));
    }

    // ── resolve_timezone ─────────────────────────────────────────────────────

    #[test]
    fn test_resolve_named_timezone() {
        assert_eq!(resolve_timezone("Asia/Tokyo"), Tz::Asia__Tokyo);
    }

    #[test]
    fn test_resolve_invalid_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Invalid/Zone"), Tz::UTC);
    }

    #[test]
    fn test_resolve_auto_does_not_panic() {
        let _ = resolve_timezone("auto");
        let _ = resolve_timezone("AUTO");
    }

    // ── date_in ──────────────────────────────────────────────────────────────

    #[test]
    fn test_date_in_crosses_midnight() {
        // 2024-06-01 02:00 UTC is still May 31 in New York.
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap();
        assert_eq!(date_in(now, Tz::America__New_York), date(2024, 5, 31));
        assert_eq!(date_in(now, Tz::UTC), date(2024, 6, 1));
        // and already June 1 in Tokyo
        assert_eq!(date_in(now, Tz::Asia__Tokyo), date(2024, 6, 1));
    }

    // ── parse_observation_date ───────────────────────────────────────────────

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_observation_date("2024-02-29"), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_parse_slash_formats() {
        assert_eq!(parse_observation_date("2024/03/05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_observation_date("03/05/2024"), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_parse_rfc3339_uses_date_portion() {
        assert_eq!(
            parse_observation_date("2024-01-15T23:30:00+02:00"),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn test_parse_naive_datetime() {
        assert_eq!(
            parse_observation_date("2024-01-15T08:00:00"),
            Some(date(2024, 1, 15))
        );
        assert_eq!(
            parse_observation_date("2024-01-15 08:00:00"),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(parse_observation_date(""), None);
        assert_eq!(parse_observation_date("   "), None);
        assert_eq!(parse_observation_date("2024-02-30"), None);
        assert_eq!(parse_observation_date("not-a-date"), None);
    }

    // ── get_system_timezone ──────────────────────────────────────────────────

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        let tz = get_system_timezone();
        assert!(!tz.is_empty(), "system timezone should not be empty");
    }
}
