use crate::themes::Theme;
use chrono::NaiveDate;
use monitor_core::formatting::format_date_label;
use monitor_runtime::session::LoadInfo;
use ratatui::text::{Line, Span};

/// Decorative marks placed either side of the application title.
pub const TITLE_MARKS: &str = "◆ ◇ ◆";

/// Width of the `=` separator under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Application title with decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. `[ range | timezone | updated <date> ]`.
/// 4. The feed source, dimmed, followed by when and how fast it loaded.
pub struct Header<'a> {
    /// Display range label (e.g. "Last 30 days").
    pub range_label: &'a str,
    /// Timezone used to compute "today".
    pub timezone: &'a str,
    /// Date of the newest observation, if any data is loaded.
    pub last_update: Option<NaiveDate>,
    /// Where the feed comes from (URL or file path).
    pub source: &'a str,
    /// Outcome of the load that produced the shown series.
    pub load: Option<&'a LoadInfo>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        range_label: &'a str,
        timezone: &'a str,
        last_update: Option<NaiveDate>,
        source: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            range_label,
            timezone,
            last_update,
            source,
            load: None,
            theme,
        }
    }

    pub fn with_load(mut self, load: Option<&'a LoadInfo>) -> Self {
        self.load = load;
        self
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let updated = self
            .last_update
            .map(format_date_label)
            .unwrap_or_else(|| "never".to_string());

        vec![
            Line::from(vec![
                Span::styled(TITLE_MARKS, self.theme.header_accent),
                Span::styled(" PRICE HISTORY MONITOR ", self.theme.header),
                Span::styled(TITLE_MARKS, self.theme.header_accent),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.range_label.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone.to_lowercase(), self.theme.value),
                Span::styled(" | updated ", self.theme.label),
                Span::styled(updated, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            self.feed_line(),
        ]
    }

    /// `feed: <source>  │  loaded 14:03:27 in 0.4s, 2 rows dropped`.
    fn feed_line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled("feed: ", self.theme.dim),
            Span::styled(self.source, self.theme.dim),
        ];
        if let Some(load) = self.load {
            spans.push(Span::styled("  │  ", self.theme.separator));
            spans.push(Span::styled(
                format!(
                    "loaded {} in {:.1}s",
                    load.loaded_at.format("%H:%M:%S"),
                    load.fetch_seconds
                ),
                self.theme.dim,
            ));
            if load.rows_dropped > 0 {
                let noun = if load.rows_dropped == 1 { "row" } else { "rows" };
                spans.push(Span::styled(
                    format!(", {} {} dropped", load.rows_dropped, noun),
                    self.theme.warning,
                ));
            }
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn header_lines(last_update: Option<NaiveDate>) -> Vec<String> {
        header_lines_with(last_update, None)
    }

    fn header_lines_with(last_update: Option<NaiveDate>, load: Option<&LoadInfo>) -> Vec<String> {
        let theme = Theme::dark();
        Header::new("Last 30 days", "Europe/Berlin", last_update, "prices.csv", &theme)
            .with_load(load)
            .to_lines()
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_header_line_count() {
        assert_eq!(header_lines(None).len(), 4);
    }

    #[test]
    fn test_header_title() {
        let title = header_lines(None)[0].clone();
        assert!(title.contains("PRICE HISTORY MONITOR"), "got: {title}");
        assert!(title.starts_with(TITLE_MARKS));
        assert!(title.ends_with(TITLE_MARKS));
    }

    #[test]
    fn test_header_separator() {
        let sep = header_lines(None)[1].clone();
        assert_eq!(sep.chars().count(), SEPARATOR_WIDTH);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let info = header_lines(Some(date))[2].clone();
        assert_eq!(info, "[ last 30 days | europe/berlin | updated Jan 15, 2024 ]");
    }

    #[test]
    fn test_header_without_data_says_never() {
        let info = header_lines(None)[2].clone();
        assert!(info.contains("updated never"), "got: {info}");
    }

    #[test]
    fn test_header_feed_line() {
        let feed = header_lines(None)[3].clone();
        assert_eq!(feed, "feed: prices.csv");
    }

    #[test]
    fn test_header_feed_line_with_load() {
        let load = LoadInfo {
            loaded_at: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(14, 3, 27)
                .unwrap(),
            fetch_seconds: 0.42,
            rows_dropped: 2,
        };
        let feed = header_lines_with(None, Some(&load))[3].clone();
        assert_eq!(feed, "feed: prices.csv  │  loaded 14:03:27 in 0.4s, 2 rows dropped");

        let clean = LoadInfo {
            rows_dropped: 0,
            ..load
        };
        let feed = header_lines_with(None, Some(&clean))[3].clone();
        assert!(feed.ends_with("in 0.4s"), "got: {feed}");
    }
}
