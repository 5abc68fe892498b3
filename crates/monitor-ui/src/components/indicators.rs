use crate::themes::Theme;
use monitor_core::formatting::{format_date_label, format_percent, PriceFormatter, NOT_AVAILABLE};
use monitor_core::models::{ChangeDirection, PriceChange, StatisticsSnapshot, Trend, TrendDirection};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

/// Column at which values start in labelled text rows.
pub const LABEL_WIDTH: usize = 24;

/// Pad `"<icon> <label>"` to [`LABEL_WIDTH`] display columns.
///
/// Icons are measured by their terminal width, so emoji and box symbols line
/// up the same way.  At least one space always follows the label.
pub fn pad_label(icon: &str, label: &str) -> String {
    let content = format!("{} {}", icon, label);
    let width = UnicodeWidthStr::width(content.as_str());
    let padding = LABEL_WIDTH.saturating_sub(width).max(1);
    format!("{}{}", content, " ".repeat(padding))
}

// ── ChangeIndicator ───────────────────────────────────────────────────────────

/// Day-over-day change: arrow, signed amount and percentage.
///
/// | Direction   | Arrow |
/// |-------------|-------|
/// | Favorable   | ↓     |
/// | Unfavorable | ↑     |
/// | NoChange    | →     |
pub struct ChangeIndicator<'a> {
    /// `None` with fewer than two observations.
    pub change: Option<&'a PriceChange>,
    pub formatter: &'a dyn PriceFormatter,
    pub theme: &'a Theme,
}

impl<'a> ChangeIndicator<'a> {
    pub fn new(
        change: Option<&'a PriceChange>,
        formatter: &'a dyn PriceFormatter,
        theme: &'a Theme,
    ) -> Self {
        Self {
            change,
            formatter,
            theme,
        }
    }

    pub fn direction(&self) -> ChangeDirection {
        self.change
            .map(|c| c.direction)
            .unwrap_or(ChangeDirection::Unknown)
    }

    pub fn arrow(&self) -> &'static str {
        match self.direction() {
            ChangeDirection::Favorable => "↓",
            ChangeDirection::Unfavorable => "↑",
            ChangeDirection::NoChange => "→",
            ChangeDirection::Unknown => "",
        }
    }

    /// Format: `"↓ -$100 (-10.0%)"`, or `"N/A"` when not computable.
    pub fn to_line(&self) -> Line<'a> {
        let style = self.theme.change_style(self.direction());
        match self.change.and_then(|c| c.amount.map(|a| (a, c.percent))) {
            Some((amount, percent)) => Line::from(vec![
                Span::styled(format!("{} ", self.arrow()), style),
                Span::styled(self.formatter.format_change(amount), style),
                Span::styled(format!(" ({})", format_percent(percent)), style),
            ]),
            None => Line::from(Span::styled(NOT_AVAILABLE, self.theme.neutral)),
        }
    }
}

// ── TrendIndicator ────────────────────────────────────────────────────────────

/// Rolling-window trend with the window size it was computed over.
pub struct TrendIndicator<'a> {
    pub trend: Option<&'a Trend>,
    pub formatter: &'a dyn PriceFormatter,
    pub theme: &'a Theme,
}

impl<'a> TrendIndicator<'a> {
    pub fn new(
        trend: Option<&'a Trend>,
        formatter: &'a dyn PriceFormatter,
        theme: &'a Theme,
    ) -> Self {
        Self {
            trend,
            formatter,
            theme,
        }
    }

    pub fn direction(&self) -> TrendDirection {
        self.trend
            .map(|t| t.direction)
            .unwrap_or(TrendDirection::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self.direction() {
            TrendDirection::Increasing => "↗ rising",
            TrendDirection::Decreasing => "↘ falling",
            TrendDirection::Stable => "→ stable",
            TrendDirection::Unknown => NOT_AVAILABLE,
        }
    }

    /// Format: `"↘ falling"`.
    pub fn to_line(&self) -> Line<'a> {
        Line::from(Span::styled(
            self.label(),
            self.theme.trend_style(self.direction()),
        ))
    }

    /// Format: `"-$200 (-16.7%) over 30"`.
    pub fn detail_line(&self) -> Line<'a> {
        let style = self.theme.trend_style(self.direction());
        match self.trend {
            Some(t) => Line::from(vec![
                Span::styled(self.formatter.format_opt(t.change), style),
                Span::styled(format!(" ({})", format_percent(t.percent)), style),
                Span::styled(format!(" over {}", t.window_size), self.theme.dim),
            ]),
            None => Line::from(Span::styled("needs 2+ observations", self.theme.dim)),
        }
    }
}

// ── StatCard ──────────────────────────────────────────────────────────────────

/// A bordered card with a headline value and one detail line.
pub struct StatCard<'a> {
    pub title: &'static str,
    pub value: Line<'a>,
    pub detail: Line<'a>,
    pub theme: &'a Theme,
}

impl<'a> StatCard<'a> {
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![self.value.clone(), self.detail.clone()]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.card_border)
            .title(Span::styled(format!(" {} ", self.title), self.theme.card_title));
        frame.render_widget(
            Paragraph::new(Text::from(self.to_lines()))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
    }
}

fn value_line<'a>(text: String, style: Style) -> Line<'a> {
    Line::from(Span::styled(text, style))
}

/// The four dashboard cards: current price, lowest price, trend and count.
pub fn stat_cards<'a>(
    stats: &'a StatisticsSnapshot,
    formatter: &'a dyn PriceFormatter,
    theme: &'a Theme,
) -> [StatCard<'a>; 4] {
    let current = StatCard {
        title: "Current price",
        value: value_line(formatter.format(stats.current_price), theme.value),
        detail: ChangeIndicator::new(stats.change.as_ref(), formatter, theme).to_line(),
        theme,
    };

    let lowest = match stats.lowest {
        Some(low) => StatCard {
            title: "Lowest price",
            value: value_line(formatter.format_amount(low.price), theme.favorable),
            detail: value_line(format!("on {}", format_date_label(low.observed_at)), theme.dim),
            theme,
        },
        None => StatCard {
            title: "Lowest price",
            value: value_line(NOT_AVAILABLE.to_string(), theme.neutral),
            detail: value_line("no numeric prices".to_string(), theme.dim),
            theme,
        },
    };

    let trend_indicator = TrendIndicator::new(stats.trend.as_ref(), formatter, theme);
    let trend = StatCard {
        title: "Trend",
        value: trend_indicator.to_line(),
        detail: trend_indicator.detail_line(),
        theme,
    };

    let count = StatCard {
        title: "Observations",
        value: value_line(stats.observation_count.to_string(), theme.value),
        detail: value_line(
            format!("last {}", format_date_label(stats.last_update)),
            theme.dim,
        ),
        theme,
    };

    [current, lowest, trend, count]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
