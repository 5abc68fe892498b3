//! Full-screen dashboard composition for the Price Monitor TUI.
//!
//! Stacks the header, the four stat cards, the price chart and the price
//! table, with a key-hint footer.  Also renders the loading and failure
//! screens shown around a feed load.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use monitor_core::formatting::PriceFormatter;
use monitor_runtime::session::DashboardView;

use crate::chart_view::render_chart_view;
use crate::components::header::Header;
use crate::components::indicators::stat_cards;
use crate::table_view::render_table_view;
use crate::themes::Theme;

/// Everything the dashboard needs besides the formatter and theme.
#[derive(Debug, Clone)]
pub struct DashboardScreen<'a> {
    pub view: &'a DashboardView,
    /// Feed URL or file path shown under the title.
    pub source: &'a str,
    pub timezone: &'a str,
    /// First table row to show.
    pub scroll: usize,
    /// One-off message such as an export result.
    pub status: Option<&'a str>,
}

/// Screen regions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub header: Rect,
    pub cards: [Rect; 4],
    pub chart: Rect,
    pub table: Rect,
    pub footer: Rect,
}

const HEADER_HEIGHT: u16 = 4;
const CARD_HEIGHT: u16 = 4;

/// Split `area` into dashboard regions.
pub fn dashboard_layout(area: Rect) -> DashboardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(CARD_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[1]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    DashboardLayout {
        header: rows[0],
        cards: [cards[0], cards[1], cards[2], cards[3]],
        chart: body[0],
        table: body[1],
        footer: rows[3],
    }
}

/// Footer line: key hints, then the status message if any.
pub fn footer_line<'a>(status: Option<&'a str>, theme: &Theme) -> Line<'a> {
    let mut spans = vec![Span::styled(
        "1-4 range  s sort  m mask  e export  r reload  ↑/↓ scroll  q quit",
        theme.dim,
    )];
    if let Some(message) = status {
        spans.push(Span::styled("  │  ", theme.separator));
        spans.push(Span::styled(message, theme.info));
    }
    Line::from(spans)
}

/// Render the whole dashboard into `area`.
pub fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    screen: &DashboardScreen<'_>,
    formatter: &dyn PriceFormatter,
    theme: &Theme,
) {
    let layout = dashboard_layout(area);
    let view = screen.view;
    let range_label = view.range.label();

    let header = Header::new(
        &range_label,
        screen.timezone,
        view.stats.as_ref().map(|s| s.last_update),
        screen.source,
        theme,
    )
    .with_load(view.load.as_ref());
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), layout.header);

    if let Some(stats) = view.stats.as_ref() {
        for (card, area) in stat_cards(stats, formatter, theme).iter().zip(layout.cards) {
            card.render(frame, area);
        }
    }

    let chart_title = format!("{} ({} observations)", range_label, view.visible_count);
    render_chart_view(frame, layout.chart, &chart_title, &view.chart, formatter, theme);

    let lowest = view.stats.as_ref().and_then(|s| s.lowest).map(|l| l.price);
    render_table_view(
        frame,
        layout.table,
        &view.rows,
        view.sort,
        screen.scroll,
        lowest,
        formatter,
        theme,
    );

    frame.render_widget(
        Paragraph::new(footer_line(screen.status, theme)),
        layout.footer,
    );
}

/// Shown while the feed is being fetched.
pub fn render_loading(frame: &mut Frame, area: Rect, source: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Loading price history...", theme.info)),
        Line::from(""),
        Line::from(Span::styled(source.to_string(), theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    let paragraph = Paragraph::new(Text::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Price Monitor "),
    );
    frame.render_widget(paragraph, area);
}

/// Shown when a load failed; the user can retry with `r`.
pub fn render_load_failed(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Failed to load price history", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled("Press 'r' to retry or 'q' to exit", theme.dim)),
    ];
    let paragraph = Paragraph::new(Text::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.error)
            .title(" Price Monitor "),
    );
    frame.render_widget(paragraph, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
