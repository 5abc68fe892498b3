//! Price table for the dashboard TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per
//! observation of the full series, in the active [`TableSort`] order,
//! starting at a scroll offset.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use monitor_core::formatting::{format_date_iso, PriceFormatter, NOT_AVAILABLE};
use monitor_core::projection::{TableRow, TableSort};

use crate::themes::Theme;

/// Column headers, left to right.
pub const COLUMNS: [&str; 5] = ["Date", "Best price", "Initial price", "Savings", "Discount"];

/// Borders plus the header line.
const CHROME_HEIGHT: u16 = 3;

/// Number of data rows that fit in a table of `area_height` rows.
pub fn visible_rows(area_height: u16) -> usize {
    area_height.saturating_sub(CHROME_HEIGHT) as usize
}

/// Largest useful scroll offset: the last page still fills the table.
pub fn max_scroll(row_count: usize, area_height: u16) -> usize {
    row_count.saturating_sub(visible_rows(area_height))
}

/// `"15%"` / `"N/A"`.
pub fn format_discount(discount: Option<i64>) -> String {
    discount
        .map(|d| format!("{}%", d))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Cell texts of one row, in [`COLUMNS`] order.
pub fn row_cells(row: &TableRow, formatter: &dyn PriceFormatter) -> [String; 5] {
    [
        format_date_iso(row.observed_at),
        formatter.format(row.best_price),
        formatter.format(row.initial_price),
        formatter.format_opt(row.savings),
        format_discount(row.discount_percent),
    ]
}

/// Render the price table into `area`.
///
/// Rows before `scroll` are skipped.  Rows whose best price equals `lowest`
/// are highlighted.
#[allow(clippy::too_many_arguments)]
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    rows: &[TableRow],
    sort: TableSort,
    scroll: usize,
    lowest: Option<i64>,
    formatter: &dyn PriceFormatter,
    theme: &Theme,
) {
    let header_cells = COLUMNS
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(scroll)
        .map(|(i, row)| {
            let style = if lowest.is_some() && row.best_price.value() == lowest {
                theme.table_highlight
            } else if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(row_cells(row, formatter).map(Cell::from)).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let title = format!(
        " Price history ({} rows, sorted by {}) ",
        rows.len(),
        sort
    );

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder when the feed yielded no observations.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No price observations found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "The feed must contain dated rows with best and initial prices.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'r' to reload or 'q' to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Price Monitor "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;
    use chrono::NaiveDate;
    use monitor_core::formatting::{FullPrice, MaskedPrice};
    use monitor_core::models::{Price, PriceObservation};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_rows() -> Vec<TableRow> {
        vec![
            TableRow::from_observation(&PriceObservation::new(
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                900,
                1200,
            )),
            TableRow::from_observation(&PriceObservation::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                12_345,
                13_000,
            )),
            TableRow::from_observation(&PriceObservation::new(
                NaiveDate::from_ymd_opt(2023, 12, 20).unwrap(),
                Price::NotANumber,
                1200,
            )),
        ]
    }

    fn render_to_string(rows: &[TableRow], scroll: usize, height: u16) -> String {
        let theme = Theme::dark();
        let backend = TestBackend::new(80, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                render_table_view(
                    f,
                    f.area(),
                    rows,
                    TableSort::DateDesc,
                    scroll,
                    Some(900),
                    &FullPrice,
                    &theme,
                )
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── row cells ────────────────────────────────────────────────────────────

    #[test]
    fn test_row_cells_full_prices() {
        let rows = make_rows();
        assert_eq!(
            row_cells(&rows[0], &FullPrice),
            ["2024-01-15", "$900", "$1,200", "$300", "25%"]
        );
    }

    #[test]
    fn test_row_cells_floor_discount() {
        // 655 / 13000 = 5.03..%
        let rows = make_rows();
        assert_eq!(row_cells(&rows[1], &FullPrice)[4], "5%");
    }

    #[test]
    fn test_row_cells_not_a_number() {
        let rows = make_rows();
        assert_eq!(
            row_cells(&rows[2], &FullPrice),
            ["2023-12-20", "N/A", "$1,200", "N/A", "N/A"]
        );
    }

    #[test]
    fn test_row_cells_masked() {
        let rows = make_rows();
        let cells = row_cells(&rows[1], &MaskedPrice);
        assert_eq!(cells[1], "$12,xxx");
        assert_eq!(cells[2], "$13,xxx");
        assert_eq!(cells[3], "$xxx");
    }

    // ── scrolling ────────────────────────────────────────────────────────────

    #[test]
    fn test_visible_and_max_scroll() {
        assert_eq!(visible_rows(10), 7);
        assert_eq!(visible_rows(2), 0);
        assert_eq!(max_scroll(20, 10), 13);
        assert_eq!(max_scroll(3, 10), 0);
    }

    // ── rendering ────────────────────────────────────────────────────────────

    #[test]
    fn test_render_table_view_smoke() {
        let content = render_to_string(&make_rows(), 0, 10);
        assert!(content.contains("Best price"));
        assert!(content.contains("2024-01-15"));
        assert!(content.contains("$12,345"));
        assert!(content.contains("sorted by date ↓"));
    }

    #[test]
    fn test_render_table_view_scrolled() {
        let content = render_to_string(&make_rows(), 1, 10);
        assert!(!content.contains("2024-01-15"));
        assert!(content.contains("2024-01-01"));
    }

    #[test]
    fn test_render_table_view_empty_rows() {
        let content = render_to_string(&[], 0, 6);
        assert!(content.contains("0 rows"));
    }

    #[test]
    fn test_render_no_data_smoke() {
        let theme = Theme::dark();
        let backend = TestBackend::new(80, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| render_no_data(f, f.area(), &theme))
            .unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("No price observations found"));
    }
}
