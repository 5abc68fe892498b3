//! Line chart of best and initial prices for the selected display range.

use monitor_core::formatting::PriceFormatter;
use monitor_core::projection::ChartSeries;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use crate::themes::Theme;

/// Y-axis bounds with a little headroom so lines do not touch the border.
///
/// A flat series gets a band of ±1 around its single value.
pub fn y_bounds(chart: &ChartSeries) -> Option<[f64; 2]> {
    let (lo, hi) = chart.price_bounds()?;
    let (lo, hi) = (lo as f64, hi as f64);
    let pad = ((hi - lo) * 0.05).max(1.0);
    Some([lo - pad, hi + pad])
}

/// X-axis bounds: the index range of the series.
pub fn x_bounds(chart: &ChartSeries) -> [f64; 2] {
    [0.0, chart.len().saturating_sub(1).max(1) as f64]
}

/// First, middle and last date labels.
pub fn x_labels(chart: &ChartSeries) -> Vec<String> {
    match chart.labels.len() {
        0 => Vec::new(),
        1 | 2 => chart.labels.clone(),
        n => vec![
            chart.labels[0].clone(),
            chart.labels[n / 2].clone(),
            chart.labels[n - 1].clone(),
        ],
    }
}

/// Render the price chart into `area`.
///
/// `title` carries the range label, e.g. `"Last 30 days"`.
pub fn render_chart_view(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    chart: &ChartSeries,
    formatter: &dyn PriceFormatter,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.card_border)
        .title(Span::styled(format!(" {} ", title), theme.card_title));

    let Some([y_lo, y_hi]) = y_bounds(chart) else {
        render_empty_chart(frame, area, block, theme);
        return;
    };

    let best = ChartSeries::points(&chart.best_prices);
    let initial = ChartSeries::points(&chart.initial_prices);

    let datasets = vec![
        Dataset::default()
            .name("Best price")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_best)
            .data(&best),
        Dataset::default()
            .name("Initial price")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_initial)
            .data(&initial),
    ];

    let axis_style: Style = theme.chart_axis;
    let x_axis = Axis::default()
        .style(axis_style)
        .bounds(x_bounds(chart))
        .labels(x_labels(chart).into_iter().map(|l| Span::styled(l, axis_style)));

    // Prices are rounded to whole amounts by the formatter.
    let y_axis = Axis::default()
        .style(axis_style)
        .bounds([y_lo, y_hi])
        .labels([
            Span::styled(formatter.format_amount(y_lo.round() as i64), axis_style),
            Span::styled(formatter.format_amount(y_hi.round() as i64), axis_style),
        ]);

    frame.render_widget(
        Chart::new(datasets)
            .block(block)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2))),
        area,
    );
}

fn render_empty_chart(frame: &mut Frame, area: Rect, block: Block<'_>, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No observations in this range", theme.dim)),
        Line::from(Span::styled("Press 4 to show all time", theme.dim)),
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
