//! Plain-text rendering of the statistics and price table for the
//! `summary` view.

use std::fmt::Write;

use monitor_core::formatting::{format_date_label, format_percent, PriceFormatter, NOT_AVAILABLE};
use monitor_core::models::{ChangeDirection, TrendDirection};
use monitor_core::projection::TableRow;
use monitor_runtime::session::DashboardView;
use monitor_ui::components::indicators::pad_label;
use monitor_ui::table_view::{row_cells, COLUMNS};

/// Width of each table column in the text summary.
const COLUMN_WIDTH: usize = 15;

fn change_arrow(direction: ChangeDirection) -> &'static str {
    match direction {
        ChangeDirection::Favorable => "↓ ",
        ChangeDirection::Unfavorable => "↑ ",
        ChangeDirection::NoChange => "→ ",
        ChangeDirection::Unknown => "",
    }
}

fn trend_word(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Increasing => "rising",
        TrendDirection::Decreasing => "falling",
        TrendDirection::Stable => "stable",
        TrendDirection::Unknown => NOT_AVAILABLE,
    }
}

/// Statistics block followed by the full table.
pub fn summary_text(view: &DashboardView, formatter: &dyn PriceFormatter) -> String {
    let mut out = String::new();
    let Some(stats) = view.stats.as_ref() else {
        out.push_str("No price observations.\n");
        return out;
    };

    let _ = writeln!(
        out,
        "{}{}",
        pad_label("💰", "Current price"),
        formatter.format(stats.current_price)
    );

    let change = match stats.change.as_ref() {
        Some(c) => match c.amount {
            Some(amount) => format!(
                "{}{} ({})",
                change_arrow(c.direction),
                formatter.format_change(amount),
                format_percent(c.percent)
            ),
            None => NOT_AVAILABLE.to_string(),
        },
        None => NOT_AVAILABLE.to_string(),
    };
    let _ = writeln!(out, "{}{}", pad_label("📊", "Change"), change);

    let lowest = stats
        .lowest
        .map(|l| {
            format!(
                "{} on {}",
                formatter.format_amount(l.price),
                format_date_label(l.observed_at)
            )
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let _ = writeln!(out, "{}{}", pad_label("🏷️", "Lowest price"), lowest);

    let trend = stats
        .trend
        .as_ref()
        .map(|t| {
            format!(
                "{} {} ({}) over {} observations",
                trend_word(t.direction),
                formatter.format_opt(t.change),
                format_percent(t.percent),
                t.window_size
            )
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let _ = writeln!(out, "{}{}", pad_label("📈", "Trend"), trend);

    let _ = writeln!(
        out,
        "{}{} (last {})",
        pad_label("🗓️", "Observations"),
        stats.observation_count,
        format_date_label(stats.last_update)
    );

    let _ = writeln!(out);
    out.push_str(&table_text(&view.rows, formatter));
    out
}

/// Fixed-width table, one line per row.
pub fn table_text(rows: &[TableRow], formatter: &dyn PriceFormatter) -> String {
    let mut out = String::new();
    let header: Vec<String> = COLUMNS
        .iter()
        .map(|c| format!("{:<width$}", c, width = COLUMN_WIDTH))
        .collect();
    let _ = writeln!(out, "{}", header.concat().trim_end());
    let _ = writeln!(out, "{}", "-".repeat(COLUMN_WIDTH * COLUMNS.len()));

    for row in rows {
        let cells: Vec<String> = row_cells(row, formatter)
            .iter()
            .map(|c| format!("{:<width$}", c, width = COLUMN_WIDTH))
            .collect();
        let _ = writeln!(out, "{}", cells.concat().trim_end());
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use monitor_core::formatting::{FullPrice, MaskedPrice};
    use monitor_core::projection::TableSort;
    use monitor_runtime::data::analysis::build_load;
    use monitor_runtime::session::DashboardSession;

    fn view_of(feed: &str) -> DashboardView {
        let mut session = DashboardSession::default();
        session.replace_series(build_load(feed, "test".to_string(), 0.0).unwrap());
        session.view_at(
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            TableSort::default(),
        )
    }

    #[test]
    fn test_summary_two_observations() {
        let view = view_of(
            "price_check_date,initial_price,best_price\n\
             2024-01-01,1200,1000\n\
             2024-01-15,1200,900",
        );
        let text = summary_text(&view, &FullPrice);
        assert!(text.contains("Current price"));
        assert!(text.contains("$900\n"));
        assert!(text.contains("↓ -$100 (-10.0%)"));
        assert!(text.contains("$900 on Jan 15, 2024"));
        assert!(text.contains("falling -$100 (-10.0%) over 2 observations"));
        assert!(text.contains("2 (last Jan 15, 2024)"));
        assert!(text.contains("2024-01-15     $900"));
    }

    #[test]
    fn test_summary_increase_has_plus_sign() {
        let view = view_of(
            "price_check_date,initial_price,best_price\n\
             2024-01-01,1200,900\n\
             2024-01-15,1200,1000",
        );
        let text = summary_text(&view, &FullPrice);
        let change_line = text.lines().find(|l| l.contains("Change")).unwrap();
        assert!(change_line.ends_with("↑ +$100 (+11.1%)"), "got: {change_line}");
    }

    #[test]
    fn test_summary_single_observation() {
        let view = view_of("price_check_date,initial_price,best_price\n2024-01-01,1200,1000");
        let text = summary_text(&view, &FullPrice);
        let change_line = text.lines().find(|l| l.contains("Change")).unwrap();
        assert!(change_line.ends_with("N/A"));
        let trend_line = text.lines().find(|l| l.contains("Trend")).unwrap();
        assert!(trend_line.ends_with("N/A"));
    }

    #[test]
    fn test_summary_masked() {
        let view = view_of(
            "price_check_date,initial_price,best_price\n\
             2024-01-01,13000,12345",
        );
        let text = summary_text(&view, &MaskedPrice);
        assert!(text.contains("$12,xxx"));
        assert!(!text.contains("12,345"));
    }

    #[test]
    fn test_table_text_layout() {
        let view = view_of(
            "price_check_date,initial_price,best_price\n\
             2024-01-01,1200,abc",
        );
        let text = table_text(&view.rows, &FullPrice);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date"));
        assert_eq!(lines[1].len(), COLUMN_WIDTH * COLUMNS.len());
        assert!(lines[2].starts_with("2024-01-01     N/A"));
    }
}
