use crate::formatting::percentage;
use crate::models::{
    ChangeDirection, LowestPrice, PriceChange, PriceObservation, PriceSeries, StatisticsSnapshot,
    Trend, TrendDirection,
};

/// Default number of most-recent observations in the trend window.
pub const DEFAULT_TREND_WINDOW: usize = 30;

// ── StatisticsCalculator ──────────────────────────────────────────────────────

/// Stateless collection of the dashboard's statistics calculations.
pub struct StatisticsCalculator;

impl StatisticsCalculator {
    /// Derive the statistics snapshot for `series`.
    ///
    /// Returns `None` for an empty series. `trend_window` is clamped to at
    /// least 2 observations.
    pub fn calculate(series: &PriceSeries, trend_window: usize) -> Option<StatisticsSnapshot> {
        let sorted_desc = series.sorted_desc();
        let latest = sorted_desc.first()?;

        Some(StatisticsSnapshot {
            current_price: latest.best_price,
            last_update: latest.observed_at,
            change: Self::price_change(&sorted_desc),
            lowest: Self::lowest_price(series),
            trend: Self::trend(&sorted_desc, trend_window),
            observation_count: series.len(),
        })
    }

    /// Change between the first two entries of a most-recent-first view.
    pub fn price_change(sorted_desc: &[&PriceObservation]) -> Option<PriceChange> {
        let latest = sorted_desc.first()?;
        let previous = sorted_desc.get(1)?;

        let amount = difference(latest, previous);
        let percent = amount.zip(previous.best_price.value()).and_then(|(a, base)| {
            percentage(a as f64, base as f64, 1)
        });

        Some(PriceChange {
            previous_price: previous.best_price,
            previous_date: previous.observed_at,
            amount,
            percent,
            direction: ChangeDirection::from_amount(amount),
        })
    }

    /// Minimum numeric best price over the whole series, in feed order.
    ///
    /// The first minimum wins on ties; not-a-number prices are skipped.
    pub fn lowest_price(series: &PriceSeries) -> Option<LowestPrice> {
        let mut lowest: Option<LowestPrice> = None;
        for obs in series.iter() {
            let Some(price) = obs.best_price.value() else {
                continue;
            };
            match lowest {
                Some(current) if price >= current.price => {}
                _ => {
                    lowest = Some(LowestPrice {
                        price,
                        observed_at: obs.observed_at,
                    })
                }
            }
        }
        lowest
    }

    /// Trend across the most recent `min(window, len)` observations.
    ///
    /// Requires at least two observations in the window.
    pub fn trend(sorted_desc: &[&PriceObservation], window: usize) -> Option<Trend> {
        let window_size = window.max(2).min(sorted_desc.len());
        if window_size < 2 {
            return None;
        }
        let latest = sorted_desc[0];
        let oldest = sorted_desc[window_size - 1];

        let change = difference(latest, oldest);
        let percent = change
            .zip(oldest.best_price.value())
            .and_then(|(c, base)| percentage(c as f64, base as f64, 1));

        Some(Trend {
            window_size,
            oldest_price: oldest.best_price,
            oldest_date: oldest.observed_at,
            change,
            percent,
            direction: TrendDirection::from_amount(change),
        })
    }
}

/// `later.best − earlier.best`, when both are numbers and the difference
/// fits in an `i64`.
fn difference(later: &PriceObservation, earlier: &PriceObservation) -> Option<i64> {
    later
        .best_price
        .value()?
        .checked_sub(earlier.best_price.value()?)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(d: NaiveDate, best: impl Into<Price>) -> PriceObservation {
        PriceObservation::new(d, best, 1200)
    }

    /// `n` consecutive daily observations starting 2024-01-01 with the
    /// given prices.
    fn daily_series(prices: &[i64]) -> PriceSeries {
        let start = date(2024, 1, 1);
        PriceSeries::from_observations(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| obs(start + chrono::Duration::days(i as i64), p))
                .collect(),
        )
    }

    // ── calculate ───────────────────────────────────────────────────────────

    #[test]
    fn test_calculate_empty_series_is_none() {
        assert!(StatisticsCalculator::calculate(&PriceSeries::default(), 30).is_none());
    }

    #[test]
    fn test_calculate_two_observation_example() {
        let series = PriceSeries::from_observations(vec![
            obs(date(2024, 1, 1), 1000),
            obs(date(2024, 1, 15), 900),
        ]);
        let stats = StatisticsCalculator::calculate(&series, 30).unwrap();

        assert_eq!(stats.current_price, Price::Value(900));
        assert_eq!(stats.last_update, date(2024, 1, 15));

        let change = stats.change.unwrap();
        assert_eq!(change.amount, Some(-100));
        assert_eq!(change.percent, Some(-10.0));
        assert_eq!(change.direction, ChangeDirection::Favorable);

        let lowest = stats.lowest.unwrap();
        assert_eq!(lowest.price, 900);
        assert_eq!(lowest.observed_at, date(2024, 1, 15));
        assert_eq!(stats.observation_count, 2);
    }

    #[test]
    fn test_calculate_uses_latest_date_not_feed_order() {
        let series = PriceSeries::from_observations(vec![
            obs(date(2024, 1, 15), 900),
            obs(date(2024, 1, 1), 1000),
        ]);
        let stats = StatisticsCalculator::calculate(&series, 30).unwrap();
        assert_eq!(stats.current_price, Price::Value(900));
        assert_eq!(stats.change.unwrap().amount, Some(-100));
    }

    #[test]
    fn test_calculate_single_observation() {
        let series = PriceSeries::from_observations(vec![obs(date(2024, 3, 3), 750)]);
        let stats = StatisticsCalculator::calculate(&series, 30).unwrap();
        assert!(stats.change.is_none());
        assert!(stats.trend.is_none());
        assert_eq!(stats.lowest.unwrap().price, 750);
    }

    // ── price_change ────────────────────────────────────────────────────────

    #[test]
    fn test_price_change_increase_is_unfavorable() {
        let series = daily_series(&[1000, 1100]);
        let change = StatisticsCalculator::price_change(&series.sorted_desc()).unwrap();
        assert_eq!(change.amount, Some(100));
        assert_eq!(change.percent, Some(10.0));
        assert_eq!(change.direction, ChangeDirection::Unfavorable);
    }

    #[test]
    fn test_price_change_no_change() {
        let series = daily_series(&[1000, 1000]);
        let change = StatisticsCalculator::price_change(&series.sorted_desc()).unwrap();
        assert_eq!(change.amount, Some(0));
        assert_eq!(change.direction, ChangeDirection::NoChange);
    }

    #[test]
    fn test_price_change_percent_rounded_to_one_decimal() {
        // 100 / 3000 = 3.333…%
        let series = daily_series(&[3000, 3100]);
        let change = StatisticsCalculator::price_change(&series.sorted_desc()).unwrap();
        assert_eq!(change.percent, Some(3.3));
    }

    #[test]
    fn test_price_change_overflow_has_no_direction() {
        let series = daily_series(&[i64::MIN, i64::MAX]);
        let change = StatisticsCalculator::price_change(&series.sorted_desc()).unwrap();
        assert_eq!(change.amount, None);
        assert_eq!(change.percent, None);
        assert_eq!(change.direction, ChangeDirection::Unknown);

        let trend = StatisticsCalculator::trend(&series.sorted_desc(), 30).unwrap();
        assert_eq!(trend.change, None);
        assert_eq!(trend.direction, TrendDirection::Unknown);
    }

    #[test]
    fn test_price_change_previous_zero_has_no_percent() {
        let series = daily_series(&[0, 500]);
        let change = StatisticsCalculator::price_change(&series.sorted_desc()).unwrap();
        assert_eq!(change.amount, Some(500));
        assert_eq!(change.percent, None);
    }

    #[test]
    fn test_price_change_not_a_number_has_no_sign() {
        let series = PriceSeries::from_observations(vec![
            obs(date(2024, 1, 1), 1000),
            obs(date(2024, 1, 2), Price::NotANumber),
        ]);
        let change = StatisticsCalculator::price_change(&series.sorted_desc()).unwrap();
        assert_eq!(change.amount, None);
        assert_eq!(change.percent, None);
        assert_eq!(change.direction, ChangeDirection::Unknown);
    }

    // ── lowest_price ────────────────────────────────────────────────────────

    #[test]
    fn test_lowest_price_first_minimum_in_feed_order() {
        let series = PriceSeries::from_observations(vec![
            obs(date(2024, 1, 20), 800),
            obs(date(2024, 1, 5), 800),
            obs(date(2024, 1, 10), 950),
        ]);
        let lowest = StatisticsCalculator::lowest_price(&series).unwrap();
        assert_eq!(lowest.price, 800);
        assert_eq!(lowest.observed_at, date(2024, 1, 20));
    }

    #[test]
    fn test_lowest_price_skips_not_a_number() {
        let series = PriceSeries::from_observations(vec![
            obs(date(2024, 1, 1), Price::NotANumber),
            obs(date(2024, 1, 2), 1200),
            obs(date(2024, 1, 3), 1100),
        ]);
        let lowest = StatisticsCalculator::lowest_price(&series).unwrap();
        assert_eq!(lowest.price, 1100);
    }

    #[test]
    fn test_lowest_price_all_not_a_number() {
        let series = PriceSeries::from_observations(vec![obs(date(2024, 1, 1), Price::NotANumber)]);
        assert!(StatisticsCalculator::lowest_price(&series).is_none());
    }

    #[test]
    fn test_lowest_price_is_not_windowed() {
        let mut prices = vec![500];
        prices.extend(std::iter::repeat(1000).take(40));
        let series = daily_series(&prices);
        let stats = StatisticsCalculator::calculate(&series, 30).unwrap();
        assert_eq!(stats.lowest.unwrap().price, 500);
    }

    // ── trend ───────────────────────────────────────────────────────────────

    #[test]
    fn test_trend_uses_oldest_in_window() {
        // 40 daily prices: 1000, 1010, …, 1390. Window of 30 → oldest is
        // index 10 (1100), current is 1390.
        let prices: Vec<i64> = (0..40).map(|i| 1000 + i * 10).collect();
        let series = daily_series(&prices);
        let trend = StatisticsCalculator::trend(&series.sorted_desc(), 30).unwrap();

        assert_eq!(trend.window_size, 30);
        assert_eq!(trend.oldest_price, Price::Value(1100));
        assert_eq!(trend.change, Some(290));
        assert_eq!(trend.percent, Some(26.4));
        assert_eq!(trend.direction, TrendDirection::Increasing);
    }

    #[test]
    fn test_trend_short_series_uses_whole_series() {
        let series = daily_series(&[1000, 950, 900]);
        let trend = StatisticsCalculator::trend(&series.sorted_desc(), 30).unwrap();
        assert_eq!(trend.window_size, 3);
        assert_eq!(trend.change, Some(-100));
        assert_eq!(trend.percent, Some(-10.0));
        assert_eq!(trend.direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_trend_stable() {
        let series = daily_series(&[1000, 1200, 1000]);
        let trend = StatisticsCalculator::trend(&series.sorted_desc(), 30).unwrap();
        assert_eq!(trend.change, Some(0));
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_trend_requires_two_observations() {
        let series = daily_series(&[1000]);
        assert!(StatisticsCalculator::trend(&series.sorted_desc(), 30).is_none());
    }

    #[test]
    fn test_trend_window_clamped_to_two() {
        let series = daily_series(&[1000, 1100, 1200]);
        let trend = StatisticsCalculator::trend(&series.sorted_desc(), 0).unwrap();
        assert_eq!(trend.window_size, 2);
        assert_eq!(trend.change, Some(100));
    }

    #[test]
    fn test_trend_not_a_number_oldest() {
        let series = PriceSeries::from_observations(vec![
            obs(date(2024, 1, 1), Price::NotANumber),
            obs(date(2024, 1, 2), 1000),
        ]);
        let trend = StatisticsCalculator::trend(&series.sorted_desc(), 30).unwrap();
        assert_eq!(trend.change, None);
        assert_eq!(trend.direction, TrendDirection::Unknown);
    }

    #[test]
    fn test_not_a_number_does_not_break_other_statistics() {
        let series = PriceSeries::from_observations(vec![
            obs(date(2024, 1, 1), 1000),
            obs(date(2024, 1, 2), Price::NotANumber),
            obs(date(2024, 1, 3), 900),
        ]);
        let stats = StatisticsCalculator::calculate(&series, 30).unwrap();
        assert_eq!(stats.current_price, Price::Value(900));
        // previous observation is the malformed one
        assert_eq!(stats.change.unwrap().direction, ChangeDirection::Unknown);
        assert_eq!(stats.lowest.unwrap().price, 900);
        assert_eq!(stats.trend.unwrap().change, Some(-100));
    }
}
