//! Equity-curve derived series: two drawdown variants and stagnation periods.
//!
//! Both drawdown series have one point per trade and are built fresh from the
//! value series; the trade log is never annotated.

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;

use super::math::cumsum;

/// Cumulative value minus its running peak.
///
/// The peak starts at the first cumulative value, so the first point is
/// always zero. Every point is `<= 0`.
#[must_use]
pub fn drawdown_series(values: &[Decimal]) -> Vec<Decimal> {
    let mut peak: Option<Decimal> = None;
    cumsum(values)
        .into_iter()
        .map(|equity| {
            let p = peak.map_or(equity, |p| p.max(equity));
            peak = Some(p);
            equity - p
        })
        .collect()
}

/// Alternate drawdown: an accumulator decreased by every value and reset to
/// zero right after a losing trade.
///
/// Unlike [`drawdown_series`] a loss never carries past the reset, so the two
/// are not interchangeable.
#[must_use]
pub fn dd2_series(values: &[Decimal]) -> Vec<Decimal> {
    values
        .iter()
        .scan(Decimal::ZERO, |acc, v| {
            *acc -= *v;
            if *v < Decimal::ZERO {
                *acc = Decimal::ZERO;
            }
            Some(*acc)
        })
        .collect()
}

/// Minimum of a series, zero when empty.
#[must_use]
pub fn series_min(series: &[Decimal]) -> Decimal {
    series.iter().copied().min().unwrap_or(Decimal::ZERO)
}

/// Time between consecutive equity highs.
///
/// Highs are the trades whose drawdown is exactly zero, anchored at their
/// close time. A drawdown still open at the end of the log is not a period.
#[must_use]
pub fn stagnation_periods(drawdown: &[Decimal], close_times: &[NaiveDateTime]) -> Vec<TimeDelta> {
    let highs: Vec<NaiveDateTime> = drawdown
        .iter()
        .zip(close_times)
        .filter(|(dd, _)| dd.is_zero())
        .map(|(_, t)| *t)
        .collect();

    highs.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Longest stagnation period, zero when the curve never stalls.
#[must_use]
pub fn max_stagnation(periods: &[TimeDelta]) -> TimeDelta {
    periods.iter().copied().max().unwrap_or_else(TimeDelta::zero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 3, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn sample() -> Vec<Decimal> {
        vec![dec!(10), dec!(-5), dec!(20), dec!(-10), dec!(5)]
    }

    #[test]
    fn test_drawdown_series() {
        assert_eq!(
            drawdown_series(&sample()),
            vec![dec!(0), dec!(-5), dec!(0), dec!(-10), dec!(-5)]
        );
    }

    #[test]
    fn test_drawdown_starting_with_loss() {
        // Peak starts at the first cumulative value, not at zero.
        assert_eq!(
            drawdown_series(&[dec!(-5), dec!(-5), dec!(20)]),
            vec![dec!(0), dec!(-5), dec!(0)]
        );
    }

    #[test]
    fn test_dd2_series() {
        assert_eq!(
            dd2_series(&sample()),
            vec![dec!(-10), dec!(0), dec!(-20), dec!(0), dec!(-5)]
        );
        assert_eq!(series_min(&dd2_series(&sample())), dec!(-20));
    }

    #[test]
    fn test_stagnation_ignores_open_drawdown() {
        let dd = drawdown_series(&sample());
        let closes = [day(1), day(2), day(4), day(5), day(9)];
        let periods = stagnation_periods(&dd, &closes);
        // Highs on day 1 and day 4; the drawdown from day 5 never recovers.
        assert_eq!(periods, vec![TimeDelta::days(3)]);
        assert_eq!(max_stagnation(&periods), TimeDelta::days(3));
    }

    #[test]
    fn test_monotonic_curve_periods() {
        let dd = drawdown_series(&[dec!(1), dec!(1)]);
        let periods = stagnation_periods(&dd, &[day(1), day(3)]);
        assert_eq!(periods, vec![TimeDelta::days(2)]);
        assert_eq!(max_stagnation(&[]), TimeDelta::zero());
    }

    proptest! {
        #[test]
        fn prop_series_lengths_match_input(raw in prop::collection::vec(-1000i64..1000, 1..60)) {
            let values: Vec<Decimal> = raw.into_iter().map(Decimal::from).collect();
            prop_assert_eq!(drawdown_series(&values).len(), values.len());
            prop_assert_eq!(dd2_series(&values).len(), values.len());
            prop_assert!(drawdown_series(&values).iter().all(|d| *d <= Decimal::ZERO));
        }
    }
}
