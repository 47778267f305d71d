//! Property Tests for the Metrics Engine
//!
//! Invariants that must hold for any trade log, checked with proptest.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::TimeDelta;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use backtest_metrics::metrics::{MetricsCalculator, Ratio, Side, Streaks};
use backtest_metrics::report::{Direction, ForexPair, TradeLog, TradeRecord};

fn log_from_pips(pips: &[i64]) -> TradeLog {
    let mut balance = dec!(10000);
    let records = pips
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let open_time = common::base_time() + TimeDelta::hours(4 * i as i64);
            let profit = Decimal::new(p * 10, 0);
            balance += profit;
            TradeRecord {
                open_time,
                close_time: open_time + TimeDelta::hours(1),
                stop_loss: Decimal::ZERO,
                take_profit: Decimal::ZERO,
                direction: Direction::Buy,
                volume: dec!(0.10),
                symbol: Some(ForexPair::EurUsd),
                open_price: dec!(1.1234),
                close_price: dec!(1.1234) + Decimal::new(p, 3),
                pips: Decimal::new(p, 0),
                profit,
                running_balance: balance,
            }
        })
        .collect();
    TradeLog::new(records).unwrap()
}

fn nonzero_pips() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(
        prop_oneof![(-500_i64..=-1), (1_i64..=500)],
        1..60,
    )
}

proptest! {
    #[test]
    fn prop_series_lengths_match_log(pips in nonzero_pips()) {
        let log = log_from_pips(&pips);
        let calc = MetricsCalculator::new(&log, true);
        prop_assert_eq!(calc.drawdown_series().len(), log.len());
        prop_assert_eq!(calc.dd2_series().len(), log.len());
    }

    #[test]
    fn prop_profit_factor_is_scale_invariant(pips in nonzero_pips(), k in 2_i64..50) {
        let scaled: Vec<i64> = pips.iter().map(|p| p * k).collect();
        let base = log_from_pips(&pips);
        let big = log_from_pips(&scaled);
        prop_assert_eq!(
            MetricsCalculator::new(&base, true).profit_factor(),
            MetricsCalculator::new(&big, true).profit_factor()
        );
    }

    #[test]
    fn prop_recovery_factor_infinite_iff_no_drawdown(pips in nonzero_pips()) {
        let log = log_from_pips(&pips);
        let calc = MetricsCalculator::new(&log, true);
        prop_assert_eq!(
            calc.recovery_factor() == Ratio::Infinite,
            calc.drawdown() == Decimal::ZERO
        );
    }

    #[test]
    fn prop_win_and_loss_percentages_cover_all_trades(pips in nonzero_pips()) {
        let log = log_from_pips(&pips);
        let calc = MetricsCalculator::new(&log, true);
        let total = calc.pct_win() + calc.pct_loss();
        prop_assert!((total - dec!(100)).abs() <= dec!(0.01), "total was {}", total);
    }

    #[test]
    fn prop_closed_runs_never_exceed_side_counts(pips in nonzero_pips()) {
        let values: Vec<Decimal> = pips.iter().map(|&p| Decimal::new(p, 0)).collect();
        let streaks = Streaks::from_values(&values);
        let wins = pips.iter().filter(|&&p| p > 0).count() as u64;
        let losses = pips.len() as u64 - wins;

        prop_assert!(streaks.covered(Side::Win) <= wins);
        prop_assert!(streaks.covered(Side::Loss) <= losses);
        // The run still open at the end is never tabulated.
        prop_assert!(streaks.covered(Side::Win) + streaks.covered(Side::Loss) < pips.len() as u64);
    }
}
