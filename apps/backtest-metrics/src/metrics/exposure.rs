//! Interval-based metrics: exposure, time in market and trade durations.

use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::report::TradeRecord;

/// Trades contained in one trade's interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Exposure {
    /// Number of contained trades, including the trade itself.
    pub count: u64,
    /// Total volume of the contained trades.
    pub volume: Decimal,
}

/// For each trade, the trades whose `[open, close]` interval lies inside its own
/// (inclusive on both ends).
#[must_use]
pub fn exposures(records: &[TradeRecord]) -> Vec<Exposure> {
    records
        .iter()
        .map(|outer| {
            records
                .iter()
                .filter(|inner| {
                    inner.open_time >= outer.open_time && inner.close_time <= outer.close_time
                })
                .fold(Exposure::default(), |acc, inner| Exposure {
                    count: acc.count + 1,
                    volume: acc.volume + inner.volume,
                })
        })
        .collect()
}

/// Maximum contained count and maximum contained volume, taken independently.
#[must_use]
pub fn max_exposure(records: &[TradeRecord]) -> Exposure {
    exposures(records)
        .into_iter()
        .fold(Exposure::default(), |acc, e| Exposure {
            count: acc.count.max(e.count),
            volume: acc.volume.max(e.volume),
        })
}

/// Total time with a position open, in report order.
///
/// A trade that opens before the previous one closed adds only the gap
/// between the two close times. The gap is negative when the trade sits
/// inside the previous one, and it is subtracted as is.
#[must_use]
pub fn time_in_market(records: &[TradeRecord]) -> TimeDelta {
    let Some(first) = records.first() else {
        return TimeDelta::zero();
    };

    records
        .windows(2)
        .fold(first.duration(), |total, pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let added = if cur.open_time < prev.close_time {
                cur.close_time - prev.close_time
            } else {
                cur.duration()
            };
            total + added
        })
}

/// Mean, longest and shortest trade duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStats {
    /// Mean duration, truncated to whole seconds.
    pub average: TimeDelta,
    pub longest: TimeDelta,
    pub shortest: TimeDelta,
}

/// Duration statistics over every trade.
#[must_use]
pub fn duration_stats(records: &[TradeRecord]) -> DurationStats {
    let durations: Vec<TimeDelta> = records.iter().map(TradeRecord::duration).collect();
    let total_seconds: i64 = durations.iter().map(TimeDelta::num_seconds).sum();
    let count = i64::try_from(durations.len()).unwrap_or(i64::MAX).max(1);

    DurationStats {
        average: TimeDelta::seconds(total_seconds / count),
        longest: durations.iter().copied().max().unwrap_or_else(TimeDelta::zero),
        shortest: durations.iter().copied().min().unwrap_or_else(TimeDelta::zero),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Direction;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 5, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn trade(open: u32, close: u32, volume: Decimal) -> TradeRecord {
        TradeRecord {
            open_time: at(open),
            close_time: at(close),
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
            direction: Direction::Buy,
            volume,
            symbol: None,
            open_price: dec!(1.1234),
            close_price: dec!(1.1244),
            pips: dec!(1),
            profit: dec!(10),
            running_balance: dec!(10010),
        }
    }

    #[test]
    fn test_nested_trades_are_contained() {
        let records = [
            trade(1, 10, dec!(0.10)),
            trade(2, 5, dec!(0.05)),
            trade(3, 4, dec!(0.02)),
            trade(9, 12, dec!(0.30)),
        ];
        let exp = exposures(&records);
        assert_eq!(exp[0].count, 3);
        assert_eq!(exp[0].volume, dec!(0.17));
        assert_eq!(exp[3].count, 1);
        let max = max_exposure(&records);
        assert_eq!(max.count, 3);
        assert_eq!(max.volume, dec!(0.30));
    }

    #[test]
    fn test_time_in_market_overlap_correction() {
        // 1-5 full (4h), 3-7 overlaps: +2h, 8-9 disjoint: +1h
        let records = [
            trade(1, 5, dec!(0.1)),
            trade(3, 7, dec!(0.1)),
            trade(8, 9, dec!(0.1)),
        ];
        assert_eq!(time_in_market(&records), TimeDelta::hours(7));
    }

    #[test]
    fn test_time_in_market_contained_trade_subtracts_close_gap() {
        // 0-10 full (10h), 1-5 inside it: 5 - 10 = -5h
        let records = [trade(0, 10, dec!(0.1)), trade(1, 5, dec!(0.1))];
        assert_eq!(time_in_market(&records), TimeDelta::hours(5));
    }

    #[test]
    fn test_time_in_market_resumes_after_contained_trade() {
        // 0-10 (10h), 1-5 (-5h), 12-14 disjoint (+2h)
        let records = [
            trade(0, 10, dec!(0.1)),
            trade(1, 5, dec!(0.1)),
            trade(12, 14, dec!(0.1)),
        ];
        assert_eq!(time_in_market(&records), TimeDelta::hours(7));
    }

    #[test]
    fn test_duration_stats() {
        let records = [trade(1, 2, dec!(0.1)), trade(3, 7, dec!(0.1))];
        let stats = duration_stats(&records);
        assert_eq!(stats.average, TimeDelta::minutes(150));
        assert_eq!(stats.longest, TimeDelta::hours(4));
        assert_eq!(stats.shortest, TimeDelta::hours(1));
    }
}
