//! Win/loss streak analysis.
//!
//! Values are mapped to a sign (`> 0` wins, everything else loses) and the
//! sign sequence is split into runs. A run is recorded only when the sign
//! changes, so a run still open at the end of the log is never counted.

use rust_decimal::Decimal;
use serde::Serialize;

use super::math::round2;
use super::types::StreakTable;

/// Outcome side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Value strictly positive.
    Win,
    /// Zero or negative value.
    Loss,
}

impl Side {
    fn of(value: Decimal) -> Self {
        if value > Decimal::ZERO { Self::Win } else { Self::Loss }
    }
}

/// Run-length frequency tables for both sides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Streaks {
    /// Closed winning runs.
    pub winning: StreakTable,
    /// Closed losing runs.
    pub losing: StreakTable,
}

impl Streaks {
    /// Tabulate closed runs of `values`.
    #[must_use]
    pub fn from_values(values: &[Decimal]) -> Self {
        let sides: Vec<Side> = values.iter().copied().map(Side::of).collect();
        let mut streaks = Self::default();
        let mut run = 1_u64;

        for pair in sides.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev == next {
                run += 1;
            } else {
                *streaks.table_mut(prev).entry(run).or_insert(0) += 1;
                run = 1;
            }
        }
        streaks
    }

    fn table_mut(&mut self, side: Side) -> &mut StreakTable {
        match side {
            Side::Win => &mut self.winning,
            Side::Loss => &mut self.losing,
        }
    }

    /// Table for one side.
    #[must_use]
    pub const fn table(&self, side: Side) -> &StreakTable {
        match side {
            Side::Win => &self.winning,
            Side::Loss => &self.losing,
        }
    }

    /// Longest closed run, zero when none closed.
    #[must_use]
    pub fn max(&self, side: Side) -> u64 {
        self.table(side).keys().next_back().copied().unwrap_or(0)
    }

    /// Frequency-weighted mean run length, zero when none closed.
    #[must_use]
    pub fn average(&self, side: Side) -> Decimal {
        let table = self.table(side);
        let runs: u64 = table.values().sum();
        if runs == 0 {
            return Decimal::ZERO;
        }
        let weighted: u64 = table.iter().map(|(len, freq)| len * freq).sum();
        round2(Decimal::from(weighted) / Decimal::from(runs))
    }

    /// Sum of closed run lengths.
    #[must_use]
    pub fn covered(&self, side: Side) -> u64 {
        self.table(side).iter().map(|(len, freq)| len * freq).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn values(raw: &[i64]) -> Vec<Decimal> {
        raw.iter().copied().map(Decimal::from).collect()
    }

    #[test]
    fn test_trailing_run_is_not_recorded() {
        let s = Streaks::from_values(&values(&[10, -5, 20, -10, 5]));
        assert_eq!(s.winning, StreakTable::from([(1, 2)]));
        assert_eq!(s.losing, StreakTable::from([(1, 2)]));
        assert_eq!(s.max(Side::Win), 1);
        assert_eq!(s.max(Side::Loss), 1);
    }

    #[test]
    fn test_runs_and_average() {
        // W W W L L W L W W (final W W is open)
        let s = Streaks::from_values(&values(&[1, 1, 1, -1, -1, 1, -1, 1, 1]));
        assert_eq!(s.winning, StreakTable::from([(1, 1), (3, 1)]));
        assert_eq!(s.losing, StreakTable::from([(1, 1), (2, 1)]));
        assert_eq!(s.average(Side::Win), dec!(2));
        assert_eq!(s.average(Side::Loss), dec!(1.5));
    }

    #[test]
    fn test_zero_counts_as_loss() {
        let s = Streaks::from_values(&values(&[0, 0, 5]));
        assert_eq!(s.losing, StreakTable::from([(2, 1)]));
        assert!(s.winning.is_empty());
    }

    #[test]
    fn test_single_run_records_nothing() {
        let s = Streaks::from_values(&values(&[3, 4, 5]));
        assert!(s.winning.is_empty() && s.losing.is_empty());
        assert_eq!(s.max(Side::Win), 0);
        assert_eq!(s.average(Side::Win), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_closed_runs_never_exceed_side_counts(raw in prop::collection::vec(-50i64..50, 1..80)) {
            let vals = values(&raw);
            let s = Streaks::from_values(&vals);
            let wins = vals.iter().filter(|v| **v > Decimal::ZERO).count() as u64;
            let losses = vals.len() as u64 - wins;
            prop_assert!(s.covered(Side::Win) <= wins);
            prop_assert!(s.covered(Side::Loss) <= losses);
        }
    }
}
