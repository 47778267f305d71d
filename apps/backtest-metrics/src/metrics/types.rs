//! Core types for backtest metrics.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use super::format::format_duration;
use crate::error::EngineError;

/// A ratio whose denominator may be zero.
///
/// Profit factor with no losing trades and recovery factor with no drawdown
/// are mathematically infinite; that is a valid result, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    /// Finite value.
    Finite(Decimal),
    /// Zero denominator.
    Infinite,
}

impl Ratio {
    /// Finite value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<Decimal> {
        match self {
            Self::Finite(v) => Some(*v),
            Self::Infinite => None,
        }
    }

    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// `self >= min`. Infinity satisfies every lower bound.
    #[must_use]
    pub fn at_least(&self, min: Decimal) -> bool {
        match self {
            Self::Finite(v) => *v >= min,
            Self::Infinite => true,
        }
    }

    /// `self <= max`. Infinity exceeds every finite upper bound.
    #[must_use]
    pub fn at_most(&self, max: Decimal) -> bool {
        match self {
            Self::Finite(v) => *v <= max,
            Self::Infinite => false,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:.2}"),
            Self::Infinite => f.write_str("inf"),
        }
    }
}

/// Extreme operation: magnitude and the close time of the trade that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Scaled, rounded value.
    pub magnitude: Decimal,
    /// Close timestamp of the trade.
    pub close_time: NaiveDateTime,
}

/// Aggregate time spent with at least one open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[allow(missing_docs)]
pub struct TimeInMarket {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeInMarket {
    /// Decompose a non-negative duration into days, hours, minutes and seconds.
    #[must_use]
    pub fn from_delta(delta: TimeDelta) -> Self {
        let total = delta.num_seconds().max(0);
        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }

    /// Whole duration.
    #[must_use]
    pub fn total(&self) -> TimeDelta {
        TimeDelta::seconds(self.whole_minutes_seconds() + self.seconds)
    }

    /// Duration without the seconds component.
    #[must_use]
    pub fn to_minutes(&self) -> TimeDelta {
        TimeDelta::seconds(self.whole_minutes_seconds())
    }

    const fn whole_minutes_seconds(&self) -> i64 {
        self.days * SECONDS_PER_DAY + self.hours * SECONDS_PER_HOUR + self.minutes * SECONDS_PER_MINUTE
    }
}

impl fmt::Display for TimeInMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.total()))
    }
}

/// Run length → number of runs of that length.
pub type StreakTable = BTreeMap<u64, u64>;

/// Every metric the engine computes, keyed by its snapshot name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum MetricName {
    ProfitFactor,
    Expectancy,
    Drawdown,
    StagnationPeriod,
    DrawdownV2,
    MaxExposure,
    MaxExposureOps,
    MaxLosingStreak,
    MaxWinningStreak,
    AvgLosingStreak,
    AvgWinningStreak,
    MaxLots,
    MinLots,
    TimeInMarket,
    PctWin,
    PctLoss,
    ClosingDays,
    Sqn,
    Sharpe,
    BestOp,
    WorstOp,
    AvgWin,
    AvgLoss,
    BacktestTime,
    GrossProfit,
    GrossLoss,
    KRatio,
    RecoveryFactor,
    NumOps,
    WinOps,
}

impl MetricName {
    /// Every metric, in snapshot order.
    pub const ALL: [Self; 30] = [
        Self::ProfitFactor,
        Self::Expectancy,
        Self::Drawdown,
        Self::StagnationPeriod,
        Self::DrawdownV2,
        Self::MaxExposure,
        Self::MaxExposureOps,
        Self::MaxLosingStreak,
        Self::MaxWinningStreak,
        Self::AvgLosingStreak,
        Self::AvgWinningStreak,
        Self::MaxLots,
        Self::MinLots,
        Self::TimeInMarket,
        Self::PctWin,
        Self::PctLoss,
        Self::ClosingDays,
        Self::Sqn,
        Self::Sharpe,
        Self::BestOp,
        Self::WorstOp,
        Self::AvgWin,
        Self::AvgLoss,
        Self::BacktestTime,
        Self::GrossProfit,
        Self::GrossLoss,
        Self::KRatio,
        Self::RecoveryFactor,
        Self::NumOps,
        Self::WinOps,
    ];

    /// Snapshot key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::ProfitFactor => "PF",
            Self::Expectancy => "EP",
            Self::Drawdown => "DD",
            Self::StagnationPeriod => "Stagnation Period",
            Self::DrawdownV2 => "DD2",
            Self::MaxExposure => "Max. Exposure",
            Self::MaxExposureOps => "Max. Exposure Ops",
            Self::MaxLosingStreak => "Max. Losing Strike",
            Self::MaxWinningStreak => "Max. Winning Strike",
            Self::AvgLosingStreak => "Avg. Losing Strike",
            Self::AvgWinningStreak => "Avg. Winning Strike",
            Self::MaxLots => "Max. Lots",
            Self::MinLots => "Min. Lots",
            Self::TimeInMarket => "Time in Market",
            Self::PctWin => "Pct. Win",
            Self::PctLoss => "Pct. Loss",
            Self::ClosingDays => "Closing Days",
            Self::Sqn => "SQN",
            Self::Sharpe => "Sharpe",
            Self::BestOp => "Best Op",
            Self::WorstOp => "Worst Op",
            Self::AvgWin => "Avg Win",
            Self::AvgLoss => "Avg Loss",
            Self::BacktestTime => "Backtest Time",
            Self::GrossProfit => "Gross Profit",
            Self::GrossLoss => "Gross Loss",
            Self::KRatio => "Kratio",
            Self::RecoveryFactor => "RF",
            Self::NumOps => "Num Ops",
            Self::WinOps => "Win Ops",
        }
    }

    /// Long-form label accepted as an alias.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ProfitFactor => "Profit Factor",
            Self::Expectancy => "Expectancy",
            Self::Drawdown => "Drawdown",
            Self::StagnationPeriod => "Stagnation Periods",
            Self::DrawdownV2 => "Drawdown-v2",
            Self::MaxExposure => "Exposure",
            Self::MaxExposureOps => "Exposure Ops",
            Self::MaxLosingStreak => "Max. Losing Streak",
            Self::MaxWinningStreak => "Max. Winning Streak",
            Self::AvgLosingStreak => "Avg. Losing Streak",
            Self::AvgWinningStreak => "Avg. Winning Streak",
            Self::MaxLots => "Max Lot Size",
            Self::MinLots => "Min Lot Size",
            Self::TimeInMarket => "Time in Market",
            Self::PctWin => "Percent Winners",
            Self::PctLoss => "Percent Losers",
            Self::ClosingDays => "Closing Days",
            Self::Sqn => "System Quality Number",
            Self::Sharpe => "Sharpe-like Ratio",
            Self::BestOp => "Best Operation",
            Self::WorstOp => "Worst Operation",
            Self::AvgWin => "Average Win",
            Self::AvgLoss => "Average Loss",
            Self::BacktestTime => "Total Backtest Duration",
            Self::GrossProfit => "Gross Profit",
            Self::GrossLoss => "Gross Loss",
            Self::KRatio => "K-ratio",
            Self::RecoveryFactor => "Recovery Factor",
            Self::NumOps => "Number of Operations",
            Self::WinOps => "Winning Operations",
        }
    }

    /// Whether the metric is a single number a threshold can be applied to.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Self::StagnationPeriod
                | Self::TimeInMarket
                | Self::BestOp
                | Self::WorstOp
                | Self::BacktestTime
        )
    }
}

impl FromStr for MetricName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.key() == wanted || m.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::undefined(wanted, "not a recognized metric"))
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for MetricName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for MetricName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Value of one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Fixed-point number, already rounded.
    Decimal(Decimal),
    /// Ratio that may be infinite.
    Ratio(Ratio),
    /// Count.
    Integer(u64),
    /// Time span.
    Duration(#[serde(serialize_with = "serialize_delta")] TimeDelta),
    /// Days/hours/minutes/seconds breakdown.
    TimeInMarket(TimeInMarket),
    /// Extreme trade and when it closed.
    Operation(Operation),
}

impl MetricValue {
    /// Numeric view used for threshold checks; `None` for durations and pairs.
    #[must_use]
    pub fn as_ratio(&self) -> Option<Ratio> {
        match self {
            Self::Decimal(v) => Some(Ratio::Finite(*v)),
            Self::Ratio(r) => Some(*r),
            Self::Integer(n) => Some(Ratio::Finite(Decimal::from(*n))),
            Self::Duration(_) | Self::TimeInMarket(_) | Self::Operation(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal(v) => write!(f, "{v:.2}"),
            Self::Ratio(r) => r.fmt(f),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Duration(d) => f.write_str(&format_duration(*d)),
            Self::TimeInMarket(t) => t.fmt(f),
            Self::Operation(op) => write!(f, "{:.2} @ {}", op.magnitude, op.close_time),
        }
    }
}

/// Serialize a [`TimeDelta`] in its display form.
pub fn serialize_delta<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*delta))
}
