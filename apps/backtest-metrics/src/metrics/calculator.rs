//! Metrics calculator and the immutable snapshot it produces.

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use super::constants::{HUNDRED, SQN_MIN_TRADES, TEN};
use super::exposure::{DurationStats, duration_stats, max_exposure, time_in_market};
use super::math::{mean, round_dp, round2, sqrt_decimal, std_dev};
use super::regression::k_ratio;
use super::series::{dd2_series, drawdown_series, max_stagnation, series_min, stagnation_periods};
use super::streaks::{Side, Streaks};
use super::types::{
    MetricName, MetricValue, Operation, Ratio, StreakTable, TimeInMarket, serialize_delta,
};
use crate::error::{EngineError, Result};
use crate::report::{TradeLog, TradeRecord};

/// Values the metrics run on: pips in pips mode, profit otherwise.
#[must_use]
pub fn metric_values(log: &TradeLog, pips_mode: bool) -> Vec<Decimal> {
    log.iter()
        .map(|r| if pips_mode { r.pips } else { r.profit })
        .collect()
}

/// Calculator over one trade log in one mode.
///
/// Every metric is available individually; [`MetricsCalculator::calculate`]
/// computes them all into a [`MetricsSnapshot`]. The trade log is only read.
#[derive(Debug)]
pub struct MetricsCalculator<'a> {
    log: &'a TradeLog,
    pips_mode: bool,
    values: Vec<Decimal>,
}

impl<'a> MetricsCalculator<'a> {
    /// Create a calculator for `log`.
    #[must_use]
    pub fn new(log: &'a TradeLog, pips_mode: bool) -> Self {
        Self {
            log,
            pips_mode,
            values: metric_values(log, pips_mode),
        }
    }

    /// Value series the metrics are computed on.
    #[must_use]
    pub fn values(&self) -> &[Decimal] {
        &self.values
    }

    fn records(&self) -> &[TradeRecord] {
        self.log.records()
    }

    /// Sum of winning values.
    #[must_use]
    pub fn gross_profit(&self) -> Decimal {
        round2(self.values.iter().filter(|v| **v > Decimal::ZERO).sum())
    }

    /// Sum of losing values (negative).
    #[must_use]
    pub fn gross_loss(&self) -> Decimal {
        round2(self.values.iter().filter(|v| **v < Decimal::ZERO).sum())
    }

    /// Gross profit over gross loss magnitude.
    #[must_use]
    pub fn profit_factor(&self) -> Ratio {
        let profit: Decimal = self.values.iter().filter(|v| **v > Decimal::ZERO).sum();
        let loss: Decimal = self.values.iter().filter(|v| **v < Decimal::ZERO).sum();
        if loss.is_zero() {
            Ratio::Infinite
        } else {
            Ratio::Finite(round2(profit / loss.abs()))
        }
    }

    /// Mean value per trade.
    #[must_use]
    pub fn expectancy(&self) -> Decimal {
        mean(&self.values).map_or(Decimal::ZERO, round2)
    }

    /// Drawdown series (cumulative value minus running peak).
    #[must_use]
    pub fn drawdown_series(&self) -> Vec<Decimal> {
        drawdown_series(&self.values)
    }

    /// Minimum of the drawdown series.
    #[must_use]
    pub fn drawdown(&self) -> Decimal {
        round2(series_min(&self.drawdown_series()))
    }

    /// Alternate drawdown series, reset after each loss.
    #[must_use]
    pub fn dd2_series(&self) -> Vec<Decimal> {
        dd2_series(&self.values)
    }

    /// Minimum of the alternate drawdown series.
    #[must_use]
    pub fn drawdown_v2(&self) -> Decimal {
        round2(series_min(&self.dd2_series()))
    }

    /// Every stagnation period, in curve order.
    #[must_use]
    pub fn stagnation_periods(&self) -> Vec<TimeDelta> {
        let closes: Vec<NaiveDateTime> = self.records().iter().map(|r| r.close_time).collect();
        stagnation_periods(&self.drawdown_series(), &closes)
    }

    /// Gross profit over drawdown magnitude.
    #[must_use]
    pub fn recovery_factor(&self) -> Ratio {
        let dd = self.drawdown();
        if dd.is_zero() {
            Ratio::Infinite
        } else {
            Ratio::Finite(round2(self.gross_profit() / dd.abs()))
        }
    }

    /// Closed run-length tables.
    #[must_use]
    pub fn streaks(&self) -> Streaks {
        Streaks::from_values(&self.values)
    }

    /// Percentage of trades with a positive value.
    #[must_use]
    pub fn pct_win(&self) -> Decimal {
        let wins = Decimal::from(self.win_ops());
        round2(wins * HUNDRED / Decimal::from(self.log.len() as u64))
    }

    /// Complement of [`Self::pct_win`].
    #[must_use]
    pub fn pct_loss(&self) -> Decimal {
        round2(HUNDRED - self.pct_win())
    }

    /// Number of winning trades.
    #[must_use]
    pub fn win_ops(&self) -> u64 {
        self.values.iter().filter(|v| **v > Decimal::ZERO).count() as u64
    }

    /// Distinct calendar dates among close times.
    #[must_use]
    pub fn closing_days(&self) -> u64 {
        let days: HashSet<_> = self.records().iter().map(|r| r.close_time.date()).collect();
        days.len() as u64
    }

    /// System quality number: mean / (std / sqrt(n)).
    pub fn sqn(&self) -> Result<Decimal> {
        let n = self.values.len();
        if n < SQN_MIN_TRADES {
            return Err(EngineError::undefined(
                MetricName::Sqn.key(),
                format!("requires at least {SQN_MIN_TRADES} trades, got {n}"),
            ));
        }
        let undefined = |reason: &str| EngineError::undefined(MetricName::Sqn.key(), reason);
        let avg = mean(&self.values).ok_or_else(|| undefined("empty series"))?;
        let std = std_dev(&self.values).ok_or_else(|| undefined("no deviation"))?;
        if std.is_zero() {
            return Err(undefined("every trade has the same value"));
        }
        let root_n = sqrt_decimal(Decimal::from(n as u64)).ok_or_else(|| undefined("bad n"))?;
        Ok(round2(avg / (std / root_n)))
    }

    /// SQN scaled by sqrt(n). Not an annualized Sharpe ratio.
    pub fn sharpe(&self) -> Result<Decimal> {
        let sqn = self.sqn().map_err(|_| {
            EngineError::undefined(MetricName::Sharpe.key(), "SQN is undefined for this log")
        })?;
        let root_n = sqrt_decimal(Decimal::from(self.values.len() as u64)).unwrap_or(Decimal::ONE);
        Ok(round2(sqn * root_n))
    }

    /// Best trade. Pips mode scales the magnitude by ten.
    #[must_use]
    pub fn best_operation(&self) -> Operation {
        let factor = if self.pips_mode { TEN } else { Decimal::ONE };
        self.extreme(factor, |candidate, current| candidate > current)
    }

    /// Worst trade. Money mode scales the magnitude by ten.
    #[must_use]
    pub fn worst_operation(&self) -> Operation {
        let factor = if self.pips_mode { Decimal::ONE } else { TEN };
        self.extreme(factor, |candidate, current| candidate < current)
    }

    /// First trade that wins `better` against every other, scaled.
    fn extreme(&self, factor: Decimal, better: fn(Decimal, Decimal) -> bool) -> Operation {
        let mut idx = 0;
        for (i, v) in self.values.iter().enumerate().skip(1) {
            if better(*v, self.values[idx]) {
                idx = i;
            }
        }
        Operation {
            magnitude: round2(self.values[idx] * factor),
            close_time: self.records()[idx].close_time,
        }
    }

    /// Mean winning value, rounded to a whole number.
    pub fn avg_win(&self) -> Result<Decimal> {
        self.side_mean(MetricName::AvgWin, |v| v > Decimal::ZERO)
    }

    /// Mean losing value, rounded to a whole number.
    pub fn avg_loss(&self) -> Result<Decimal> {
        self.side_mean(MetricName::AvgLoss, |v| v < Decimal::ZERO)
    }

    fn side_mean(&self, name: MetricName, keep: fn(Decimal) -> bool) -> Result<Decimal> {
        let side: Vec<Decimal> = self.values.iter().copied().filter(|v| keep(*v)).collect();
        mean(&side)
            .map(|m| round_dp(m, 0))
            .ok_or_else(|| EngineError::undefined(name.key(), "no trades on this side"))
    }

    /// Largest lot size.
    #[must_use]
    pub fn max_lots(&self) -> Decimal {
        round2(self.records().iter().map(|r| r.volume).max().unwrap_or_default())
    }

    /// Smallest lot size.
    #[must_use]
    pub fn min_lots(&self) -> Decimal {
        round2(self.records().iter().map(|r| r.volume).min().unwrap_or_default())
    }

    /// Overlap-corrected time in market.
    #[must_use]
    pub fn time_in_market(&self) -> TimeInMarket {
        TimeInMarket::from_delta(time_in_market(self.records()))
    }

    /// Last close minus first open, in report order.
    #[must_use]
    pub fn backtest_time(&self) -> TimeDelta {
        self.log.last().close_time - self.log.first().open_time
    }

    /// K-ratio of the cumulative curve.
    pub fn k_ratio(&self) -> Result<Decimal> {
        k_ratio(&self.values)
    }

    /// Compute every metric.
    #[must_use]
    pub fn calculate(&self) -> MetricsSnapshot {
        let streaks = self.streaks();
        let exposure = max_exposure(self.records());
        let stagnation = self.stagnation_periods();

        MetricsSnapshot {
            pips_mode: self.pips_mode,
            num_ops: self.log.len() as u64,
            win_ops: self.win_ops(),
            profit_factor: self.profit_factor(),
            expectancy: self.expectancy(),
            drawdown: self.drawdown(),
            stagnation_period: max_stagnation(&stagnation),
            drawdown_v2: self.drawdown_v2(),
            max_exposure: round2(exposure.volume),
            max_exposure_ops: exposure.count,
            max_losing_streak: streaks.max(Side::Loss),
            max_winning_streak: streaks.max(Side::Win),
            avg_losing_streak: streaks.average(Side::Loss),
            avg_winning_streak: streaks.average(Side::Win),
            max_lots: self.max_lots(),
            min_lots: self.min_lots(),
            time_in_market: self.time_in_market(),
            pct_win: self.pct_win(),
            pct_loss: self.pct_loss(),
            closing_days: self.closing_days(),
            sqn: self.sqn().ok(),
            sharpe: self.sharpe().ok(),
            best_op: self.best_operation(),
            worst_op: self.worst_operation(),
            avg_win: self.avg_win().ok(),
            avg_loss: self.avg_loss().ok(),
            backtest_time: self.backtest_time(),
            gross_profit: self.gross_profit(),
            gross_loss: self.gross_loss(),
            kratio: self.k_ratio().ok(),
            recovery_factor: self.recovery_factor(),
            durations: duration_stats(self.records()).into(),
            winning_streaks: streaks.winning,
            losing_streaks: streaks.losing,
        }
    }
}

/// Duration statistics as stored on the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeDurations {
    /// Mean trade duration.
    #[serde(serialize_with = "serialize_delta")]
    pub average: TimeDelta,
    /// Longest trade.
    #[serde(serialize_with = "serialize_delta")]
    pub longest: TimeDelta,
    /// Shortest trade.
    #[serde(serialize_with = "serialize_delta")]
    pub shortest: TimeDelta,
}

impl From<DurationStats> for TradeDurations {
    fn from(stats: DurationStats) -> Self {
        Self {
            average: stats.average,
            longest: stats.longest,
            shortest: stats.shortest,
        }
    }
}

/// Every metric for one (trade log, mode) pair.
///
/// Metrics whose precondition failed (k-ratio, SQN, Sharpe, average win or
/// loss) are absent; [`MetricsSnapshot::get`] reports them as undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pips_mode: bool,
    num_ops: u64,
    win_ops: u64,
    profit_factor: Ratio,
    expectancy: Decimal,
    drawdown: Decimal,
    #[serde(serialize_with = "serialize_delta")]
    stagnation_period: TimeDelta,
    drawdown_v2: Decimal,
    max_exposure: Decimal,
    max_exposure_ops: u64,
    max_losing_streak: u64,
    max_winning_streak: u64,
    avg_losing_streak: Decimal,
    avg_winning_streak: Decimal,
    max_lots: Decimal,
    min_lots: Decimal,
    time_in_market: TimeInMarket,
    pct_win: Decimal,
    pct_loss: Decimal,
    closing_days: u64,
    sqn: Option<Decimal>,
    sharpe: Option<Decimal>,
    best_op: Operation,
    worst_op: Operation,
    avg_win: Option<Decimal>,
    avg_loss: Option<Decimal>,
    #[serde(serialize_with = "serialize_delta")]
    backtest_time: TimeDelta,
    gross_profit: Decimal,
    gross_loss: Decimal,
    kratio: Option<Decimal>,
    recovery_factor: Ratio,
    durations: TradeDurations,
    winning_streaks: StreakTable,
    losing_streaks: StreakTable,
}

impl MetricsSnapshot {
    /// Compute the snapshot for `log` in the given mode.
    #[must_use]
    pub fn compute(log: &TradeLog, pips_mode: bool) -> Self {
        MetricsCalculator::new(log, pips_mode).calculate()
    }

    /// Whether values were pips (`true`) or account currency (`false`).
    #[must_use]
    pub const fn pips_mode(&self) -> bool {
        self.pips_mode
    }

    /// Value of one metric.
    pub fn get(&self, name: MetricName) -> Result<MetricValue> {
        let undefined = |v: Option<Decimal>| {
            v.map(MetricValue::Decimal).ok_or_else(|| {
                EngineError::undefined(name.key(), "precondition not met for this trade log")
            })
        };

        Ok(match name {
            MetricName::ProfitFactor => MetricValue::Ratio(self.profit_factor),
            MetricName::Expectancy => MetricValue::Decimal(self.expectancy),
            MetricName::Drawdown => MetricValue::Decimal(self.drawdown),
            MetricName::StagnationPeriod => MetricValue::Duration(self.stagnation_period),
            MetricName::DrawdownV2 => MetricValue::Decimal(self.drawdown_v2),
            MetricName::MaxExposure => MetricValue::Decimal(self.max_exposure),
            MetricName::MaxExposureOps => MetricValue::Integer(self.max_exposure_ops),
            MetricName::MaxLosingStreak => MetricValue::Integer(self.max_losing_streak),
            MetricName::MaxWinningStreak => MetricValue::Integer(self.max_winning_streak),
            MetricName::AvgLosingStreak => MetricValue::Decimal(self.avg_losing_streak),
            MetricName::AvgWinningStreak => MetricValue::Decimal(self.avg_winning_streak),
            MetricName::MaxLots => MetricValue::Decimal(self.max_lots),
            MetricName::MinLots => MetricValue::Decimal(self.min_lots),
            MetricName::TimeInMarket => MetricValue::TimeInMarket(self.time_in_market),
            MetricName::PctWin => MetricValue::Decimal(self.pct_win),
            MetricName::PctLoss => MetricValue::Decimal(self.pct_loss),
            MetricName::ClosingDays => MetricValue::Integer(self.closing_days),
            MetricName::Sqn => undefined(self.sqn)?,
            MetricName::Sharpe => undefined(self.sharpe)?,
            MetricName::BestOp => MetricValue::Operation(self.best_op),
            MetricName::WorstOp => MetricValue::Operation(self.worst_op),
            MetricName::AvgWin => undefined(self.avg_win)?,
            MetricName::AvgLoss => undefined(self.avg_loss)?,
            MetricName::BacktestTime => MetricValue::Duration(self.backtest_time),
            MetricName::GrossProfit => MetricValue::Decimal(self.gross_profit),
            MetricName::GrossLoss => MetricValue::Decimal(self.gross_loss),
            MetricName::KRatio => undefined(self.kratio)?,
            MetricName::RecoveryFactor => MetricValue::Ratio(self.recovery_factor),
            MetricName::NumOps => MetricValue::Integer(self.num_ops),
            MetricName::WinOps => MetricValue::Integer(self.win_ops),
        })
    }

    /// Value of a metric looked up by key or long-form label.
    pub fn get_by_name(&self, name: &str) -> Result<MetricValue> {
        self.get(name.parse()?)
    }

    /// Values of `names`, in the requested order.
    pub fn select(&self, names: &[MetricName]) -> Result<Vec<(MetricName, MetricValue)>> {
        names.iter().map(|n| Ok((*n, self.get(*n)?))).collect()
    }

    /// Every metric in snapshot order; undefined metrics carry their error.
    #[must_use]
    pub fn entries(&self) -> Vec<(MetricName, Result<MetricValue>)> {
        MetricName::ALL.iter().map(|n| (*n, self.get(*n))).collect()
    }

    /// Pretty JSON of the snapshot.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// |average win / average loss|; infinite when there is no average loss.
    #[must_use]
    pub fn win_loss_ratio(&self) -> Ratio {
        match self.avg_loss {
            Some(loss) if !loss.is_zero() => {
                let win = self.avg_win.unwrap_or(Decimal::ZERO);
                Ratio::Finite(round2((win / loss).abs()))
            }
            _ => Ratio::Infinite,
        }
    }

    /// Time in market (to the minute) as a percentage of the backtest time.
    ///
    /// `None` when the backtest spans no time.
    #[must_use]
    pub fn pct_time_in_market(&self) -> Option<Decimal> {
        let span = self.backtest_time.num_seconds();
        if span <= 0 {
            return None;
        }
        let in_market = Decimal::from(self.time_in_market.to_minutes().num_seconds());
        Some(round2(in_market / Decimal::from(span) * HUNDRED))
    }

    #[must_use]
    pub const fn num_ops(&self) -> u64 {
        self.num_ops
    }

    #[must_use]
    pub const fn win_ops(&self) -> u64 {
        self.win_ops
    }

    #[must_use]
    pub const fn profit_factor(&self) -> Ratio {
        self.profit_factor
    }

    #[must_use]
    pub const fn recovery_factor(&self) -> Ratio {
        self.recovery_factor
    }

    #[must_use]
    pub const fn expectancy(&self) -> Decimal {
        self.expectancy
    }

    #[must_use]
    pub const fn drawdown(&self) -> Decimal {
        self.drawdown
    }

    #[must_use]
    pub const fn drawdown_v2(&self) -> Decimal {
        self.drawdown_v2
    }

    #[must_use]
    pub const fn gross_profit(&self) -> Decimal {
        self.gross_profit
    }

    #[must_use]
    pub const fn gross_loss(&self) -> Decimal {
        self.gross_loss
    }

    #[must_use]
    pub const fn pct_win(&self) -> Decimal {
        self.pct_win
    }

    #[must_use]
    pub const fn pct_loss(&self) -> Decimal {
        self.pct_loss
    }

    #[must_use]
    pub const fn kratio(&self) -> Option<Decimal> {
        self.kratio
    }

    #[must_use]
    pub const fn sqn(&self) -> Option<Decimal> {
        self.sqn
    }

    #[must_use]
    pub const fn avg_win(&self) -> Option<Decimal> {
        self.avg_win
    }

    #[must_use]
    pub const fn avg_loss(&self) -> Option<Decimal> {
        self.avg_loss
    }

    #[must_use]
    pub const fn best_op(&self) -> Operation {
        self.best_op
    }

    #[must_use]
    pub const fn worst_op(&self) -> Operation {
        self.worst_op
    }

    #[must_use]
    pub const fn max_winning_streak(&self) -> u64 {
        self.max_winning_streak
    }

    #[must_use]
    pub const fn max_losing_streak(&self) -> u64 {
        self.max_losing_streak
    }

    #[must_use]
    pub const fn max_exposure(&self) -> Decimal {
        self.max_exposure
    }

    #[must_use]
    pub const fn closing_days(&self) -> u64 {
        self.closing_days
    }

    #[must_use]
    pub const fn durations(&self) -> TradeDurations {
        self.durations
    }

    /// Closed winning runs.
    #[must_use]
    pub const fn winning_streaks(&self) -> &StreakTable {
        &self.winning_streaks
    }

    /// Closed losing runs.
    #[must_use]
    pub const fn losing_streaks(&self) -> &StreakTable {
        &self.losing_streaks
    }
}
