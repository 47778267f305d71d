//! Performance metrics over a canonical trade log.
//!
//! Implements the metric set used to judge a backtest:
//! - Profit factor and recovery factor (possibly infinite)
//! - Expectancy, gross profit and gross loss
//! - Two drawdown variants and the longest stagnation period
//! - Win/loss streak tables, exposure and time in market
//! - SQN, a Sharpe-like ratio and the k-ratio of the equity curve
//!
//! Every metric can be computed in pips or in account currency.

mod calculator;
mod constants;
mod exposure;
mod format;
mod math;
mod regression;
mod series;
mod streaks;
mod types;

pub use calculator::{MetricsCalculator, MetricsSnapshot, TradeDurations, metric_values};
pub use exposure::{DurationStats, Exposure, duration_stats, exposures, max_exposure, time_in_market};
pub use format::{format_decimal, format_duration, format_optional, format_ratio};
pub use regression::k_ratio;
pub use series::{dd2_series, drawdown_series, max_stagnation, stagnation_periods};
pub use streaks::{Side, Streaks};
pub use types::{MetricName, MetricValue, Operation, Ratio, StreakTable, TimeInMarket};
