//! Decimal constants for metric calculations.

use rust_decimal::Decimal;

pub const TWO: Decimal = Decimal::TWO;
pub const TEN: Decimal = Decimal::TEN;
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 14); // 1e-14

/// Decimal places of reported metrics.
pub const REPORT_DP: u32 = 2;

/// Decimal places kept on the k-ratio residual variance before the square root.
pub const RESIDUAL_DP: u32 = 8;

/// Minimum trades for the k-ratio regression (two degrees of freedom).
pub const KRATIO_MIN_TRADES: usize = 3;

/// Minimum trades for a sample standard deviation.
pub const SQN_MIN_TRADES: usize = 2;

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;
