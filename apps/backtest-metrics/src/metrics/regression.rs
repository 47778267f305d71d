//! K-ratio: consistency of equity growth from an OLS fit.
//!
//! The cumulative value curve is regressed on the trade index `0..n`. The
//! k-ratio is the slope divided by the standard error of the slope times the
//! number of trades:
//!
//! ```text
//! Sxx = Σ(x - x̄)²   Syy = Σ(y - ȳ)²   Sxy = Σ(x - x̄)(y - ȳ)
//! slope = Sxy / Sxx
//! error = sqrt((Syy - Sxy² / Sxx) / (n - 2)) / sqrt(Sxx)
//! k     = slope / (error · n)
//! ```

use rust_decimal::Decimal;

use super::constants::{KRATIO_MIN_TRADES, RESIDUAL_DP};
use super::math::{cumsum, mean, round_dp, round2, sqrt_decimal};
use super::types::MetricName;
use crate::error::{EngineError, Result};

/// K-ratio of a value series, rounded to two places.
///
/// Fails with [`EngineError::UndefinedMetric`] for fewer than three trades or
/// a perfectly linear curve (zero residual error).
pub fn k_ratio(values: &[Decimal]) -> Result<Decimal> {
    let n = values.len();
    if n < KRATIO_MIN_TRADES {
        return Err(EngineError::undefined(
            MetricName::KRatio.key(),
            format!("requires at least {KRATIO_MIN_TRADES} trades, got {n}"),
        ));
    }

    let y = cumsum(values);
    let x: Vec<Decimal> = (0..n as u64).map(Decimal::from).collect();
    let undefined = |reason: &str| EngineError::undefined(MetricName::KRatio.key(), reason);

    let x_mean = mean(&x).ok_or_else(|| undefined("empty index"))?;
    let y_mean = mean(&y).ok_or_else(|| undefined("empty curve"))?;

    let sxx: Decimal = x.iter().map(|xi| (*xi - x_mean) * (*xi - x_mean)).sum();
    let syy: Decimal = y.iter().map(|yi| (*yi - y_mean) * (*yi - y_mean)).sum();
    let sxy: Decimal = x
        .iter()
        .zip(&y)
        .map(|(xi, yi)| (*xi - x_mean) * (*yi - y_mean))
        .sum();

    let slope = sxy / sxx;
    // Sxy² / Sxx computed as slope · Sxy to stay in range on long logs.
    let dof = Decimal::from((n - 2) as u64);
    let residual = round_dp((syy - slope * sxy) / dof, RESIDUAL_DP).max(Decimal::ZERO);

    let error = sqrt_decimal(residual)
        .zip(sqrt_decimal(sxx))
        .map(|(r, s)| r / s)
        .ok_or_else(|| undefined("negative variance"))?;

    if error.is_zero() {
        return Err(undefined("equity curve is perfectly linear"));
    }

    Ok(round2(slope / (error * Decimal::from(n as u64))))
}
