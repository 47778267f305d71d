//! Validity evaluation of a metrics snapshot against a criteria table.
//!
//! A [`Criteria`] table maps scalar metrics to inclusive [`Bound`]s. It is an
//! ordinary value passed to [`evaluate`]; concurrent evaluations with
//! different thresholds never share state.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::{MetricName, MetricsSnapshot, Ratio};

/// Inclusive bounds; a missing side is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bound {
    /// Lower bound.
    #[serde(default)]
    pub min: Option<Decimal>,
    /// Upper bound.
    #[serde(default)]
    pub max: Option<Decimal>,
}

impl Bound {
    /// `value >= min`.
    #[must_use]
    pub const fn at_least(min: Decimal) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// `value <= max`.
    #[must_use]
    pub const fn at_most(max: Decimal) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// `min <= value <= max`.
    #[must_use]
    pub const fn between(min: Decimal, max: Decimal) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether `value` lies within the bound.
    #[must_use]
    pub fn contains(&self, value: Ratio) -> bool {
        self.min.is_none_or(|min| value.at_least(min)) && self.max.is_none_or(|max| value.at_most(max))
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: Option<Decimal>, inf: &str| v.map_or_else(|| inf.to_string(), |d| d.to_string());
        write!(f, "[{}, {}]", side(self.min, "-inf"), side(self.max, "inf"))
    }
}

/// Why a criteria table was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// Durations and best/worst operations cannot be thresholded.
    #[error("metric '{0}' is not a scalar and cannot be used as a criterion")]
    NotScalar(MetricName),

    /// `min > max`.
    #[error("criterion '{metric}' has min {min} above max {max}")]
    InvertedBound {
        /// Offending metric.
        metric: MetricName,
        /// Lower bound.
        min: Decimal,
        /// Upper bound.
        max: Decimal,
    },
}

/// Metric thresholds a backtest must meet to be considered valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<MetricName, Bound>);

impl Default for Criteria {
    /// Reference thresholds.
    fn default() -> Self {
        Self::empty()
            .with(MetricName::KRatio, Bound::at_least(dec!(0.20)))
            .with(MetricName::RecoveryFactor, Bound::at_least(dec!(8.9)))
            .with(MetricName::NumOps, Bound::at_least(dec!(250)))
            .with(MetricName::MaxExposure, Bound::between(dec!(0.0), dec!(0.22)))
            .with(MetricName::ClosingDays, Bound::at_least(dec!(100)))
    }
}

impl Criteria {
    /// Table with no criteria; every snapshot passes it.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace the bound for `metric`.
    #[must_use]
    pub fn with(mut self, metric: MetricName, bound: Bound) -> Self {
        self.0.insert(metric, bound);
        self
    }

    #[must_use]
    pub fn get(&self, metric: MetricName) -> Option<&Bound> {
        self.0.get(&metric)
    }

    /// Criteria in metric order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricName, &Bound)> {
        self.0.iter().map(|(m, b)| (*m, b))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject non-scalar keys and inverted bounds.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        for (metric, bound) in self.iter() {
            if !metric.is_scalar() {
                return Err(CriteriaError::NotScalar(metric));
            }
            if let (Some(min), Some(max)) = (bound.min, bound.max)
                && min > max
            {
                return Err(CriteriaError::InvertedBound { metric, min, max });
            }
        }
        Ok(())
    }
}

/// One criterion the snapshot did not meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionFailure {
    /// Metric checked.
    pub metric: MetricName,
    /// Bound it had to satisfy.
    pub bound: Bound,
    /// Snapshot value; `None` when the metric was undefined.
    pub actual: Option<Ratio>,
}

/// Outcome of evaluating a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Every criterion failed, in metric order. Empty when valid.
    pub failures: Vec<CriterionFailure>,
    /// Table the snapshot was judged against.
    pub criteria: Criteria,
}

impl Verdict {
    /// True iff every criterion holds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Y` or `N`, as written to the export.
    #[must_use]
    pub fn flag(&self) -> char {
        if self.is_valid() { 'Y' } else { 'N' }
    }
}

/// Check every criterion against the snapshot.
///
/// An undefined metric (k-ratio on fewer than three trades, for instance)
/// fails its criterion. Infinite ratios pass any lower bound and fail any
/// upper bound.
#[must_use]
pub fn evaluate(snapshot: &MetricsSnapshot, criteria: &Criteria) -> Verdict {
    let failures = criteria
        .iter()
        .filter_map(|(metric, bound)| {
            let actual = snapshot.get(metric).ok().and_then(|v| v.as_ratio());
            let passed = actual.is_some_and(|value| bound.contains(value));
            (!passed).then_some(CriterionFailure {
                metric,
                bound: *bound,
                actual,
            })
        })
        .collect();
    Verdict {
        failures,
        criteria: criteria.clone(),
    }
}

/// Pure predicate form of [`evaluate`].
#[must_use]
pub fn is_valid(snapshot: &MetricsSnapshot, criteria: &Criteria) -> bool {
    evaluate(snapshot, criteria).is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Direction, TradeLog, TradeRecord};
    use chrono::{NaiveDate, NaiveDateTime};
    use test_case::test_case;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn snapshot(pips: &[Decimal]) -> MetricsSnapshot {
        let records = pips
            .iter()
            .enumerate()
            .map(|(i, p)| TradeRecord {
                open_time: at(i as u32 + 1),
                close_time: at(i as u32 + 1) + chrono::TimeDelta::hours(2),
                stop_loss: Decimal::ZERO,
                take_profit: Decimal::ZERO,
                direction: Direction::Sell,
                volume: dec!(0.01),
                symbol: None,
                open_price: dec!(1.2345),
                close_price: dec!(1.2345),
                pips: *p,
                profit: *p,
                running_balance: Decimal::ZERO,
            })
            .collect();
        MetricsSnapshot::compute(&TradeLog::new(records).unwrap(), true)
    }

    #[test]
    fn test_low_recovery_factor_is_invalid() {
        // GP 50, DD -10 -> RF 5.0
        let snap = snapshot(&[dec!(10), dec!(-10), dec!(40)]);
        assert_eq!(snap.recovery_factor(), Ratio::Finite(dec!(5)));

        let verdict = evaluate(&snap, &Criteria::default());
        assert!(!verdict.is_valid());
        assert_eq!(verdict.flag(), 'N');
        assert!(
            verdict
                .failures
                .iter()
                .any(|f| f.metric == MetricName::RecoveryFactor)
        );

        // RF alone decides, even with every other default criterion removed
        let rf_only = Criteria::empty().with(MetricName::RecoveryFactor, Bound::at_least(dec!(8.9)));
        assert!(!is_valid(&snap, &rf_only));
    }

    #[test]
    fn test_relaxed_criteria_pass() {
        let snap = snapshot(&[dec!(10), dec!(-10), dec!(40)]);
        let criteria = Criteria::empty()
            .with(MetricName::RecoveryFactor, Bound::at_least(dec!(5)))
            .with(MetricName::NumOps, Bound::between(dec!(3), dec!(3)));
        let verdict = evaluate(&snap, &criteria);
        assert!(verdict.is_valid());
        assert_eq!(verdict.flag(), 'Y');
        assert_eq!(verdict.criteria, criteria);
    }

    #[test]
    fn test_infinite_ratio_meets_minimum_but_not_maximum() {
        let snap = snapshot(&[dec!(1), dec!(2), dec!(3)]);
        assert!(is_valid(
            &snap,
            &Criteria::empty().with(MetricName::ProfitFactor, Bound::at_least(dec!(100)))
        ));
        assert!(!is_valid(
            &snap,
            &Criteria::empty().with(MetricName::ProfitFactor, Bound::at_most(dec!(100)))
        ));
    }

    #[test]
    fn test_undefined_metric_fails_its_criterion() {
        let snap = snapshot(&[dec!(1), dec!(-2)]);
        let verdict = evaluate(
            &snap,
            &Criteria::empty().with(MetricName::KRatio, Bound::at_least(dec!(-100))),
        );
        assert_eq!(verdict.failures.len(), 1);
        assert_eq!(verdict.failures[0].actual, None);
    }

    #[test]
    fn test_evaluation_does_not_touch_criteria() {
        let criteria = Criteria::default();
        let before = criteria.clone();
        let _ = evaluate(&snapshot(&[dec!(1), dec!(2), dec!(3)]), &criteria);
        assert_eq!(criteria, before);
        assert_eq!(criteria.len(), 5);
    }

    #[test_case(MetricName::BestOp ; "best op")]
    #[test_case(MetricName::StagnationPeriod ; "stagnation")]
    #[test_case(MetricName::BacktestTime ; "backtest time")]
    fn test_non_scalar_criterion_is_rejected(metric: MetricName) {
        let criteria = Criteria::empty().with(metric, Bound::at_least(dec!(1)));
        assert_eq!(criteria.validate(), Err(CriteriaError::NotScalar(metric)));
    }

    #[test]
    fn test_inverted_bound_is_rejected() {
        let criteria = Criteria::empty().with(MetricName::Sqn, Bound::between(dec!(2), dec!(1)));
        assert!(matches!(
            criteria.validate(),
            Err(CriteriaError::InvertedBound { .. })
        ));
        assert_eq!(Criteria::default().validate(), Ok(()));
    }

    #[test_case(dec!(0.22), true ; "upper edge is inclusive")]
    #[test_case(dec!(0.0), true ; "lower edge is inclusive")]
    #[test_case(dec!(0.23), false ; "above max")]
    fn test_bound_edges(value: Decimal, expected: bool) {
        let bound = Bound::between(dec!(0.0), dec!(0.22));
        assert_eq!(bound.contains(Ratio::Finite(value)), expected);
    }

    #[test]
    fn test_criteria_deserialize_from_labels_and_keys() {
        let yaml = "Kratio:\n  min: 0.5\nRecovery Factor:\n  min: 2\n  max: 10\n";
        let criteria: Criteria = serde_yaml_bw::from_str(yaml).unwrap();
        assert_eq!(
            criteria.get(MetricName::RecoveryFactor),
            Some(&Bound::between(dec!(2), dec!(10)))
        );
        assert_eq!(criteria.get(MetricName::KRatio).and_then(|b| b.min), Some(dec!(0.5)));
    }
}
