//! Error taxonomy for the backtest metrics engine.
//!
//! Every pipeline stage (classification, parsing, metric computation) returns
//! [`EngineError`]. Errors are scoped to a single report: a batch caller is
//! expected to record the failure and move on to the next file.
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `UnrecognizedFormat` | Classifier | Input is unreadable or holds no tables |
//! | `MalformedReport` | Report parsers, pip scaler | An expected row, column or sentinel is missing |
//! | `EmptyDataset` | Report parsers | Parsing succeeded but produced zero trades |
//! | `UndefinedMetric` | Metrics engine | Unknown metric name or unmet precondition |
//!
//! Mathematically infinite results (profit factor or recovery factor with a
//! zero denominator) are not errors; they are reported as
//! [`Ratio::Infinite`](crate::metrics::Ratio::Infinite).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::Platform;

/// Crate-wide result alias.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Parsing step at which a report was found to be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStep {
    /// Locating the embedded tables of the document.
    ReadTables,
    /// Stripping the banner rows that precede the column header.
    StripBanner,
    /// Promoting the header row to column names.
    PromoteHeader,
    /// Locating the end-of-data sentinel row.
    LocateSentinel,
    /// Reading the instrument symbol from the header table.
    ReadSymbol,
    /// Grouping operation rows by order number.
    GroupOrders,
    /// Coercing cells to datetimes, decimals and directions.
    CoerceColumns,
    /// Deriving pips from price precision.
    PipScaling,
}

impl ParseStep {
    /// Stable identifier used in log fields and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReadTables => "read_tables",
            Self::StripBanner => "strip_banner",
            Self::PromoteHeader => "promote_header",
            Self::LocateSentinel => "locate_sentinel",
            Self::ReadSymbol => "read_symbol",
            Self::GroupOrders => "group_orders",
            Self::CoerceColumns => "coerce_columns",
            Self::PipScaling => "pip_scaling",
        }
    }
}

impl fmt::Display for ParseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the backtest metrics engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The classifier could not identify the report's platform.
    #[error("Unrecognized report format for '{file}': {reason}")]
    UnrecognizedFormat {
        /// Report file name.
        file: String,
        /// Why classification failed.
        reason: String,
    },

    /// An expected row, column or sentinel was missing while parsing.
    #[error("Malformed {platform} report at step '{step}': {message}")]
    MalformedReport {
        /// Platform whose parser failed.
        platform: Platform,
        /// Step that failed.
        step: ParseStep,
        /// Details.
        message: String,
    },

    /// The report parsed cleanly but contained no trades.
    #[error("Report '{file}' contains no trades")]
    EmptyDataset {
        /// Report file name.
        file: String,
    },

    /// A metric was requested that is unknown or whose precondition is unmet.
    #[error("Metric '{metric}' is undefined: {reason}")]
    UndefinedMetric {
        /// Requested metric name.
        metric: String,
        /// Why it cannot be produced.
        reason: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::MalformedReport`].
    pub fn malformed(platform: Platform, step: ParseStep, message: impl Into<String>) -> Self {
        Self::MalformedReport {
            platform,
            step,
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::UndefinedMetric`].
    pub fn undefined(metric: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UndefinedMetric {
            metric: metric.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used as a log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnrecognizedFormat { .. } => "UNRECOGNIZED_FORMAT",
            Self::MalformedReport { .. } => "MALFORMED_REPORT",
            Self::EmptyDataset { .. } => "EMPTY_DATASET",
            Self::UndefinedMetric { .. } => "UNDEFINED_METRIC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_platform_and_step() {
        let err = EngineError::malformed(
            Platform::Genbox,
            ParseStep::LocateSentinel,
            "row 'Closed P/L:' not found",
        );
        let msg = err.to_string();
        assert!(msg.contains("GENBOX"));
        assert!(msg.contains("locate_sentinel"));
        assert_eq!(err.kind(), "MALFORMED_REPORT");
    }

    #[test]
    fn test_undefined_metric_kind() {
        let err = EngineError::undefined("Kratio", "requires at least 3 trades");
        assert_eq!(err.kind(), "UNDEFINED_METRIC");
        assert!(err.to_string().contains("Kratio"));
    }
}
