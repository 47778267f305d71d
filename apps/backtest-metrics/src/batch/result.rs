//! Result types for batch report processing.

use crate::export::{ExportContext, ExportRow};
use crate::logging::PipelineEvent;
use crate::metrics::MetricsSnapshot;
use crate::report::Backtest;
use crate::validity::Verdict;

use super::config::ExportDefaults;
use super::error::FileError;

/// A report that made it through the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluated {
    /// Parsed report.
    pub backtest: Backtest,
    /// Metrics in the configured mode.
    pub snapshot: MetricsSnapshot,
    /// Criteria outcome.
    pub verdict: Verdict,
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Report file name.
    pub file: String,
    /// Evaluation or the error that stopped it.
    pub result: Result<Evaluated, FileError>,
}

impl FileOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a batch run. Outcomes keep input order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One outcome per input file.
    pub outcomes: Vec<FileOutcome>,
    /// Pipeline events, grouped by file in input order.
    pub events: Vec<PipelineEvent>,
    /// Total execution time in milliseconds.
    pub total_time_ms: u64,
}

impl BatchReport {
    /// Number of files that produced a verdict.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Number of valid backtests.
    #[must_use]
    pub fn valid(&self) -> usize {
        self.evaluated().filter(|e| e.verdict.is_valid()).count()
    }

    /// Successful evaluations, in input order.
    pub fn evaluated(&self) -> impl Iterator<Item = &Evaluated> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Failed files with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FileError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.file.as_str(), e)))
    }

    /// Export rows for the successful evaluations, numbered from 1.
    #[must_use]
    pub fn export_rows(&self, defaults: &ExportDefaults) -> Vec<ExportRow> {
        self.evaluated()
            .enumerate()
            .map(|(i, e)| {
                let seq = i as u64 + 1;
                let ctx = ExportContext {
                    seq,
                    timeframe: defaults.timeframe,
                    exploration: defaults.exploration.clone(),
                    optimization: defaults.optimization,
                    set_number: seq,
                };
                ExportRow::build(&ctx, &e.backtest, &e.snapshot, &e.verdict)
            })
            .collect()
    }
}
