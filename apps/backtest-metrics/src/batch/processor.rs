//! Batch report processor using Rayon.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{Level, debug, info, span};

use crate::config::{Config, EngineConfig};
use crate::export::write_csv_file;
use crate::logging::{
    PipelineEvent, PipelineLogger, ReportClassifiedEvent, create_engine_failure_event,
    create_failure_event, create_report_parsed_event, create_snapshot_event, create_verdict_event,
};
use crate::metrics::MetricsSnapshot;
use crate::report::{Backtest, RawReport, classify};
use crate::validity::{Criteria, evaluate};

use super::config::BatchConfig;
use super::error::{BatchError, FileError};
use super::result::{BatchReport, Evaluated, FileOutcome};

/// One report to process: its file name and raw bytes, or a path to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportInput {
    /// Report already in memory.
    Bytes {
        /// File name; drives period and name tags.
        file_name: String,
        /// Raw HTML.
        bytes: Vec<u8>,
    },
    /// Report read from disk by the worker.
    Path(PathBuf),
}

impl ReportInput {
    /// File name used in logs and tags.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Bytes { file_name, .. } => file_name.clone(),
            Self::Path(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        }
    }
}

/// Runs the full pipeline for every report of a batch.
///
/// Each file is independent: a failure is captured in its [`FileOutcome`]
/// and the remaining files are still processed.
pub struct BatchProcessor {
    engine: EngineConfig,
    criteria: Criteria,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor.
    #[must_use]
    pub const fn new(engine: EngineConfig, criteria: Criteria, config: BatchConfig) -> Self {
        Self {
            engine,
            criteria,
            config,
        }
    }

    /// Create a processor from the root configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.engine.clone(),
            config.criteria.clone(),
            config.batch.clone(),
        )
    }

    /// Batch configuration.
    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Report files in the configured directory, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be listed.
    pub fn discover(&self) -> Result<Vec<PathBuf>, BatchError> {
        let dir = &self.config.reports_dir;
        let list_error = |source| BatchError::ListReports {
            path: dir.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(list_error)? {
            let path = entry.map_err(list_error)?.path();
            if path.is_file() && self.config.accepts(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        debug!(dir = %dir.display(), files = paths.len(), "Discovered reports");
        Ok(paths)
    }

    /// Process every report in the configured directory.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be listed or holds no reports.
    pub fn run_dir(&self) -> Result<BatchReport, BatchError> {
        let inputs: Vec<ReportInput> = self.discover()?.into_iter().map(ReportInput::Path).collect();
        self.run(&inputs)
    }

    /// Process `inputs`, in parallel once the batch is large enough.
    ///
    /// # Errors
    ///
    /// Returns error if there are no inputs or the thread pool cannot be built.
    #[allow(clippy::cast_possible_truncation)]
    pub fn run(&self, inputs: &[ReportInput]) -> Result<BatchReport, BatchError> {
        if inputs.is_empty() {
            return Err(BatchError::NoReports);
        }

        let start_time = Instant::now();
        info!(
            files = inputs.len(),
            pips_mode = self.engine.pips_mode,
            "Starting batch"
        );

        let results: Vec<(FileOutcome, Vec<PipelineEvent>)> =
            if inputs.len() >= self.config.min_parallel_jobs {
                self.run_parallel(inputs)?
            } else {
                inputs.iter().map(|input| self.process(input)).collect()
            };

        let (outcomes, events): (Vec<_>, Vec<_>) = results.into_iter().unzip();
        let report = BatchReport {
            outcomes,
            events: events.into_iter().flatten().collect(),
            total_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            valid = report.valid(),
            elapsed_ms = report.total_time_ms,
            "Batch complete"
        );
        Ok(report)
    }

    fn run_parallel(
        &self,
        inputs: &[ReportInput],
    ) -> Result<Vec<(FileOutcome, Vec<PipelineEvent>)>, BatchError> {
        let work = || -> Vec<_> { inputs.par_iter().map(|input| self.process(input)).collect() };

        if self.config.max_threads == 0 {
            return Ok(work());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_threads)
            .build()
            .map_err(|e| BatchError::ThreadPool {
                message: e.to_string(),
            })?;
        Ok(pool.install(work))
    }

    /// Write the export rows of `report` to the configured export path.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Export`] if the CSV cannot be written.
    pub fn export(&self, report: &BatchReport) -> Result<usize, BatchError> {
        let rows = report.export_rows(&self.config.export);
        write_csv_file(&self.config.export_path, &rows)?;
        debug!(
            path = %self.config.export_path.display(),
            rows = rows.len(),
            "Wrote export"
        );
        Ok(rows.len())
    }

    /// Run read → classify → parse → metrics → verdict for one report.
    pub fn process(&self, input: &ReportInput) -> (FileOutcome, Vec<PipelineEvent>) {
        let file = input.file_name();
        let _span = span!(Level::DEBUG, "report", file = %file).entered();
        let mut logger = PipelineLogger::new(true);

        let result = self.evaluate_input(&file, input, &mut logger);
        if let Err(err) = &result {
            let event = match err {
                FileError::Engine(e) => create_engine_failure_event(file.clone(), e),
                FileError::Read { .. } => create_failure_event(file.clone(), err, err.kind()),
            };
            logger.log(event);
        }

        let outcome = FileOutcome { file, result };
        debug!(
            file = %outcome.file,
            success = outcome.is_success(),
            valid = outcome.result.as_ref().is_ok_and(|e| e.verdict.is_valid()),
            "Processed report"
        );
        (outcome, logger.into_events())
    }

    fn evaluate_input(
        &self,
        file: &str,
        input: &ReportInput,
        logger: &mut PipelineLogger,
    ) -> Result<Evaluated, FileError> {
        let raw = match input {
            ReportInput::Bytes { bytes, .. } => RawReport::from_html(file, bytes)?,
            ReportInput::Path(path) => RawReport::from_html(file, &read_report(path)?)?,
        };

        logger.log(PipelineEvent::ReportClassified(ReportClassifiedEvent {
            file: file.to_string(),
            platform: classify(&raw),
            tables: raw.tables().len(),
        }));

        let backtest = Backtest::from_report(&raw, self.engine.deposit)?;
        logger.log(create_report_parsed_event(file, &backtest));

        let snapshot = MetricsSnapshot::compute(backtest.log(), self.engine.pips_mode);
        logger.log(create_snapshot_event(file, &snapshot));

        let verdict = evaluate(&snapshot, &self.criteria);
        logger.log(create_verdict_event(file, &verdict));

        Ok(Evaluated {
            backtest,
            snapshot,
            verdict,
        })
    }
}

fn read_report(path: &Path) -> Result<Vec<u8>, FileError> {
    std::fs::read(path).map_err(|e| FileError::Read {
        message: format!("{}: {e}", path.display()),
    })
}
