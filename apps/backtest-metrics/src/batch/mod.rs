//! Batch processing of report files using Rayon.
//!
//! Every report runs the same independent pipeline:
//! read → classify → parse → metrics → verdict. Failures are captured per
//! file and never abort the rest of the batch.
//!
//! # Thread Pool Configuration
//!
//! With `max_threads = 0` the global Rayon pool is used. Any other value
//! builds a dedicated pool of that size for the batch. Batches smaller than
//! `min_parallel_jobs` run sequentially.
//!
//! # Example
//!
//! ```ignore
//! use backtest_metrics::batch::BatchProcessor;
//! use backtest_metrics::config::load_config;
//!
//! let config = load_config(None)?;
//! let processor = BatchProcessor::from_config(&config);
//! let report = processor.run_dir()?;
//! let rows = report.export_rows(&config.batch.export);
//! ```

mod config;
mod error;
mod processor;
mod result;

pub use config::{BatchConfig, ExportDefaults};
pub use error::{BatchError, FileError};
pub use processor::{BatchProcessor, ReportInput};
pub use result::{BatchReport, Evaluated, FileOutcome};
