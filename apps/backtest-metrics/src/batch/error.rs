//! Error types for batch report processing.

use thiserror::Error;

use crate::error::EngineError;

/// Errors that abort a whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Reports directory could not be listed.
    #[error("Failed to list reports in '{path}': {source}")]
    ListReports {
        /// Directory path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Thread pool initialization failed.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message.
        message: String,
    },

    /// No reports to process.
    #[error("No report files found")]
    NoReports,

    /// Export CSV could not be written.
    #[error("Failed to write export: {0}")]
    Export(#[from] csv::Error),
}

/// Why one file produced no result. Never aborts the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileError {
    /// The file could not be read.
    #[error("Failed to read report: {message}")]
    Read {
        /// Error message.
        message: String,
    },

    /// Classification, parsing or metric computation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl FileError {
    /// Short machine-readable kind, used as a log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "READ_FAILED",
            Self::Engine(e) => e.kind(),
        }
    }
}
