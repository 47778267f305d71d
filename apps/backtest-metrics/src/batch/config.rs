//! Configuration for batch report processing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::report::Timeframe;

/// Configuration for batch report processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory scanned for reports.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Accepted file extensions, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Maximum number of threads to use (0 = use all available).
    #[serde(default)]
    pub max_threads: usize,

    /// Minimum parallelization threshold (batches below this run sequentially).
    #[serde(default = "default_min_parallel_jobs")]
    pub min_parallel_jobs: usize,

    /// Where the export CSV is written.
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,

    /// Metadata written to every export row.
    #[serde(default)]
    pub export: ExportDefaults,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            extensions: default_extensions(),
            max_threads: 0,
            min_parallel_jobs: default_min_parallel_jobs(),
            export_path: default_export_path(),
            export: ExportDefaults::default(),
        }
    }
}

impl BatchConfig {
    /// Whether `path` has one of the accepted extensions (case-insensitive).
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }
}

/// Export metadata that does not come from the reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExportDefaults {
    /// Chart timeframe.
    #[serde(default)]
    pub timeframe: Timeframe,
    /// Exploration tag.
    #[serde(default)]
    pub exploration: String,
    /// Optimization run number.
    #[serde(default)]
    pub optimization: u32,
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_extensions() -> Vec<String> {
    vec!["html".to_string(), "htm".to_string()]
}

const fn default_min_parallel_jobs() -> usize {
    4
}

fn default_export_path() -> PathBuf {
    PathBuf::from("metrics.csv")
}
