//! Backtest Metrics Binary
//!
//! Processes a directory of backtest reports and writes the export CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin backtest-metrics -- [config.yaml]
//! ```
//!
//! # Environment Variables
//!
//! - `BACKTEST_METRICS_CONFIG`: config path when no argument is given
//!   (default: config.yaml; a missing file means built-in defaults)
//! - `RUST_LOG`: log filter (default: backtest_metrics=info)
//!
//! Any `${VAR}` or `${VAR:-default}` in the configuration is expanded from
//! the environment, after `.env` has been loaded.

use std::path::Path;

use anyhow::{Context, Result};
use backtest_metrics::batch::BatchProcessor;
use backtest_metrics::config::{Config, load_config};
use backtest_metrics::telemetry::init_telemetry;

/// Default configuration path.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

fn main() -> Result<()> {
    load_dotenv();

    let config = resolve_config()?;
    init_telemetry(&config.observability.logging);

    tracing::info!(
        reports_dir = %config.batch.reports_dir.display(),
        deposit = %config.engine.deposit,
        pips_mode = config.engine.pips_mode,
        criteria = config.criteria.len(),
        "Starting backtest metrics"
    );

    let processor = BatchProcessor::from_config(&config);
    let report = processor
        .run_dir()
        .with_context(|| format!("processing {}", config.batch.reports_dir.display()))?;

    for (file, err) in report.failures() {
        tracing::warn!(file, kind = err.kind(), error = %err, "Skipped report");
    }

    let rows = processor
        .export(&report)
        .with_context(|| format!("writing {}", config.batch.export_path.display()))?;

    tracing::info!(
        rows,
        valid = report.valid(),
        failed = report.failed(),
        export = %config.batch.export_path.display(),
        "Export written"
    );
    Ok(())
}

/// Load the configuration named on the command line, by environment, or the default.
fn resolve_config() -> Result<Config> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BACKTEST_METRICS_CONFIG").ok());

    match explicit {
        Some(path) => load_config(Some(&path)).with_context(|| format!("loading config {path}")),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Some(DEFAULT_CONFIG_PATH)).context("loading config.yaml")
        }
        None => Ok(Config::default()),
    }
}

/// Load `.env` from the working directory or the nearest ancestor holding one.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
