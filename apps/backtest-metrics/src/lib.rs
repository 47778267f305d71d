// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::items_after_statements,
        clippy::cast_possible_truncation
    )
)]

//! Backtest Metrics - Rust Core Library
//!
//! Turns exported trading-platform backtest reports into a canonical trade
//! log, a full metrics snapshot and a validity verdict.
//!
//! # Pipeline
//!
//! ```text
//! HTML bytes ─► RawReport ─► classify ─► ReportParser ─► TradeLog
//!                                                          │
//!                       Verdict ◄─ evaluate ◄─ MetricsSnapshot
//! ```
//!
//! - **report**: document model, platform classifier, MT4 and Genbox parsers,
//!   pip scaling and backtest metadata
//! - **metrics**: profit/recovery factor, drawdowns, streaks, exposure,
//!   SQN, k-ratio and the rest of the metric set
//! - **validity**: criteria table and evaluation
//! - **export**: ordered CSV export rows
//! - **batch**: per-file pipeline over a directory, parallel with Rayon
//!
//! Every stage is a pure function of its inputs; nothing is computed behind
//! accessors and no state is shared between reports.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod telemetry;
pub mod validity;

pub use batch::{BatchProcessor, BatchReport, FileOutcome};
pub use config::{Config, ConfigError, load_config, load_config_from_string};
pub use error::{EngineError, ParseStep, Result};
pub use export::{ExportContext, ExportRow, write_csv, write_csv_file};
pub use metrics::{MetricName, MetricValue, MetricsCalculator, MetricsSnapshot, Ratio};
pub use report::{Backtest, Platform, RawReport, TradeLog, TradeRecord, classify, parse_report};
pub use validity::{Bound, Criteria, Verdict, evaluate, is_valid};
