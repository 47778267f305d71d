//! Report ingestion: HTML document model, platform classification, per-platform
//! parsers and the canonical trade log they produce.
//!
//! ```text
//! bytes ──► RawReport ──► classify ──► ReportParser ──► TradeLog
//!                                          │
//!                                          └─► pip scaling, running balance
//! ```

mod canonical;
mod cells;
pub mod classifier;
pub mod document;
pub mod genbox;
pub mod meta;
pub mod mt4;
pub mod parser;
pub mod pips;
pub mod types;

pub use classifier::classify;
pub use document::{RawReport, Table};
pub use meta::{OrderType, Period, Platform, Timeframe, backtest_name, file_stem};
pub use parser::{Backtest, ReportParser, parse_report};
pub use types::{Direction, ForexPair, TradeLog, TradeRecord};
