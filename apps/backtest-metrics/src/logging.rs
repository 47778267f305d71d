//! Structured pipeline logging.
//!
//! Every stage of the report pipeline emits a [`PipelineEvent`]:
//! - Report classified (platform tag)
//! - Report parsed (trades, period, order type)
//! - Snapshot computed (headline metrics)
//! - Verdict evaluated (failed criteria)
//! - File failed (error kind and message)
//!
//! # Log Levels
//!
//! - **INFO**: Parsed reports and verdicts
//! - **WARN**: Failed files
//! - **DEBUG**: Classification and metric details

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::metrics::{MetricsSnapshot, Ratio};
use crate::report::{Backtest, Platform};
use crate::validity::Verdict;

// ============================================
// Event Types
// ============================================

/// Pipeline event for structured logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Platform identified.
    ReportClassified(ReportClassifiedEvent),
    /// Trade log built.
    ReportParsed(ReportParsedEvent),
    /// Metrics computed.
    SnapshotComputed(SnapshotComputedEvent),
    /// Criteria evaluated.
    VerdictEvaluated(VerdictEvaluatedEvent),
    /// Pipeline aborted for one file.
    FileFailed(FileFailedEvent),
}

impl PipelineEvent {
    /// Report file the event belongs to.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::ReportClassified(e) => &e.file,
            Self::ReportParsed(e) => &e.file,
            Self::SnapshotComputed(e) => &e.file,
            Self::VerdictEvaluated(e) => &e.file,
            Self::FileFailed(e) => &e.file,
        }
    }
}

/// Report classified event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportClassifiedEvent {
    /// Report file name.
    pub file: String,
    /// Detected platform.
    pub platform: Platform,
    /// Embedded tables found.
    pub tables: usize,
}

/// Report parsed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParsedEvent {
    /// Report file name.
    pub file: String,
    /// Backtest name.
    pub name: String,
    /// IS, OS or ISOS.
    pub period: String,
    /// BUY, SELL or BOTH.
    pub order_type: String,
    /// Number of trades.
    pub trades: usize,
}

/// Snapshot computed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotComputedEvent {
    /// Report file name.
    pub file: String,
    /// Pips or money.
    pub pips_mode: bool,
    /// Profit factor.
    pub profit_factor: Ratio,
    /// Recovery factor.
    pub recovery_factor: Ratio,
    /// Gross profit.
    pub gross_profit: Decimal,
    /// Drawdown minimum.
    pub drawdown: Decimal,
    /// K-ratio, when defined.
    pub kratio: Option<Decimal>,
}

/// Verdict evaluated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictEvaluatedEvent {
    /// Report file name.
    pub file: String,
    /// Whether every criterion held.
    pub valid: bool,
    /// Keys of failed criteria.
    pub failed: Vec<String>,
}

/// File failed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailedEvent {
    /// Report file name.
    pub file: String,
    /// Error kind.
    pub kind: String,
    /// Error message.
    pub message: String,
}

// ============================================
// Logging Functions
// ============================================

/// Log report classification.
pub fn log_report_classified(event: &ReportClassifiedEvent) {
    debug!(
        file = %event.file,
        platform = %event.platform,
        tables = event.tables,
        "Report classified"
    );
}

/// Log report parsing.
pub fn log_report_parsed(event: &ReportParsedEvent) {
    info!(
        file = %event.file,
        name = %event.name,
        period = %event.period,
        order_type = %event.order_type,
        trades = event.trades,
        "Report parsed"
    );
}

/// Log snapshot computation.
pub fn log_snapshot_computed(event: &SnapshotComputedEvent) {
    debug!(
        file = %event.file,
        pips_mode = event.pips_mode,
        profit_factor = %event.profit_factor,
        recovery_factor = %event.recovery_factor,
        gross_profit = %event.gross_profit,
        drawdown = %event.drawdown,
        kratio = ?event.kratio,
        "Snapshot computed"
    );
}

/// Log verdict evaluation.
pub fn log_verdict_evaluated(event: &VerdictEvaluatedEvent) {
    info!(
        file = %event.file,
        valid = event.valid,
        failed = ?event.failed,
        "Verdict evaluated"
    );
}

/// Log a per-file failure.
pub fn log_file_failed(event: &FileFailedEvent) {
    warn!(
        file = %event.file,
        kind = %event.kind,
        message = %event.message,
        "Report failed"
    );
}

/// Emit an event to tracing.
pub fn emit(event: &PipelineEvent) {
    match event {
        PipelineEvent::ReportClassified(e) => log_report_classified(e),
        PipelineEvent::ReportParsed(e) => log_report_parsed(e),
        PipelineEvent::SnapshotComputed(e) => log_snapshot_computed(e),
        PipelineEvent::VerdictEvaluated(e) => log_verdict_evaluated(e),
        PipelineEvent::FileFailed(e) => log_file_failed(e),
    }
}

// ============================================
// Helper Functions
// ============================================

/// Create a report parsed event.
pub fn create_report_parsed_event(file: impl Into<String>, backtest: &Backtest) -> PipelineEvent {
    PipelineEvent::ReportParsed(ReportParsedEvent {
        file: file.into(),
        name: backtest.name().to_string(),
        period: backtest.period().to_string(),
        order_type: backtest.order_type().code().to_string(),
        trades: backtest.log().len(),
    })
}

/// Create a snapshot computed event.
pub fn create_snapshot_event(file: impl Into<String>, snapshot: &MetricsSnapshot) -> PipelineEvent {
    PipelineEvent::SnapshotComputed(SnapshotComputedEvent {
        file: file.into(),
        pips_mode: snapshot.pips_mode(),
        profit_factor: snapshot.profit_factor(),
        recovery_factor: snapshot.recovery_factor(),
        gross_profit: snapshot.gross_profit(),
        drawdown: snapshot.drawdown(),
        kratio: snapshot.kratio(),
    })
}

/// Create a verdict evaluated event.
pub fn create_verdict_event(file: impl Into<String>, verdict: &Verdict) -> PipelineEvent {
    PipelineEvent::VerdictEvaluated(VerdictEvaluatedEvent {
        file: file.into(),
        valid: verdict.is_valid(),
        failed: verdict
            .failures
            .iter()
            .map(|f| f.metric.key().to_string())
            .collect(),
    })
}

/// Create a file failed event.
pub fn create_failure_event(file: impl Into<String>, error: &impl std::fmt::Display, kind: &str) -> PipelineEvent {
    PipelineEvent::FileFailed(FileFailedEvent {
        file: file.into(),
        kind: kind.to_string(),
        message: error.to_string(),
    })
}

/// Create a file failed event from an engine error.
pub fn create_engine_failure_event(file: impl Into<String>, error: &EngineError) -> PipelineEvent {
    create_failure_event(file, error, error.kind())
}

/// Pipeline logger collecting events.
#[derive(Debug, Default)]
pub struct PipelineLogger {
    events: Vec<PipelineEvent>,
    log_to_tracing: bool,
}

impl PipelineLogger {
    /// Create a new pipeline logger.
    pub fn new(log_to_tracing: bool) -> Self {
        Self {
            events: Vec::new(),
            log_to_tracing,
        }
    }

    /// Log an event.
    pub fn log(&mut self, event: PipelineEvent) {
        if self.log_to_tracing {
            emit(&event);
        }
        self.events.push(event);
    }

    /// All logged events.
    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Take the logged events, leaving the logger empty.
    pub fn into_events(self) -> Vec<PipelineEvent> {
        self.events
    }

    /// Events that were failures.
    pub fn failures(&self) -> Vec<&PipelineEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::FileFailed(_)))
            .collect()
    }

    /// Export events as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.events)
    }
}
