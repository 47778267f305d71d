//! CSV export of per-backtest summary rows.
//!
//! Column order and sign conventions are fixed: drawdown and average loss
//! are written as positive magnitudes.

use std::io;
use std::path::Path;

use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::metrics::{MetricsSnapshot, format_decimal, format_duration, format_optional, format_ratio};
use crate::report::{Backtest, Timeframe};
use crate::validity::Verdict;

/// Run metadata that is not part of the report itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportContext {
    /// 1-based position of the row in the export.
    pub seq: u64,
    /// Chart timeframe the backtests ran on.
    pub timeframe: Timeframe,
    /// Free-form exploration tag.
    pub exploration: String,
    /// Optimization run number.
    pub optimization: u32,
    /// Parameter set number within the optimization.
    pub set_number: u64,
}

/// One exported backtest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Seq")]
    seq: u64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Timeframe")]
    timeframe: String,
    #[serde(rename = "Exploration")]
    exploration: String,
    #[serde(rename = "Optimization")]
    optimization: u32,
    #[serde(rename = "Set")]
    set_number: u64,
    #[serde(rename = "Direction")]
    direction: String,
    #[serde(rename = "Valid")]
    valid: char,
    #[serde(rename = "Profit")]
    profit: String,
    #[serde(rename = "Kratio")]
    kratio: String,
    #[serde(rename = "SQN")]
    sqn: String,
    #[serde(rename = "EP")]
    expectancy: String,
    #[serde(rename = "DD")]
    drawdown: String,
    #[serde(rename = "RF")]
    recovery_factor: String,
    #[serde(rename = "PF")]
    profit_factor: String,
    #[serde(rename = "Ops")]
    ops: u64,
    #[serde(rename = "Win Ops")]
    win_ops: u64,
    #[serde(rename = "% Win")]
    pct_win: String,
    #[serde(rename = "Best Op")]
    best_op: String,
    #[serde(rename = "Worst Op")]
    worst_op: String,
    #[serde(rename = "Max. Winning Streak")]
    max_winning_streak: u64,
    #[serde(rename = "Max. Losing Streak")]
    max_losing_streak: u64,
    #[serde(rename = "Max. Exposure")]
    max_exposure: String,
    #[serde(rename = "Avg Loss")]
    avg_loss: String,
    #[serde(rename = "Avg Win")]
    avg_win: String,
    #[serde(rename = "Win/Loss Ratio")]
    win_loss_ratio: String,
    #[serde(rename = "Closing Days")]
    closing_days: u64,
    #[serde(rename = "% Time in Market")]
    pct_time_in_market: String,
    #[serde(rename = "Avg Duration")]
    avg_duration: String,
    #[serde(rename = "Longest Op")]
    longest_op: String,
    #[serde(rename = "Shortest Op")]
    shortest_op: String,
}

/// Number of columns in an export row.
pub const EXPORT_COLUMNS: usize = 32;

impl ExportRow {
    /// Assemble the row for one evaluated backtest.
    #[must_use]
    pub fn build(
        ctx: &ExportContext,
        backtest: &Backtest,
        snapshot: &MetricsSnapshot,
        verdict: &Verdict,
    ) -> Self {
        let durations = snapshot.durations();
        let avg_minutes = TimeDelta::minutes(durations.average.num_minutes());

        Self {
            seq: ctx.seq,
            name: backtest.name().to_string(),
            symbol: backtest
                .symbol()
                .map_or_else(String::new, |s| s.code().to_string()),
            timeframe: ctx.timeframe.to_string(),
            exploration: ctx.exploration.clone(),
            optimization: ctx.optimization,
            set_number: ctx.set_number,
            direction: backtest.order_type().label().to_string(),
            valid: verdict.flag(),
            profit: whole(snapshot.gross_profit()),
            kratio: format_optional(snapshot.kratio()),
            sqn: format_optional(snapshot.sqn()),
            expectancy: format_decimal(snapshot.expectancy()),
            drawdown: whole(-snapshot.drawdown()),
            recovery_factor: format_ratio(snapshot.recovery_factor()),
            profit_factor: format_ratio(snapshot.profit_factor()),
            ops: snapshot.num_ops(),
            win_ops: snapshot.win_ops(),
            pct_win: format_decimal(snapshot.pct_win()),
            best_op: format_decimal(snapshot.best_op().magnitude),
            worst_op: format_decimal(snapshot.worst_op().magnitude),
            max_winning_streak: snapshot.max_winning_streak(),
            max_losing_streak: snapshot.max_losing_streak(),
            max_exposure: format_decimal(snapshot.max_exposure()),
            avg_loss: format_optional(snapshot.avg_loss().map(|v| -v)),
            avg_win: format_optional(snapshot.avg_win()),
            win_loss_ratio: format_ratio(snapshot.win_loss_ratio()),
            closing_days: snapshot.closing_days(),
            pct_time_in_market: format_optional(snapshot.pct_time_in_market()),
            avg_duration: format_duration(avg_minutes),
            longest_op: format_duration(durations.longest),
            shortest_op: format_duration(durations.shortest),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn valid(&self) -> char {
        self.valid
    }
}

/// Integer part, as text.
fn whole(value: Decimal) -> String {
    value.trunc().normalize().to_string()
}

/// Write `rows` with a header line.
pub fn write_csv<W: io::Write>(writer: W, rows: &[ExportRow]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    if rows.is_empty() {
        wtr.write_record(HEADER)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `rows` to a CSV file, replacing it.
pub fn write_csv_file(path: &Path, rows: &[ExportRow]) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(io::BufWriter::new(file), rows)
}

/// Header line, used when there is no row to derive it from.
pub const HEADER: [&str; EXPORT_COLUMNS] = [
    "Seq",
    "Name",
    "Symbol",
    "Timeframe",
    "Exploration",
    "Optimization",
    "Set",
    "Direction",
    "Valid",
    "Profit",
    "Kratio",
    "SQN",
    "EP",
    "DD",
    "RF",
    "PF",
    "Ops",
    "Win Ops",
    "% Win",
    "Best Op",
    "Worst Op",
    "Max. Winning Streak",
    "Max. Losing Streak",
    "Max. Exposure",
    "Avg Loss",
    "Avg Win",
    "Win/Loss Ratio",
    "Closing Days",
    "% Time in Market",
    "Avg Duration",
    "Longest Op",
    "Shortest Op",
];
