//! Cell coercion shared by the report parsers.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::meta::Platform;
use super::types::Direction;
use crate::error::{EngineError, ParseStep, Result};

/// Timestamp layouts seen in platform exports.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Positional cell reader for one table row, tagged with its platform so
/// every failure is reported as a [`EngineError::MalformedReport`].
pub struct RowReader<'a> {
    platform: Platform,
    row_index: usize,
    cells: &'a [Option<String>],
}

impl<'a> RowReader<'a> {
    pub const fn new(platform: Platform, row_index: usize, cells: &'a [Option<String>]) -> Self {
        Self {
            platform,
            row_index,
            cells,
        }
    }

    fn error(&self, col: usize, what: &str) -> EngineError {
        EngineError::malformed(
            self.platform,
            ParseStep::CoerceColumns,
            format!("row {} column {}: {what}", self.row_index, col),
        )
    }

    pub fn text(&self, col: usize) -> Result<&'a str> {
        self.cells
            .get(col)
            .and_then(|c| c.as_deref())
            .ok_or_else(|| self.error(col, "cell is empty or missing"))
    }

    pub fn optional_text(&self, col: usize) -> Option<&'a str> {
        self.cells.get(col).and_then(|c| c.as_deref())
    }

    pub fn datetime(&self, col: usize) -> Result<NaiveDateTime> {
        let raw = self.text(col)?;
        parse_datetime(raw).ok_or_else(|| self.error(col, &format!("invalid timestamp '{raw}'")))
    }

    pub fn decimal(&self, col: usize) -> Result<Decimal> {
        let raw = self.text(col)?;
        parse_decimal(raw).ok_or_else(|| self.error(col, &format!("invalid number '{raw}'")))
    }

    pub fn direction(&self, col: usize) -> Result<Direction> {
        let raw = self.text(col)?;
        Direction::from_str(raw).map_err(|e| self.error(col, &e))
    }
}

/// Parse a report timestamp in any of the known layouts.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse a report number, ignoring whitespace used as a thousands separator.
///
/// The scale of the text is preserved (`1.10500` keeps five decimals).
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    Decimal::from_str(&compact)
        .or_else(|_| Decimal::from_scientific(&compact))
        .ok()
}
