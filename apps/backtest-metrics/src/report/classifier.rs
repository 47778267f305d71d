//! Platform classifier.
//!
//! Identifies the platform from the number of embedded tables: MT4 reports
//! carry exactly two (header + operations), everything else is treated as a
//! Genbox report. This is a shape heuristic, not a schema check; a report that
//! is misclassified fails later in the parser with a `MalformedReport`.

use super::document::RawReport;
use super::meta::Platform;

/// Number of tables in an MT4 strategy tester report.
pub const MT4_TABLE_COUNT: usize = 2;

/// Classify a report by its table count.
#[must_use]
pub fn classify(raw: &RawReport) -> Platform {
    if raw.tables().len() == MT4_TABLE_COUNT {
        Platform::Mt4
    } else {
        Platform::Genbox
    }
}
