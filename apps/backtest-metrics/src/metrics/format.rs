//! Formatting utilities for metric display and export.

use chrono::TimeDelta;
use rust_decimal::Decimal;

use super::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use super::types::Ratio;

/// Format a decimal with 2 decimal places, truncating extra digits.
#[must_use]
pub fn format_decimal(value: Decimal) -> String {
    format!("{:.2}", value.trunc_with_scale(2))
}

/// Format an optional decimal; undefined values render as `N/A`.
#[must_use]
pub fn format_optional(value: Option<Decimal>) -> String {
    value.map_or_else(|| "N/A".to_string(), format_decimal)
}

/// Format a ratio that may be infinite.
#[must_use]
pub fn format_ratio(value: Ratio) -> String {
    value.to_string()
}

/// Format a duration as `N days HH:MM:SS`.
#[must_use]
pub fn format_duration(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total % SECONDS_PER_MINUTE;
    format!("{sign}{days} days {hours:02}:{minutes:02}:{seconds:02}")
}
