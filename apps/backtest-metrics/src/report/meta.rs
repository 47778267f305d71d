//! Backtest classification tags: platform, period, order type, timeframe.
//!
//! These are closed enumerations consumed downstream (persistence, export).
//! Each carries a short code and a human-readable label.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{Direction, TradeRecord};

/// Separator between a file stem and its extension.
pub const EXTENSION_SEP: char = '.';

/// Separator between fields of a Genbox-style file name.
pub const FIELD_SEP: char = '_';

/// Platform that generated a backtest report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// MetaTrader 4 strategy tester (header table + operations table).
    #[serde(rename = "MT4")]
    Mt4,
    /// Genbox export (single combined table).
    #[serde(rename = "GBX")]
    Genbox,
    /// Not identified.
    #[serde(rename = "UKN")]
    Unknown,
}

impl Platform {
    /// Short storage code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Mt4 => "MT4",
            Self::Genbox => "GBX",
            Self::Unknown => "UKN",
        }
    }

    /// Human-readable platform name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Mt4 => "METATRADER4",
            Self::Genbox => "GENBOX",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Data period covered by a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    /// In-sample.
    Is,
    /// Out-of-sample.
    Os,
    /// In-sample and out-of-sample combined.
    Isos,
}

impl Period {
    /// Classify a report by its file name.
    ///
    /// The stem is split on `_`; a trailing `IS` or `OS` field selects that
    /// period, anything else (including a single-field stem) is [`Period::Isos`].
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        let stem = file_stem(file_name);
        let mut fields = stem.split(FIELD_SEP);
        let first = fields.next();
        match (first, fields.next_back()) {
            (Some(_), Some("IS")) => Self::Is,
            (Some(_), Some("OS")) => Self::Os,
            _ => Self::Isos,
        }
    }

    /// Text form used in exports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Is => "IS",
            Self::Os => "OS",
            Self::Isos => "ISOS",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directions traded by a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Buy-only.
    #[serde(rename = "BUY")]
    Buy,
    /// Sell-only.
    #[serde(rename = "SELL")]
    Sell,
    /// Both directions.
    #[serde(rename = "BUY&SELL")]
    Both,
}

impl OrderType {
    /// Derive the order type from the records' directions.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn from_records(records: &[TradeRecord]) -> Option<Self> {
        let first = records.first()?.direction;
        if records.iter().all(|r| r.direction == first) {
            Some(match first {
                Direction::Buy => Self::Buy,
                Direction::Sell => Self::Sell,
            })
        } else {
            Some(Self::Both)
        }
    }

    /// Storage code (`BUY`, `SELL`, `BUY&SELL`).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Both => "BUY&SELL",
        }
    }

    /// Human-readable label (`Buy`, `Sell`, `Buy&Sell`).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Both => "Buy&Sell",
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            "BUY&SELL" | "BOTH" => Ok(Self::Both),
            other => Err(format!("unknown order type '{other}'")),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chart timeframe a backtest was run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    /// 1 minute.
    M1,
    /// 5 minutes.
    M5,
    /// 15 minutes.
    M15,
    /// 30 minutes.
    M30,
    /// 1 hour.
    H1,
    /// 4 hours.
    #[default]
    H4,
    /// Daily.
    D1,
    /// Weekly.
    W,
    /// Monthly.
    M,
}

impl Timeframe {
    /// Text form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
            Self::W => "W",
            Self::M => "M",
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M1" => Ok(Self::M1),
            "M5" => Ok(Self::M5),
            "M15" => Ok(Self::M15),
            "M30" => Ok(Self::M30),
            "H1" => Ok(Self::H1),
            "H4" => Ok(Self::H4),
            "D1" => Ok(Self::D1),
            "W" | "W1" => Ok(Self::W),
            "M" | "MN" | "MN1" => Ok(Self::M),
            other => Err(format!("unknown timeframe '{other}'")),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File name without directories and without its extension.
#[must_use]
pub fn file_stem(file_name: &str) -> &str {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    base.split(EXTENSION_SEP).next().unwrap_or(base)
}

/// Backtest name shared by the IS, OS and ISOS runs of the same parameter set.
///
/// For IS/OS reports the trailing period field is removed from the stem.
#[must_use]
pub fn backtest_name(file_name: &str) -> String {
    let stem = file_stem(file_name);
    match Period::from_file_name(file_name) {
        Period::Isos => stem.to_string(),
        Period::Is | Period::Os => stem
            .rsplit_once(FIELD_SEP)
            .map_or(stem, |(head, _)| head)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("EURUSD_H4_strategy_IS.html", Period::Is ; "in sample suffix")]
    #[test_case("EURUSD_H4_strategy_OS.htm", Period::Os ; "out of sample suffix")]
    #[test_case("EURUSD_H4_strategy.html", Period::Isos ; "no period suffix")]
    #[test_case("IS.html", Period::Isos ; "single field")]
    #[test_case("EURUSD_H4_is.html", Period::Isos ; "lowercase suffix is not a period")]
    fn test_period_from_file_name(file: &str, expected: Period) {
        assert_eq!(Period::from_file_name(file), expected);
    }

    #[test]
    fn test_backtest_name_strips_period_field() {
        assert_eq!(backtest_name("EURUSD_H4_strategy_IS.html"), "EURUSD_H4_strategy");
        assert_eq!(backtest_name("EURUSD_H4_strategy.html"), "EURUSD_H4_strategy");
        assert_eq!(backtest_name("reports/GBPJPY_OS.htm"), "GBPJPY");
    }

    #[test]
    fn test_order_type_text_round_trip() {
        for ot in [OrderType::Buy, OrderType::Sell, OrderType::Both] {
            assert_eq!(ot.code().parse::<OrderType>(), Ok(ot));
        }
        assert!("HOLD".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_platform_labels() {
        assert_eq!(Platform::Mt4.label(), "METATRADER4");
        assert_eq!(Platform::Genbox.code(), "GBX");
        assert_eq!(Platform::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("h4".parse::<Timeframe>(), Ok(Timeframe::H4));
        assert_eq!("MN1".parse::<Timeframe>(), Ok(Timeframe::M));
        assert!("H2".parse::<Timeframe>().is_err());
    }
}
