//! Report parsing entry points.
//!
//! [`ReportParser`] is the closed set of supported formats. [`parse_report`]
//! dispatches on a platform tag; [`Backtest::from_html`] runs the whole
//! classify-and-parse step and bundles the trade log with its metadata.

use rust_decimal::Decimal;
use tracing::debug;

use super::classifier::classify;
use super::document::RawReport;
use super::meta::{OrderType, Period, Platform, backtest_name};
use super::types::{ForexPair, TradeLog};
use super::{genbox, mt4};
use crate::error::{EngineError, Result};

/// Parser variant for one supported platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportParser {
    /// MetaTrader 4 strategy tester report.
    Mt4,
    /// Genbox export.
    Genbox,
}

impl ReportParser {
    /// Parser for a platform tag. [`Platform::Unknown`] has none.
    pub fn for_platform(platform: Platform, file_name: &str) -> Result<Self> {
        match platform {
            Platform::Mt4 => Ok(Self::Mt4),
            Platform::Genbox => Ok(Self::Genbox),
            Platform::Unknown => Err(EngineError::UnrecognizedFormat {
                file: file_name.to_string(),
                reason: "no parser for an unknown platform".to_string(),
            }),
        }
    }

    /// Platform this parser reads.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        match self {
            Self::Mt4 => Platform::Mt4,
            Self::Genbox => Platform::Genbox,
        }
    }

    /// Parse a report into its trade log.
    pub fn parse(&self, raw: &RawReport, deposit: Decimal) -> Result<TradeLog> {
        match self {
            Self::Mt4 => mt4::parse(raw, deposit),
            Self::Genbox => genbox::parse(raw, deposit),
        }
    }
}

/// Parse `raw` with the parser for `platform`.
pub fn parse_report(platform: Platform, raw: &RawReport, deposit: Decimal) -> Result<TradeLog> {
    ReportParser::for_platform(platform, raw.file_name())?.parse(raw, deposit)
}

/// A parsed backtest: trade log plus the tags derived from it and its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backtest {
    platform: Platform,
    period: Period,
    name: String,
    symbol: Option<ForexPair>,
    order_type: OrderType,
    log: TradeLog,
}

impl Backtest {
    /// Classify and parse an already extracted report.
    pub fn from_report(raw: &RawReport, deposit: Decimal) -> Result<Self> {
        let platform = classify(raw);
        let log = parse_report(platform, raw, deposit)?;
        let order_type = OrderType::from_records(log.records()).ok_or_else(|| {
            EngineError::EmptyDataset {
                file: raw.file_name().to_string(),
            }
        })?;

        let backtest = Self {
            platform,
            period: Period::from_file_name(raw.file_name()),
            name: backtest_name(raw.file_name()),
            symbol: log.first().symbol,
            order_type,
            log,
        };
        debug!(
            file = %raw.file_name(),
            platform = %backtest.platform,
            period = %backtest.period,
            order_type = %backtest.order_type,
            trades = backtest.log.len(),
            "Parsed backtest"
        );
        Ok(backtest)
    }

    /// Read the HTML bytes of a report, then classify and parse it.
    pub fn from_html(file_name: &str, bytes: &[u8], deposit: Decimal) -> Result<Self> {
        let raw = RawReport::from_html(file_name, bytes)?;
        Self::from_report(&raw, deposit)
    }

    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Name shared by the IS, OS and ISOS runs of the same parameter set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Symbol of the first trade.
    #[must_use]
    pub const fn symbol(&self) -> Option<ForexPair> {
        self.symbol
    }

    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    #[must_use]
    pub const fn log(&self) -> &TradeLog {
        &self.log
    }

    /// Consume the bundle, keeping only the trade log.
    #[must_use]
    pub fn into_log(self) -> TradeLog {
        self.log
    }
}
