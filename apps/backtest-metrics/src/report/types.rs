//! Canonical trade log types shared by every report parser.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Long.
    Buy,
    /// Short.
    Sell,
}

impl Direction {
    /// Sign applied to a price delta when converting it to pips.
    #[must_use]
    pub const fn multiplier(&self) -> Decimal {
        match self {
            Self::Buy => Decimal::ONE,
            Self::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("BUY"),
            Self::Sell => f.write_str("SELL"),
        }
    }
}

/// Supported currency pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(missing_docs)]
pub enum ForexPair {
    AudCad,
    AudChf,
    AudJpy,
    AudNzd,
    CadChf,
    CadJpy,
    ChfJpy,
    EurAud,
    EurCad,
    EurChf,
    EurJpy,
    EurNzd,
    EurUsd,
    GbpAud,
    GbpCad,
    GbpChf,
    GbpJpy,
    GbpUsd,
    NzdCad,
    NzdChf,
    NzdUsd,
    UsdCad,
    UsdChf,
    UsdJpy,
}

impl ForexPair {
    /// Every supported pair.
    pub const ALL: [Self; 24] = [
        Self::AudCad,
        Self::AudChf,
        Self::AudJpy,
        Self::AudNzd,
        Self::CadChf,
        Self::CadJpy,
        Self::ChfJpy,
        Self::EurAud,
        Self::EurCad,
        Self::EurChf,
        Self::EurJpy,
        Self::EurNzd,
        Self::EurUsd,
        Self::GbpAud,
        Self::GbpCad,
        Self::GbpChf,
        Self::GbpJpy,
        Self::GbpUsd,
        Self::NzdCad,
        Self::NzdChf,
        Self::NzdUsd,
        Self::UsdCad,
        Self::UsdChf,
        Self::UsdJpy,
    ];

    /// Six-letter instrument code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AudCad => "AUDCAD",
            Self::AudChf => "AUDCHF",
            Self::AudJpy => "AUDJPY",
            Self::AudNzd => "AUDNZD",
            Self::CadChf => "CADCHF",
            Self::CadJpy => "CADJPY",
            Self::ChfJpy => "CHFJPY",
            Self::EurAud => "EURAUD",
            Self::EurCad => "EURCAD",
            Self::EurChf => "EURCHF",
            Self::EurJpy => "EURJPY",
            Self::EurNzd => "EURNZD",
            Self::EurUsd => "EURUSD",
            Self::GbpAud => "GBPAUD",
            Self::GbpCad => "GBPCAD",
            Self::GbpChf => "GBPCHF",
            Self::GbpJpy => "GBPJPY",
            Self::GbpUsd => "GBPUSD",
            Self::NzdCad => "NZDCAD",
            Self::NzdChf => "NZDCHF",
            Self::NzdUsd => "NZDUSD",
            Self::UsdCad => "USDCAD",
            Self::UsdChf => "USDCHF",
            Self::UsdJpy => "USDJPY",
        }
    }

    /// Abbreviated name, e.g. `eu` for EURUSD or `gcf` for GBPCHF.
    #[must_use]
    pub fn short_name(&self) -> String {
        let code = self.code();
        format!(
            "{}{}",
            currency_abbreviation(&code[..3]),
            currency_abbreviation(&code[3..])
        )
    }
}

fn currency_abbreviation(currency: &str) -> &'static str {
    match currency {
        "EUR" => "e",
        "USD" => "u",
        "JPY" => "j",
        "AUD" => "a",
        "NZD" => "n",
        "CAD" => "cd",
        "CHF" => "cf",
        "GBP" => "g",
        _ => "",
    }
}

impl FromStr for ForexPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|p| p.code() == upper)
            .ok_or_else(|| format!("unsupported instrument '{}'", s.trim()))
    }
}

impl fmt::Display for ForexPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One closed trading operation in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Opening timestamp.
    pub open_time: NaiveDateTime,
    /// Closing timestamp, never before `open_time`.
    pub close_time: NaiveDateTime,
    /// Stop loss level as reported.
    pub stop_loss: Decimal,
    /// Take profit level as reported.
    pub take_profit: Decimal,
    /// Trade direction.
    pub direction: Direction,
    /// Lot size.
    pub volume: Decimal,
    /// Instrument, absent when implied by a single-symbol report.
    pub symbol: Option<ForexPair>,
    /// Entry price with platform-native precision.
    pub open_price: Decimal,
    /// Exit price with platform-native precision.
    pub close_price: Decimal,
    /// Signed price movement in pips.
    pub pips: Decimal,
    /// Signed profit in account currency.
    pub profit: Decimal,
    /// Deposit plus cumulative profit up to and including this record.
    pub running_balance: Decimal,
}

impl TradeRecord {
    /// Time the trade was open.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.close_time - self.open_time
    }
}

/// Ordered, non-empty sequence of trades in report order.
///
/// Order is the source report's order, which is not necessarily chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeLog {
    records: Vec<TradeRecord>,
}

impl TradeLog {
    /// Wrap records into a log. Returns `None` when `records` is empty.
    #[must_use]
    pub fn new(records: Vec<TradeRecord>) -> Option<Self> {
        if records.is_empty() {
            None
        } else {
            Some(Self { records })
        }
    }

    /// All records.
    #[must_use]
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Number of trades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Pair to [`len`](Self::len). `new` rejects empty input, so this is
    /// always false.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record in report order.
    #[must_use]
    pub fn first(&self) -> &TradeRecord {
        &self.records[0]
    }

    /// Last record in report order.
    #[must_use]
    pub fn last(&self) -> &TradeRecord {
        &self.records[self.records.len() - 1]
    }

    /// Iterate over records.
    pub fn iter(&self) -> std::slice::Iter<'_, TradeRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a TradeLog {
    type Item = &'a TradeRecord;
    type IntoIter = std::slice::Iter<'a, TradeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forex_pair_parse_is_case_insensitive() {
        assert_eq!("eurusd".parse::<ForexPair>(), Ok(ForexPair::EurUsd));
        assert_eq!(" GBPJPY ".parse::<ForexPair>(), Ok(ForexPair::GbpJpy));
        assert!("XAUUSD".parse::<ForexPair>().is_err());
    }

    #[test]
    fn test_forex_short_names() {
        assert_eq!(ForexPair::EurUsd.short_name(), "eu");
        assert_eq!(ForexPair::GbpChf.short_name(), "gcf");
        assert_eq!(ForexPair::CadJpy.short_name(), "cdj");
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("Buy".parse::<Direction>(), Ok(Direction::Buy));
        assert_eq!("SELL".parse::<Direction>(), Ok(Direction::Sell));
        assert!("close".parse::<Direction>().is_err());
    }

    #[test]
    fn test_empty_log_is_rejected() {
        assert!(TradeLog::new(Vec::new()).is_none());
    }

    #[test]
    fn test_single_record_log_is_not_empty() {
        let open_time = NaiveDateTime::parse_from_str("2022-01-03 10:00", "%Y-%m-%d %H:%M").unwrap();
        let record = TradeRecord {
            open_time,
            close_time: open_time + TimeDelta::hours(2),
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
            direction: Direction::Buy,
            volume: Decimal::new(10, 2),
            symbol: Some(ForexPair::EurUsd),
            open_price: Decimal::new(11234, 4),
            close_price: Decimal::new(11244, 4),
            pips: Decimal::ONE,
            profit: Decimal::TEN,
            running_balance: Decimal::new(10010, 0),
        };
        let log = TradeLog::new(vec![record.clone()]).unwrap();

        assert_eq!(log.len(), 1);
        assert!(!log.is_empty());
        assert_eq!(log.first(), &record);
        assert_eq!(log.last(), &record);
        assert_eq!(log.first().duration(), TimeDelta::hours(2));
    }
}
