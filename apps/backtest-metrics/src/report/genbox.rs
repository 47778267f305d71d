//! Genbox report parser.
//!
//! A Genbox export is a single table: two banner rows, a column header row,
//! a deposit marker row, the trades, then a `Closed P/L:` summary block.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::canonical::{RawTrade, build_trade_log};
use super::cells::RowReader;
use super::document::RawReport;
use super::meta::Platform;
use super::types::{ForexPair, TradeLog};
use crate::error::{EngineError, ParseStep, Result};

/// Ticket value of the row that ends the trade block.
pub const END_OF_DATA: &str = "Closed P/L:";

const BANNER_ROWS: usize = 2;

/// Ticket followed by the thirteen trade columns.
const MIN_COLUMNS: usize = 14;

mod col {
    pub const TICKET: usize = 0;
    pub const OPEN_TIME: usize = 1;
    pub const TYPE: usize = 2;
    pub const VOLUME: usize = 3;
    pub const SYMBOL: usize = 4;
    pub const OPEN_PRICE: usize = 5;
    pub const STOP_LOSS: usize = 6;
    pub const TAKE_PROFIT: usize = 7;
    pub const CLOSE_TIME: usize = 8;
    pub const CLOSE_PRICE: usize = 9;
    pub const COMMISSION: usize = 10;
    pub const TAXES: usize = 11;
    pub const SWAP: usize = 12;
    pub const PROFIT: usize = 13;
}

const PLATFORM: Platform = Platform::Genbox;

/// Parse a Genbox report into a trade log.
pub fn parse(raw: &RawReport, deposit: Decimal) -> Result<TradeLog> {
    let table = raw.tables().first().ok_or_else(|| {
        EngineError::malformed(PLATFORM, ParseStep::ReadTables, "report has no tables")
    })?;

    if table.width() < MIN_COLUMNS {
        return Err(EngineError::malformed(
            PLATFORM,
            ParseStep::PromoteHeader,
            format!(
                "expected at least {MIN_COLUMNS} columns, found {}",
                table.width()
            ),
        ));
    }

    // Rows with a missing cell are banner or spacer rows. The sentinel row
    // is kept even when its summary cells are blank.
    let rows: Vec<&Vec<Option<String>>> = table
        .rows()
        .iter()
        .skip(BANNER_ROWS)
        .filter(|row| is_sentinel(row) || row.iter().all(Option::is_some))
        .collect();

    if rows.len() < 2 {
        return Err(EngineError::malformed(
            PLATFORM,
            ParseStep::StripBanner,
            "no column header and deposit rows after the banner",
        ));
    }
    debug!(
        file = %raw.file_name(),
        header = ?rows[0].first().and_then(Option::as_deref),
        "Promoted Genbox column header"
    );

    let body = &rows[2..];
    let end = body.iter().position(|row| is_sentinel(row)).ok_or_else(|| {
        EngineError::malformed(
            PLATFORM,
            ParseStep::LocateSentinel,
            format!("end-of-data row '{END_OF_DATA}' not found"),
        )
    })?;

    let trades = body[..end]
        .iter()
        .enumerate()
        .map(|(idx, row)| read_trade(idx, row))
        .collect::<Result<Vec<_>>>()?;

    build_trade_log(PLATFORM, trades, deposit)?.ok_or_else(|| EngineError::EmptyDataset {
        file: raw.file_name().to_string(),
    })
}

fn is_sentinel(row: &[Option<String>]) -> bool {
    row.get(col::TICKET)
        .and_then(Option::as_deref)
        .is_some_and(|ticket| ticket == END_OF_DATA)
}

fn read_trade(idx: usize, row: &[Option<String>]) -> Result<RawTrade> {
    let reader = RowReader::new(PLATFORM, idx, row);

    // Fees are validated as numbers but are not part of the canonical record.
    for fee in [col::COMMISSION, col::TAXES, col::SWAP] {
        reader.decimal(fee)?;
    }

    let symbol = match reader.optional_text(col::SYMBOL) {
        Some(text) => Some(ForexPair::from_str(text).map_err(|e| {
            EngineError::malformed(PLATFORM, ParseStep::CoerceColumns, format!("row {idx}: {e}"))
        })?),
        None => None,
    };

    Ok(RawTrade {
        open_time: reader.datetime(col::OPEN_TIME)?,
        close_time: reader.datetime(col::CLOSE_TIME)?,
        stop_loss: reader.decimal(col::STOP_LOSS)?,
        take_profit: reader.decimal(col::TAKE_PROFIT)?,
        direction: reader.direction(col::TYPE)?,
        volume: reader.decimal(col::VOLUME)?,
        symbol,
        open_price: reader.decimal(col::OPEN_PRICE)?,
        close_price: reader.decimal(col::CLOSE_PRICE)?,
        profit: reader.decimal(col::PROFIT)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::Table;
    use rust_decimal_macros::dec;

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some((*c).to_string()) })
            .collect()
    }

    fn trade(ticket: &str, kind: &str, open: &str, close: &str, profit: &str) -> Vec<Option<String>> {
        row(&[
            ticket,
            "2022.01.03 10:00",
            kind,
            "0.10",
            "EURUSD",
            open,
            "0.0000",
            "0.0000",
            "2022.01.03 14:00",
            close,
            "0.00",
            "0.00",
            "0.00",
            profit,
        ])
    }

    fn report(body: Vec<Vec<Option<String>>>, with_sentinel: bool) -> RawReport {
        let mut rows = vec![
            row(&["Genbox Strategy Report"]),
            row(&["Generated by Genbox"]),
            row(&[""]),
            row(&[
                "Ticket",
                "Open Time",
                "Type",
                "Size",
                "Item",
                "Price",
                "S / L",
                "T / P",
                "Close Time",
                "Price",
                "Commission",
                "Taxes",
                "Swap",
                "Profit",
            ]),
            row(&[
                "0", "Deposit", "Deposit", "0", "Deposit", "0", "0", "0", "Deposit", "0", "0", "0",
                "0", "10000",
            ]),
        ];
        rows.extend(body);
        if with_sentinel {
            rows.push(row(&[END_OF_DATA, "", "", "", "", "", "", "", "", "", "", "", "", "20.00"]));
        }
        rows.push(row(&["Summary"]));
        RawReport::new("eurusd_IS.html", vec![Table::from_rows(rows)])
    }

    #[test]
    fn test_parses_trades_before_sentinel() {
        let raw = report(
            vec![
                trade("1", "buy", "1.1234", "1.1264", "30.00"),
                trade("2", "sell", "1.1265", "1.1275", "-10.00"),
            ],
            true,
        );
        let log = parse(&raw, dec!(10000)).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].pips, dec!(3));
        assert_eq!(log.records()[1].pips, dec!(-1));
        assert_eq!(log.records()[1].running_balance, dec!(10020));
        assert_eq!(log.records()[0].symbol, Some(ForexPair::EurUsd));
    }

    #[test]
    fn test_missing_sentinel_is_malformed() {
        let raw = report(vec![trade("1", "buy", "1.1000", "1.1030", "30.00")], false);
        let err = parse(&raw, dec!(10000)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedReport {
                platform: Platform::Genbox,
                step: ParseStep::LocateSentinel,
                ..
            }
        ));
    }

    #[test]
    fn test_sentinel_first_is_empty_dataset() {
        let raw = report(Vec::new(), true);
        let err = parse(&raw, dec!(10000)).unwrap_err();
        assert_eq!(err.kind(), "EMPTY_DATASET");
    }

    #[test]
    fn test_unknown_symbol_is_malformed() {
        let mut bad = trade("1", "buy", "1.1000", "1.1030", "30.00");
        bad[col::SYMBOL] = Some("XAUUSD".to_string());
        let raw = report(vec![bad], true);
        assert_eq!(parse(&raw, dec!(10000)).unwrap_err().kind(), "MALFORMED_REPORT");
    }

    #[test]
    fn test_narrow_table_is_malformed() {
        let raw = RawReport::new(
            "x.html",
            vec![Table::from_rows(vec![row(&["a", "b", "c"])])],
        );
        assert!(matches!(
            parse(&raw, dec!(10000)).unwrap_err(),
            EngineError::MalformedReport {
                step: ParseStep::PromoteHeader,
                ..
            }
        ));
    }
}
