//! MetaTrader 4 strategy tester report parser.
//!
//! MT4 reports carry two tables. The first is a header whose first row names
//! the instrument (`EURUSD (Euro vs US Dollar)`). The second lists one row per
//! order event: the opening fill, then any modifications, then the close.
//! Rows are grouped by order number to rebuild each trade.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::str::FromStr;
use tracing::{debug, warn};

use super::canonical::{RawTrade, build_trade_log};
use super::cells::RowReader;
use super::document::{RawReport, Table};
use super::meta::Platform;
use super::types::{ForexPair, TradeLog};
use crate::error::{EngineError, ParseStep, Result};

const PLATFORM: Platform = Platform::Mt4;

/// Header table cell holding the instrument description.
const SYMBOL_CELL: (usize, usize) = (0, 2);

mod col {
    pub const TIME: usize = 1;
    pub const TYPE: usize = 2;
    pub const ORDER: usize = 3;
    pub const SIZE: usize = 4;
    pub const PRICE: usize = 5;
    pub const STOP_LOSS: usize = 6;
    pub const TAKE_PROFIT: usize = 7;
    pub const PROFIT: usize = 8;
}

const MIN_COLUMNS: usize = 9;

/// Parse an MT4 report into a trade log.
pub fn parse(raw: &RawReport, deposit: Decimal) -> Result<TradeLog> {
    let [header, operations] = raw.tables() else {
        return Err(EngineError::malformed(
            PLATFORM,
            ParseStep::ReadTables,
            format!("expected 2 tables, found {}", raw.tables().len()),
        ));
    };

    let symbol = read_symbol(header)?;

    if operations.width() < MIN_COLUMNS {
        return Err(EngineError::malformed(
            PLATFORM,
            ParseStep::PromoteHeader,
            format!(
                "expected at least {MIN_COLUMNS} operation columns, found {}",
                operations.width()
            ),
        ));
    }

    let groups = group_orders(operations)?;
    debug!(file = %raw.file_name(), orders = groups.len(), %symbol, "Grouped MT4 orders");

    let mut trades = Vec::with_capacity(groups.len());
    for (order, rows) in groups {
        if rows.len() < 2 {
            warn!(file = %raw.file_name(), order = %order, "Skipping MT4 order without a closing row");
            continue;
        }
        trades.push(read_trade(symbol, &rows)?);
    }

    build_trade_log(PLATFORM, trades, deposit)?.ok_or_else(|| EngineError::EmptyDataset {
        file: raw.file_name().to_string(),
    })
}

/// Instrument named in the header table.
pub fn read_symbol(header: &Table) -> Result<ForexPair> {
    let (row, col) = SYMBOL_CELL;
    let text = header.cell(row, col).ok_or_else(|| {
        EngineError::malformed(PLATFORM, ParseStep::ReadSymbol, "header has no symbol cell")
    })?;
    let code = text.split_whitespace().next().unwrap_or_default();
    ForexPair::from_str(code)
        .map_err(|e| EngineError::malformed(PLATFORM, ParseStep::ReadSymbol, e))
}

type OrderRows<'a> = Vec<(usize, &'a [Option<String>])>;

/// Operation rows grouped by order number, in order of first appearance.
fn group_orders(operations: &Table) -> Result<Vec<(String, OrderRows<'_>)>> {
    let mut groups: Vec<(String, OrderRows<'_>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    // Row 0 is the column header.
    for (idx, row) in operations.rows().iter().enumerate().skip(1) {
        let order = RowReader::new(PLATFORM, idx, row)
            .text(col::ORDER)
            .map_err(|_| {
                EngineError::malformed(
                    PLATFORM,
                    ParseStep::GroupOrders,
                    format!("row {idx} has no order number"),
                )
            })?
            .to_string();

        match index.entry(order) {
            Entry::Occupied(slot) => groups[*slot.get()].1.push((idx, row.as_slice())),
            Entry::Vacant(slot) => {
                groups.push((slot.key().clone(), vec![(idx, row.as_slice())]));
                slot.insert(groups.len() - 1);
            }
        }
    }
    Ok(groups)
}

fn read_trade(symbol: ForexPair, rows: &OrderRows<'_>) -> Result<RawTrade> {
    let (Some(&(first_idx, first)), Some(&(last_idx, last))) = (rows.first(), rows.last()) else {
        return Err(EngineError::malformed(
            PLATFORM,
            ParseStep::GroupOrders,
            "order group is empty",
        ));
    };
    let opening = RowReader::new(PLATFORM, first_idx, first);
    let closing = RowReader::new(PLATFORM, last_idx, last);

    Ok(RawTrade {
        open_time: opening.datetime(col::TIME)?,
        close_time: closing.datetime(col::TIME)?,
        stop_loss: optional_level(&opening, col::STOP_LOSS)?,
        take_profit: optional_level(&opening, col::TAKE_PROFIT)?,
        direction: opening.direction(col::TYPE)?,
        volume: opening.decimal(col::SIZE)?,
        symbol: Some(symbol),
        open_price: opening.decimal(col::PRICE)?,
        close_price: closing.decimal(col::PRICE)?,
        profit: closing.decimal(col::PROFIT)?,
    })
}

/// S/L and T/P are left blank when unset.
fn optional_level(reader: &RowReader<'_>, col: usize) -> Result<Decimal> {
    match reader.optional_text(col) {
        Some(_) => reader.decimal(col),
        None => Ok(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some((*c).to_string()) })
            .collect()
    }

    fn header() -> Table {
        Table::from_rows(vec![
            row(&["Symbol", "", "EURUSD (Euro vs US Dollar)"]),
            row(&["Period", "", "1 Hour (H1)"]),
        ])
    }

    fn operations(rows: Vec<Vec<Option<String>>>) -> Table {
        let mut all = vec![row(&[
            "#", "Time", "Type", "Order", "Size", "Price", "S / L", "T / P", "Profit", "Balance",
        ])];
        all.extend(rows);
        Table::from_rows(all)
    }

    #[test]
    fn test_groups_open_and_close_rows() {
        let ops = operations(vec![
            row(&["1", "2022.01.03 10:00", "buy", "1", "0.10", "1.1234", "1.1200", "1.1300", "", ""]),
            row(&["2", "2022.01.03 11:00", "sell", "2", "0.20", "1.1240", "", "", "", ""]),
            row(&["3", "2022.01.03 12:00", "t/p", "1", "0.10", "1.1300", "1.1200", "1.1300", "66.00", "10066.00"]),
            row(&["4", "2022.01.03 13:00", "close", "2", "0.20", "1.1250", "", "", "-20.00", "10046.00"]),
        ]);
        let raw = RawReport::new("eurusd_OS.html", vec![header(), ops]);
        let log = parse(&raw, dec!(10000)).unwrap();

        assert_eq!(log.len(), 2);
        let first = &log.records()[0];
        assert_eq!(first.symbol, Some(ForexPair::EurUsd));
        assert_eq!(first.close_price, dec!(1.1300));
        assert_eq!(first.pips, dec!(6.6));
        assert_eq!(first.take_profit, dec!(1.1300));
        let second = &log.records()[1];
        assert_eq!(second.pips, dec!(-1));
        assert_eq!(second.stop_loss, Decimal::ZERO);
        assert_eq!(second.running_balance, dec!(10046));
    }

    #[test]
    fn test_interleaved_orders_keep_first_appearance_order() {
        let ops = operations(vec![
            row(&["1", "2022.01.03 10:00", "buy", "7", "0.10", "1.1234", "", "", "", ""]),
            row(&["2", "2022.01.03 10:30", "sell", "3", "0.10", "1.1240", "", "", "", ""]),
            row(&["3", "2022.01.03 11:00", "modify", "7", "0.10", "1.1234", "1.1200", "", "", ""]),
            row(&["4", "2022.01.03 12:00", "close", "3", "0.10", "1.1230", "", "", "10.00", "10010.00"]),
            row(&["5", "2022.01.03 13:00", "close", "7", "0.10", "1.1254", "", "", "20.00", "10030.00"]),
        ]);
        let groups = group_orders(&ops).unwrap();

        let summary: Vec<(&str, Vec<usize>)> = groups
            .iter()
            .map(|(order, rows)| (order.as_str(), rows.iter().map(|(idx, _)| *idx).collect()))
            .collect();
        assert_eq!(summary, vec![("7", vec![1, 3, 5]), ("3", vec![2, 4])]);
    }

    #[test]
    fn test_unclosed_order_is_skipped() {
        let ops = operations(vec![
            row(&["1", "2022.01.03 10:00", "buy", "1", "0.10", "1.1234", "", "", "", ""]),
            row(&["2", "2022.01.03 12:00", "close", "1", "0.10", "1.1244", "", "", "10.00", "10010.00"]),
            row(&["3", "2022.01.04 10:00", "sell", "2", "0.10", "1.1250", "", "", "", ""]),
        ]);
        let raw = RawReport::new("eurusd.html", vec![header(), ops]);
        let log = parse(&raw, dec!(10000)).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_unknown_header_symbol_is_malformed() {
        let bad = Table::from_rows(vec![row(&["Symbol", "", "XAUUSD (Gold)"])]);
        let err = read_symbol(&bad).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedReport {
                step: ParseStep::ReadSymbol,
                ..
            }
        ));
    }

    #[test]
    fn test_only_open_rows_is_empty_dataset() {
        let ops = operations(vec![row(&[
            "1", "2022.01.03 10:00", "buy", "1", "0.10", "1.1234", "", "", "", "",
        ])]);
        let raw = RawReport::new("eurusd.html", vec![header(), ops]);
        assert_eq!(parse(&raw, dec!(10000)).unwrap_err().kind(), "EMPTY_DATASET");
    }
}
