//! Canonicalization shared by every platform parser.
//!
//! Parsers reduce their platform-specific tables to [`RawTrade`] rows; this
//! module validates them, derives running balance and pips, and produces the
//! final [`TradeLog`].

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::meta::Platform;
use super::pips::{PriceLeg, scale_pips};
use super::types::{Direction, ForexPair, TradeLog, TradeRecord};
use crate::error::{EngineError, ParseStep, Result};

/// One trade as read from a platform table, before derived columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTrade {
    pub open_time: NaiveDateTime,
    pub close_time: NaiveDateTime,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub direction: Direction,
    pub volume: Decimal,
    pub symbol: Option<ForexPair>,
    pub open_price: Decimal,
    pub close_price: Decimal,
    pub profit: Decimal,
}

/// Build the canonical trade log.
///
/// Returns `Ok(None)` when `trades` is empty so the caller can raise
/// [`EngineError::EmptyDataset`] with the file name.
pub fn build_trade_log(
    platform: Platform,
    trades: Vec<RawTrade>,
    deposit: Decimal,
) -> Result<Option<TradeLog>> {
    for (idx, t) in trades.iter().enumerate() {
        if t.close_time < t.open_time {
            return Err(EngineError::malformed(
                platform,
                ParseStep::CoerceColumns,
                format!(
                    "trade {idx} closes at {} before it opens at {}",
                    t.close_time, t.open_time
                ),
            ));
        }
        if t.volume <= Decimal::ZERO {
            return Err(EngineError::malformed(
                platform,
                ParseStep::CoerceColumns,
                format!("trade {idx} has non-positive volume {}", t.volume),
            ));
        }
    }

    let legs: Vec<PriceLeg> = trades
        .iter()
        .map(|t| PriceLeg {
            direction: t.direction,
            open_price: t.open_price,
            close_price: t.close_price,
        })
        .collect();

    let mut symbols: Vec<ForexPair> = trades.iter().filter_map(|t| t.symbol).collect();
    symbols.sort_unstable();
    symbols.dedup();
    let pips = scale_pips(platform, &legs, symbols.len() > 1)?;

    let mut balance = deposit;
    let records = trades
        .into_iter()
        .zip(pips)
        .map(|(t, pips)| {
            balance += t.profit;
            TradeRecord {
                open_time: t.open_time,
                close_time: t.close_time,
                stop_loss: t.stop_loss,
                take_profit: t.take_profit,
                direction: t.direction,
                volume: t.volume,
                symbol: t.symbol,
                open_price: t.open_price,
                close_price: t.close_price,
                pips,
                profit: t.profit,
                running_balance: balance,
            }
        })
        .collect();

    Ok(TradeLog::new(records))
}
