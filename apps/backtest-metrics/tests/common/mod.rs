//! Report fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;

const OPEN_PRICE: &str = "1.1234";
const POINT: i64 = 1000;

/// Start of the first fixture trade.
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 3, 1)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

fn stamp(t: NaiveDateTime) -> String {
    t.format("%Y.%m.%d %H:%M").to_string()
}

fn cells(values: &[String]) -> String {
    values.iter().map(|v| format!("<td>{v}</td>")).collect()
}

/// One Genbox trade row: buy EURUSD opened at 1.1234, one per day, two hours long.
pub fn genbox_row(ticket: usize, open: &str, close: &str, profit: Decimal) -> String {
    let open_time = base_time() + TimeDelta::days(ticket as i64);
    let close_time = open_time + TimeDelta::hours(2);
    let row = [
        ticket.to_string(),
        stamp(open_time),
        "buy".to_string(),
        "0.10".to_string(),
        "EURUSD".to_string(),
        open.to_string(),
        "0".to_string(),
        "0".to_string(),
        stamp(close_time),
        close.to_string(),
        "0".to_string(),
        "0".to_string(),
        "0".to_string(),
        profit.to_string(),
    ];
    format!("<tr>{}</tr>", cells(&row))
}

/// Genbox report wrapping already rendered trade rows.
pub fn genbox_report(rows: &[String], with_sentinel: bool) -> String {
    let header = [
        "Ticket", "Open Time", "Type", "Size", "Item", "Price", "S / L", "T / P", "Close Time",
        "Price", "Commission", "Taxes", "Swap", "Profit",
    ]
    .map(String::from);
    let deposit = [
        "0", "Deposit", "Deposit", "0", "Deposit", "0", "0", "0", "Deposit", "0", "0", "0", "0",
        "10000",
    ]
    .map(String::from);
    let sentinel = if with_sentinel {
        r#"<tr><td>Closed P/L:</td><td colspan="12"></td><td>0.00</td></tr>"#
    } else {
        ""
    };

    format!(
        r#"<html><body><table>
<tr><td colspan="14">Genbox Strategy Report</td></tr>
<tr><td colspan="14">Generated by Genbox</td></tr>
<tr>{}</tr>
<tr>{}</tr>
{}
{sentinel}
</table></body></html>"#,
        cells(&header),
        cells(&deposit),
        rows.join("\n"),
    )
}

/// Genbox report whose trades realize exactly `pips`.
pub fn genbox_with_pips(pips: &[i64]) -> String {
    let open = Decimal::from_str_exact(OPEN_PRICE).unwrap();
    let rows: Vec<String> = pips
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let close = (open + Decimal::new(p, 0) / Decimal::new(POINT, 0)).round_dp(4);
            genbox_row(i + 1, OPEN_PRICE, &format!("{close:.4}"), Decimal::new(p * 10, 0))
        })
        .collect();
    genbox_report(&rows, true)
}

/// Two-table MT4 report with one buy order per entry of `pips`.
pub fn mt4_with_pips(pips: &[i64]) -> String {
    let open = Decimal::from_str_exact(OPEN_PRICE).unwrap();
    let mut balance = Decimal::new(10_000, 0);
    let mut rows = Vec::new();
    for (i, &p) in pips.iter().enumerate() {
        let order = i + 1;
        let open_time = base_time() + TimeDelta::days(i as i64);
        let close_time = open_time + TimeDelta::hours(6);
        let close = (open + Decimal::new(p, 0) / Decimal::new(POINT, 0)).round_dp(4);
        let profit = Decimal::new(p * 10, 0);
        balance += profit;
        rows.push(format!(
            "<tr>{}</tr>",
            cells(&[
                (2 * i + 1).to_string(),
                stamp(open_time),
                "buy".to_string(),
                order.to_string(),
                "0.10".to_string(),
                OPEN_PRICE.to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ])
        ));
        rows.push(format!(
            "<tr>{}</tr>",
            cells(&[
                (2 * i + 2).to_string(),
                stamp(close_time),
                "close".to_string(),
                order.to_string(),
                "0.10".to_string(),
                format!("{close:.4}"),
                String::new(),
                String::new(),
                format!("{profit:.2}"),
                format!("{balance:.2}"),
            ])
        ));
    }

    format!(
        r#"<html><body>
<table><tr><td>Symbol</td><td></td><td>EURUSD (Euro vs US Dollar)</td></tr></table>
<table>
<tr><th>#</th><th>Time</th><th>Type</th><th>Order</th><th>Size</th><th>Price</th><th>S / L</th><th>T / P</th><th>Profit</th><th>Balance</th></tr>
{}
</table></body></html>"#,
        rows.join("\n")
    )
}
