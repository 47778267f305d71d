//! Pip scaling: converts price deltas into pips from quoted price precision.
//!
//! The point value of an instrument is `10^(precision - 1)`, where precision is
//! the number of significant digits after the decimal separator of a quoted
//! price (`1.1050` has precision 3, `1.10512` has precision 5). A whole-number
//! price has no defined precision and is rejected.
//!
//! Single-symbol logs take their precision from the first record's open price
//! and apply it to every record; mixed-symbol logs compute it per record.

use rust_decimal::Decimal;

use super::meta::Platform;
use crate::error::{EngineError, ParseStep, Result};
use crate::report::types::Direction;

/// Inputs the scaler needs from each record.
#[derive(Debug, Clone, Copy)]
pub struct PriceLeg {
    /// Trade direction.
    pub direction: Direction,
    /// Entry price.
    pub open_price: Decimal,
    /// Exit price.
    pub close_price: Decimal,
}

/// Digits after the decimal separator, ignoring trailing zeros.
pub fn price_precision(platform: Platform, price: Decimal) -> Result<u32> {
    let precision = price.normalize().scale();
    if precision == 0 {
        return Err(EngineError::malformed(
            platform,
            ParseStep::PipScaling,
            format!("price {price} has no fractional digits; pip precision is undefined"),
        ));
    }
    Ok(precision)
}

/// Point value for a given precision: `10^(precision - 1)`.
#[must_use]
pub fn point_value(precision: u32) -> Decimal {
    Decimal::from_i128_with_scale(10_i128.pow(precision - 1), 0)
}

/// Pips for every leg, in order.
///
/// `multi_symbol` selects per-record precision; otherwise the first leg's
/// open price fixes the point value for the whole log.
pub fn scale_pips(platform: Platform, legs: &[PriceLeg], multi_symbol: bool) -> Result<Vec<Decimal>> {
    let Some(first) = legs.first() else {
        return Ok(Vec::new());
    };

    let shared_point = if multi_symbol {
        None
    } else {
        Some(point_value(price_precision(platform, first.open_price)?))
    };

    legs.iter()
        .map(|leg| {
            let point = match shared_point {
                Some(p) => p,
                None => point_value(price_precision(platform, leg.open_price)?),
            };
            Ok((leg.close_price - leg.open_price) * point * leg.direction.multiplier())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(direction: Direction, open: Decimal, close: Decimal) -> PriceLeg {
        PriceLeg {
            direction,
            open_price: open,
            close_price: close,
        }
    }

    #[test]
    fn test_precision_ignores_trailing_zeros() {
        assert_eq!(price_precision(Platform::Genbox, dec!(1.10500)), Ok(3));
        assert_eq!(price_precision(Platform::Genbox, dec!(1.10512)), Ok(5));
        assert_eq!(price_precision(Platform::Genbox, dec!(110.123)), Ok(3));
    }

    #[test]
    fn test_whole_number_price_is_fatal() {
        let err = price_precision(Platform::Mt4, dec!(110)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedReport {
                step: ParseStep::PipScaling,
                ..
            }
        ));
        assert!(price_precision(Platform::Mt4, dec!(110.00)).is_err());
    }

    #[test]
    fn test_point_value() {
        assert_eq!(point_value(1), dec!(1));
        assert_eq!(point_value(4), dec!(1000));
        assert_eq!(point_value(5), dec!(10000));
    }

    #[test]
    fn test_sign_follows_direction() {
        let legs = [
            leg(Direction::Buy, dec!(1.1234), dec!(1.1244)),
            leg(Direction::Sell, dec!(1.1234), dec!(1.1244)),
        ];
        let pips = scale_pips(Platform::Genbox, &legs, false).unwrap();
        assert_eq!(pips, vec![dec!(1.0), dec!(-1.0)]);
    }

    #[test]
    fn test_single_symbol_broadcasts_first_precision() {
        // Every open price has four decimals; a later close with fewer digits
        // does not change the point value.
        let legs = [
            leg(Direction::Buy, dec!(1.1234), dec!(1.1244)),
            leg(Direction::Buy, dec!(1.2345), dec!(1.24)),
        ];
        let pips = scale_pips(Platform::Genbox, &legs, false).unwrap();
        assert_eq!(pips[0], dec!(1.0000));
        assert_eq!(pips[1], dec!(5.5000));
    }

    #[test]
    fn test_multi_symbol_uses_per_record_precision() {
        let legs = [
            leg(Direction::Buy, dec!(1.12345), dec!(1.12355)),
            leg(Direction::Sell, dec!(110.123), dec!(110.103)),
        ];
        let pips = scale_pips(Platform::Genbox, &legs, true).unwrap();
        assert_eq!(pips[0], dec!(1));
        assert_eq!(pips[1], dec!(2));
    }
}
