//! Native-currency units
//!
//! Amounts are held as integer base units with 18 decimal places, so
//! `"0.1"` coins is `100_000_000_000_000_000` base units.

use crate::multisig::Amount;
use thiserror::Error;

/// Decimal places of one whole coin
pub const DECIMALS: usize = 18;

/// Base units in one whole coin
pub const COIN: Amount = 1_000_000_000_000_000_000;

/// Errors raised while parsing an amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    InvalidNumber(String),
    #[error("Too many decimal places: {0} (max {DECIMALS})")]
    TooManyDecimals(usize),
    #[error("Amount too large")]
    Overflow,
}

/// Parse a decimal coin amount into base units
pub fn parse_amount(input: &str) -> Result<Amount, UnitsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::InvalidNumber(input.to_string()));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UnitsError::InvalidNumber(input.to_string()));
    }
    if frac.len() > DECIMALS {
        return Err(UnitsError::TooManyDecimals(frac.len()));
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<Amount>()
            .map_err(|_| UnitsError::Overflow)?
            .checked_mul(COIN)
            .ok_or(UnitsError::Overflow)?
    };

    let frac_units = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = DECIMALS);
        padded
            .parse::<Amount>()
            .map_err(|_| UnitsError::InvalidNumber(input.to_string()))?
    };

    whole_units
        .checked_add(frac_units)
        .ok_or(UnitsError::Overflow)
}

/// Format base units as a decimal coin amount without trailing zeros
pub fn format_amount(amount: Amount) -> String {
    let whole = amount / COIN;
    let frac = amount % COIN;

    if frac == 0 {
        return whole.to_string();
    }

    let frac = format!("{:0>width$}", frac, width = DECIMALS);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0.1").unwrap(), 100_000_000_000_000_000);
        assert_eq!(parse_amount("1").unwrap(), COIN);
        assert_eq!(parse_amount("2.5").unwrap(), 2 * COIN + COIN / 2);
        assert_eq!(parse_amount(".5").unwrap(), COIN / 2);
        assert_eq!(parse_amount("3.").unwrap(), 3 * COIN);
        assert_eq!(parse_amount("0.000000000000000001").unwrap(), 1);
        assert_eq!(parse_amount(" 7 ").unwrap(), 7 * COIN);
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse_amount(""), Err(UnitsError::Empty));
        assert!(matches!(parse_amount("."), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(parse_amount("-1"), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(parse_amount("1.2.3"), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(parse_amount("abc"), Err(UnitsError::InvalidNumber(_))));
        assert_eq!(
            parse_amount("0.0000000000000000001"),
            Err(UnitsError::TooManyDecimals(19))
        );
        assert_eq!(
            parse_amount("999999999999999999999999999999"),
            Err(UnitsError::Overflow)
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(COIN), "1");
        assert_eq!(format_amount(100_000_000_000_000_000), "0.1");
        assert_eq!(format_amount(COIN + 1), "1.000000000000000001");
        assert_eq!(format_amount(parse_amount("12.345").unwrap()), "12.345");
    }
}
