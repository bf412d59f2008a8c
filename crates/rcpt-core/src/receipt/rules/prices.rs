//! Price detection and parsing.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{PRICE_AT_END, PRICE_AT_START, PRICE_LINE};

/// Check if the whole line is a bare price, e.g. `"$36.97"` or `"2.99 F"`.
pub fn is_price_line(line: &str) -> bool {
    PRICE_LINE.is_match(line.trim())
}

/// Extract the price printed on a line.
///
/// A price at the end of the line (the usual right-hand column) wins over one
/// at the start.
pub fn extract_price(line: &str) -> Option<Decimal> {
    let line = line.trim();
    PRICE_AT_END
        .captures(line)
        .or_else(|| PRICE_AT_START.captures(line))
        .and_then(|caps| parse_price(&caps[1]))
}

/// Parse a two-decimal amount such as `"1,234.56"`.
pub fn parse_price(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    Decimal::from_str(&cleaned).ok()
}
