//! Amount recognition for statement rows.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_CELL, AMOUNT_TOKEN, CR_DR_SUFFIX};

/// Parse a statement amount (e.g. "1,00,000.50", "250.00 Cr", "-15").
///
/// The Cr/Dr marker is dropped; sign conventions are left to the consumer.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if !AMOUNT_CELL.is_match(s) {
        return None;
    }
    let cleaned = CR_DR_SUFFIX.replace(s, "").replace(',', "");
    Decimal::from_str(cleaned.trim_start_matches('+')).ok()
}

/// Check if a table cell holds a numeric amount.
pub fn is_amount(s: &str) -> bool {
    parse_amount(s).is_some()
}

/// Check if a free-text token looks like a money amount (decimals required).
pub fn is_amount_token(s: &str) -> bool {
    AMOUNT_TOKEN.is_match(s.trim()) && parse_amount(s).is_some()
}
