//! Amount parsing and formatting.
//!
//! Amounts are kept as integer cents everywhere below the HTTP layer so sums
//! over many expenses stay exact. The wire format is a plain JSON number.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;
use serde_json::Value;

/// Largest accepted amount, in whole currency units.
const MAX_AMOUNT: i64 = 1_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be a number")]
    NotANumber,
    #[error("Amount must be > 0")]
    NotPositive,
    #[error("Amount is too large")]
    TooLarge,
}

/// Parse a JSON amount (number or numeric string) into positive cents.
///
/// The value is read as an exact decimal and rounded to the cent with
/// half-cents going away from zero, so `"1.005"` and `"8.675"` both round up.
///
/// # Errors
///
/// Returns an error for non-numeric input, values that round to zero cents
/// or less, and values beyond `MAX_AMOUNT`.
pub fn parse_amount(value: &Value) -> Result<i64, AmountError> {
    let amount = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
    .ok_or(AmountError::NotANumber)?;

    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(AmountError::TooLarge);
    }

    let cents = (amount * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if cents <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    cents.to_i64().ok_or(AmountError::TooLarge)
}

/// Plain (`12.5`) or exponent (`1e3`) notation. JSON numbers arrive through
/// their shortest textual form, which may use either.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)).ok()
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cents_to_f64(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// `serialize_with` adapter that writes cents as a decimal JSON number.
pub(crate) fn serialize_cents<S>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(cents_to_f64(*cents))
}

/// `1234` -> `"12.34"`.
#[must_use]
pub fn format_plain(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Format with a currency prefix and Indian digit grouping
/// (`12345678` cents -> `"৳1,23,456.78"`).
#[must_use]
pub fn format_grouped(cents: i64, symbol: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    format!("{sign}{symbol}{}.{:02}", group_indian(&units), abs % 100)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
#[path = "money_test.rs"]
mod tests;
