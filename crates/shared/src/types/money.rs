//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal`, rounded half away from zero to cents.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Sales tax rate applied to gross amounts (16%).
pub const TAX_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);

/// Rounds to two decimals and pins the scale, so `30` renders as `30.00`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Renders an amount as a spreadsheet cell.
#[must_use]
pub fn money_cell(amount: Decimal) -> Value {
    Value::String(round_money(amount).to_string())
}

/// Reads a decimal out of a cell.
///
/// Accepts JSON numbers and strings, tolerating a leading `$` and thousands
/// separators the way formatted spreadsheet cells come back. Blank cells and
/// anything unparseable yield `None`.
#[must_use]
pub fn decimal_from_cell(cell: &Value) -> Option<Decimal> {
    match cell {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}
