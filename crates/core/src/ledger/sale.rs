//! Sale arithmetic.
//!
//! Every amount is rounded half away from zero to two decimals:
//!
//! - `gross_amount = round(quantity * unit_price)`
//! - `balance_due  = round(gross_amount - amount_paid)`
//! - `tax          = round(gross_amount * 0.16)`

use chrono::NaiveDate;
use ledgerly_shared::types::{TAX_RATE, round_money};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::LedgerError;

/// Inputs of a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleInput {
    /// Units sold.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Partial payment received, zero when absent.
    pub amount_paid: Option<Decimal>,
    /// Sale date, today when absent.
    pub date: Option<NaiveDate>,
}

/// Derived amounts of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleAmounts {
    /// Effective sale date.
    pub date: NaiveDate,
    /// `quantity * unit_price`.
    pub gross_amount: Decimal,
    /// Amount already paid.
    pub amount_paid: Decimal,
    /// `gross_amount - amount_paid`.
    pub balance_due: Decimal,
    /// 16% of the gross amount.
    pub tax: Decimal,
}

/// Fails with `NegativeAmount` when `value` is below zero.
pub fn ensure_non_negative(field: &'static str, value: Decimal) -> Result<(), LedgerError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LedgerError::NegativeAmount(field));
    }
    Ok(())
}

/// `round(quantity * unit_price)`, reported against `field` on overflow.
pub fn line_total(
    quantity: Decimal,
    unit_price: Decimal,
    field: &'static str,
) -> Result<Decimal, LedgerError> {
    quantity
        .checked_mul(unit_price)
        .map(round_money)
        .ok_or(LedgerError::Overflow(field))
}

/// `round(gross - paid)`.
pub fn recompute_balance(gross: Decimal, paid: Decimal) -> Result<Decimal, LedgerError> {
    gross
        .checked_sub(paid)
        .map(round_money)
        .ok_or(LedgerError::Overflow("balance_due"))
}

/// `round(gross * 0.16)`.
pub fn tax_for(gross: Decimal) -> Result<Decimal, LedgerError> {
    gross
        .checked_mul(TAX_RATE)
        .map(round_money)
        .ok_or(LedgerError::Overflow("tax"))
}

/// Computes the derived amounts of a new sale.
///
/// # Errors
///
/// Returns `LedgerError::NegativeAmount` for negative inputs and
/// `LedgerError::Overflow` when the product leaves the decimal range.
pub fn compute_sale(input: &SaleInput, today: NaiveDate) -> Result<SaleAmounts, LedgerError> {
    let amount_paid = input.amount_paid.unwrap_or(Decimal::ZERO);
    ensure_non_negative("quantity", input.quantity)?;
    ensure_non_negative("unit_price", input.unit_price)?;
    ensure_non_negative("amount_paid", amount_paid)?;

    let gross_amount = line_total(input.quantity, input.unit_price, "gross_amount")?;
    let amount_paid = round_money(amount_paid);
    let balance_due = recompute_balance(gross_amount, amount_paid)?;
    let tax = tax_for(gross_amount)?;

    Ok(SaleAmounts {
        date: input.date.unwrap_or(today),
        gross_amount,
        amount_paid,
        balance_due,
        tax,
    })
}
