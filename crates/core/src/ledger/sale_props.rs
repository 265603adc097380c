//! Property-based tests for sale arithmetic.

use chrono::NaiveDate;
use ledgerly_shared::types::round_money;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::sale::{SaleInput, compute_sale};

/// Strategy to generate a non-negative amount with up to 2 decimals.
fn money_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a non-negative quantity with up to 3 decimals.
fn quantity() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|milli| Decimal::new(milli, 3))
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Gross minus balance always equals what was paid.
    #[test]
    fn prop_gross_minus_balance_is_paid(
        quantity in quantity(),
        unit_price in money_amount(),
        paid in money_amount(),
    ) {
        let amounts = compute_sale(
            &SaleInput { quantity, unit_price, amount_paid: Some(paid), date: None },
            today(),
        ).unwrap();

        prop_assert_eq!(amounts.gross_amount - amounts.balance_due, paid);
    }

    /// Tax is always 16% of the rounded gross.
    #[test]
    fn prop_tax_is_sixteen_percent_of_gross(
        quantity in quantity(),
        unit_price in money_amount(),
    ) {
        let amounts = compute_sale(
            &SaleInput { quantity, unit_price, amount_paid: None, date: None },
            today(),
        ).unwrap();

        prop_assert_eq!(amounts.tax, round_money(amounts.gross_amount * Decimal::new(16, 2)));
        prop_assert!(amounts.tax <= amounts.gross_amount);
    }

    /// Every derived amount carries exactly two decimals.
    #[test]
    fn prop_amounts_have_cent_scale(
        quantity in quantity(),
        unit_price in money_amount(),
        paid in money_amount(),
    ) {
        let amounts = compute_sale(
            &SaleInput { quantity, unit_price, amount_paid: Some(paid), date: None },
            today(),
        ).unwrap();

        prop_assert_eq!(amounts.gross_amount.scale(), 2);
        prop_assert_eq!(amounts.balance_due.scale(), 2);
        prop_assert_eq!(amounts.tax.scale(), 2);
    }
}
