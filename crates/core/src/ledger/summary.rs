//! Dashboard totals over decoded ledger records.

use ledgerly_shared::types::{decimal_from_cell, round_money};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::codec::Record;

/// Totals shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// Number of sales.
    pub sales_count: usize,
    /// Sum of sale gross amounts.
    pub gross_sales: Decimal,
    /// Sum of amounts paid.
    pub amount_collected: Decimal,
    /// Sum of balances still due.
    pub balance_outstanding: Decimal,
    /// Sum of sale tax.
    pub sales_tax: Decimal,
    /// Number of expenses.
    pub expenses_count: usize,
    /// Sum of expense totals.
    pub total_expenses: Decimal,
    /// Sum of expense tax.
    pub expenses_tax: Decimal,
    /// Gross sales minus expenses.
    pub net_income: Decimal,
    /// Items below their reorder threshold.
    pub low_stock: Vec<LowStockItem>,
    /// Non-blank numeric cells that could not be parsed and were counted as zero.
    pub unparsed_cells: usize,
}

/// An inventory item below its minimum stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockItem {
    /// Item code.
    pub code: String,
    /// Item name.
    pub name: String,
    /// Stock on hand.
    pub current_stock: Decimal,
    /// Reorder threshold.
    pub minimum_stock: Decimal,
}

struct Totals {
    unparsed: usize,
}

impl Totals {
    fn amount(&mut self, record: &Record, field: &str) -> Decimal {
        match record.get(field) {
            None | Some(Value::Null) => Decimal::ZERO,
            Some(Value::String(s)) if s.trim().is_empty() => Decimal::ZERO,
            Some(cell) => decimal_from_cell(cell).unwrap_or_else(|| {
                self.unparsed += 1;
                Decimal::ZERO
            }),
        }
    }

    fn sum(&mut self, records: &[Record], field: &str) -> Decimal {
        let total = records.iter().fold(Decimal::ZERO, |acc, record| {
            let amount = self.amount(record, field);
            acc.saturating_add(amount)
        });
        round_money(total)
    }
}

fn text_of(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Computes dashboard totals.
#[must_use]
pub fn summarize(sales: &[Record], expenses: &[Record], inventory: &[Record]) -> LedgerSummary {
    let mut totals = Totals { unparsed: 0 };

    let gross_sales = totals.sum(sales, "gross_amount");
    let amount_collected = totals.sum(sales, "amount_paid");
    let balance_outstanding = totals.sum(sales, "balance_due");
    let sales_tax = totals.sum(sales, "tax");
    let total_expenses = totals.sum(expenses, "total_amount");
    let expenses_tax = totals.sum(expenses, "tax");

    let low_stock = inventory
        .iter()
        .filter_map(|record| {
            let current = record.get("current_stock").and_then(decimal_from_cell)?;
            let minimum = record.get("minimum_stock").and_then(decimal_from_cell)?;
            (current < minimum).then(|| LowStockItem {
                code: text_of(record, "code"),
                name: text_of(record, "name"),
                current_stock: current,
                minimum_stock: minimum,
            })
        })
        .collect();

    LedgerSummary {
        sales_count: sales.len(),
        gross_sales,
        amount_collected,
        balance_outstanding,
        sales_tax,
        expenses_count: expenses.len(),
        total_expenses,
        expenses_tax,
        net_income: round_money(gross_sales.saturating_sub(total_expenses)),
        low_stock,
        unparsed_cells: totals.unparsed,
    }
}
