//! Small-business ledger logic.
//!
//! This module implements the ledger core:
//! - Sale arithmetic (gross, balance due, tax)
//! - Positional row codec per table schema
//! - Table catalogue (sales, expenses, clients, inventory)
//! - Typed create and patch payloads
//! - Ledger service turning payloads into rows
//! - Dashboard summary over decoded records
//! - Error types for ledger operations

pub mod codec;
pub mod error;
pub mod sale;
pub mod service;
pub mod summary;
pub mod table;
pub mod types;

#[cfg(test)]
mod sale_props;
#[cfg(test)]
mod service_props;

pub use codec::{Record, Row, Schema, decode, encode, encode_new};
pub use error::LedgerError;
pub use sale::{SaleAmounts, SaleInput, compute_sale, line_total, recompute_balance, tax_for};
pub use service::{LedgerService, MutationContext, sort_recent};
pub use summary::{LedgerSummary, LowStockItem, summarize};
pub use table::Table;
pub use types::{
    ClientPatch, CreateClient, CreateExpense, CreateInventoryItem, CreateSale, ExpensePatch,
    InventoryPatch, Patch, SalePatch, StockAdjustment,
};
