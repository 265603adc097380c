//! Row storage for the ledger tables.
//!
//! This crate provides:
//! - The `RowStore` abstraction over a spreadsheet-like row store
//! - An in-memory store and a Google Sheets store
//! - `LedgerRepository`, which runs create, update, delete and list flows

pub mod error;
pub mod memory;
pub mod repository;
pub mod row_store;
pub mod sheets;

pub use error::StoreError;
pub use memory::MemoryRowStore;
pub use repository::{CreatedRecord, LedgerRepository, RepositoryError};
pub use row_store::{RowGuard, RowStore, cell_text, locate_row};
pub use sheets::SheetsRowStore;
