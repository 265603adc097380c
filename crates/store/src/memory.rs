//! In-process row store.
//!
//! Used for local development and tests. Contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use ledgerly_core::ledger::{Row, Table};
use ledgerly_shared::TableNames;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::repository::sheet_name;
use crate::row_store::{RowGuard, RowStore};

/// Row store held in memory.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    sheets: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryRowStore {
    /// Creates an empty store with no sheets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one sheet per ledger table, each holding only
    /// its header row.
    #[must_use]
    pub fn with_ledger_tables(names: &TableNames) -> Self {
        let sheets = Table::ALL
            .into_iter()
            .map(|table| {
                (
                    sheet_name(names, table).to_string(),
                    vec![table.schema().header_row()],
                )
            })
            .collect();
        Self {
            sheets: RwLock::new(sheets),
        }
    }

    /// Adds or replaces a sheet.
    pub async fn insert_sheet(&self, name: impl Into<String>, rows: Vec<Row>) {
        self.sheets.write().await.insert(name.into(), rows);
    }

    fn data_row<'a>(
        rows: &'a mut [Row],
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
    ) -> Result<&'a mut Row, StoreError> {
        let idx = row_number
            .checked_sub(1)
            .filter(|idx| *idx >= 1 && *idx < rows.len())
            .ok_or_else(|| StoreError::RowOutOfRange {
                sheet: sheet.to_string(),
                row: row_number,
            })?;
        let row = &mut rows[idx];
        if guard.matches(row) {
            Ok(row)
        } else {
            Err(guard.stale(sheet, row_number))
        }
    }
}

fn unknown(sheet: &str) -> StoreError {
    StoreError::UnknownSheet(sheet.to_string())
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn append_row(&self, sheet: &str, row: Row) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        sheets.get_mut(sheet).ok_or_else(|| unknown(sheet))?.push(row);
        Ok(())
    }

    async fn read_range(&self, sheet: &str) -> Result<Vec<Row>, StoreError> {
        let sheets = self.sheets.read().await;
        sheets.get(sheet).cloned().ok_or_else(|| unknown(sheet))
    }

    async fn update_row(
        &self,
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
        row: Row,
    ) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.get_mut(sheet).ok_or_else(|| unknown(sheet))?;
        *Self::data_row(rows, sheet, row_number, guard)? = row;
        Ok(())
    }

    async fn delete_row(
        &self,
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
    ) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.get_mut(sheet).ok_or_else(|| unknown(sheet))?;
        Self::data_row(rows, sheet, row_number, guard)?;
        rows.remove(row_number - 1);
        Ok(())
    }
}
