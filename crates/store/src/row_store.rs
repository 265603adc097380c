//! The row store abstraction.
//!
//! A row store is a set of named sheets. Row 1 of every sheet is a header;
//! data starts at row 2. Row numbers are 1-based, as a spreadsheet shows them.

use async_trait::async_trait;
use ledgerly_core::ledger::Row;
use serde_json::Value;

use crate::error::StoreError;

/// Identifies the row a write is meant for.
///
/// Row numbers shift when rows above are deleted, so writes carry the key
/// the caller located and backends refuse to touch a row that no longer
/// holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGuard {
    /// Column holding the key (0-based).
    pub key_column: usize,
    /// Expected key.
    pub key: String,
}

impl RowGuard {
    /// Creates a guard for `key` in `key_column`.
    #[must_use]
    pub fn new(key_column: usize, key: impl Into<String>) -> Self {
        Self {
            key_column,
            key: key.into(),
        }
    }

    /// Whether `row` still holds the expected key.
    #[must_use]
    pub fn matches(&self, row: &[Value]) -> bool {
        row.get(self.key_column)
            .is_some_and(|cell| cell_text(cell).trim() == self.key.trim())
    }

    pub(crate) fn stale(&self, sheet: &str, row: usize) -> StoreError {
        StoreError::StaleRow {
            sheet: sheet.to_string(),
            row,
            key: self.key.clone(),
        }
    }
}

/// Text of a cell for key comparison.
#[must_use]
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Finds the first data row whose `key_column` equals `key`.
///
/// `rows` is a whole sheet including the header. Returns the 1-based row
/// number.
#[must_use]
pub fn locate_row(rows: &[Row], key_column: usize, key: &str) -> Option<usize> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| {
            row.get(key_column)
                .is_some_and(|cell| cell_text(cell).trim() == key)
        })
        .map(|(idx, _)| idx + 1)
}

/// A spreadsheet-like store of rows.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Appends `row` after the last row of `sheet`.
    async fn append_row(&self, sheet: &str, row: Row) -> Result<(), StoreError>;

    /// Reads every row of `sheet`, header included.
    async fn read_range(&self, sheet: &str) -> Result<Vec<Row>, StoreError>;

    /// Finds the 1-based row number whose `key_column` holds `key`.
    async fn find_row_by_id(
        &self,
        sheet: &str,
        key_column: usize,
        key: &str,
    ) -> Result<Option<usize>, StoreError> {
        let rows = self.read_range(sheet).await?;
        Ok(locate_row(&rows, key_column, key))
    }

    /// Overwrites row `row_number` with `row`.
    ///
    /// Fails with `StoreError::StaleRow` when the row no longer matches
    /// `guard`.
    async fn update_row(
        &self,
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
        row: Row,
    ) -> Result<(), StoreError>;

    /// Removes row `row_number`; rows below shift up.
    ///
    /// Fails with `StoreError::StaleRow` when the row no longer matches
    /// `guard`.
    async fn delete_row(
        &self,
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
    ) -> Result<(), StoreError>;
}
