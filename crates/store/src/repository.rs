//! Ledger repository: create, update, delete and read flows over a row store.
//!
//! Every flow validates and computes in `LedgerService` before it writes, so
//! a rejected payload never reaches the store. Rows are located by scanning
//! the table's key column on every call; row numbers are never cached.

use std::fmt;
use std::sync::Arc;

use ledgerly_core::ledger::{
    LedgerError, LedgerService, LedgerSummary, MutationContext, Record, Row, Table, decode,
    encode_new, sort_recent, summarize,
};
use ledgerly_shared::{AppError, TableNames};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::StoreError;
use crate::row_store::{RowGuard, RowStore, cell_text, locate_row};

/// Error types for ledger repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The request was rejected by ledger rules.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The row store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Ledger(e) => e.into(),
            RepositoryError::Store(e) => e.into(),
        }
    }
}

/// A freshly appended record and its key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedRecord {
    /// Generated ID, or the item code for inventory.
    pub id: String,
    /// Every field of the stored row.
    pub record: Record,
}

/// Sheet holding `table`.
#[must_use]
pub fn sheet_name(names: &TableNames, table: Table) -> &str {
    match table {
        Table::Sales => &names.sales,
        Table::Expenses => &names.expenses,
        Table::Clients => &names.clients,
        Table::Inventory => &names.inventory,
    }
}

fn is_blank(row: &[Value]) -> bool {
    row.iter().all(|cell| cell_text(cell).trim().is_empty())
}

/// Ledger repository over a row store.
#[derive(Clone)]
pub struct LedgerRepository {
    store: Arc<dyn RowStore>,
    sheets: Arc<TableNames>,
}

impl fmt::Debug for LedgerRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerRepository")
            .field("sheets", &self.sheets)
            .finish_non_exhaustive()
    }
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub fn new(store: Arc<dyn RowStore>, sheets: TableNames) -> Self {
        Self {
            store,
            sheets: Arc::new(sheets),
        }
    }

    fn sheet(&self, table: Table) -> &str {
        sheet_name(&self.sheets, table)
    }

    /// Locates `key` in `table`, returning its row number and current cells.
    async fn locate(&self, table: Table, key: &str) -> Result<(usize, Row), RepositoryError> {
        let mut rows = self.store.read_range(self.sheet(table)).await?;
        let row_number = locate_row(&rows, table.schema().key_column(), key).ok_or_else(|| {
            LedgerError::NotFound {
                table,
                key: key.to_string(),
            }
        })?;
        Ok((row_number, rows.swap_remove(row_number - 1)))
    }

    /// Validates `payload`, derives computed fields and appends the row.
    ///
    /// Inventory codes must be unique; a second item with the same code is
    /// rejected with `LedgerError::Duplicate`.
    pub async fn create(
        &self,
        table: Table,
        payload: Value,
        ctx: &MutationContext<'_>,
    ) -> Result<CreatedRecord, RepositoryError> {
        let schema = table.schema();
        let record = LedgerService::build_record(table, payload, ctx)?;
        let id = record
            .get(schema.key_field)
            .map(cell_text)
            .unwrap_or_default();

        if table.id_prefix().is_none() {
            let rows = self.store.read_range(self.sheet(table)).await?;
            if locate_row(&rows, schema.key_column(), &id).is_some() {
                return Err(LedgerError::Duplicate { table, key: id }.into());
            }
        }

        self.store
            .append_row(self.sheet(table), encode_new(&record, schema))
            .await?;

        info!(table = %table, id = %id, "Record created");
        Ok(CreatedRecord { id, record })
    }

    /// Applies `patch` to the row keyed `key` and returns the stored record.
    ///
    /// The patch is validated before the row is looked up, so a malformed
    /// patch is rejected even when the key is unknown. Fields absent from the
    /// patch keep their stored values; derived amounts are recomputed from
    /// the result.
    pub async fn update(
        &self,
        table: Table,
        key: &str,
        patch: Value,
        ctx: &MutationContext<'_>,
    ) -> Result<Record, RepositoryError> {
        let schema = table.schema();
        let patch = LedgerService::parse_patch(table, patch)?;
        let (row_number, current) = self.locate(table, key).await?;
        let row = LedgerService::apply_patch(&current, patch, ctx)?;
        let record = decode(&row, schema);

        self.store
            .update_row(
                self.sheet(table),
                row_number,
                &RowGuard::new(schema.key_column(), key),
                row,
            )
            .await?;

        info!(table = %table, id = %key, row_number, "Record updated");
        Ok(record)
    }

    /// Physically removes the row keyed `key`.
    pub async fn delete(&self, table: Table, key: &str) -> Result<(), RepositoryError> {
        let key_column = table.schema().key_column();
        let row_number = self
            .store
            .find_row_by_id(self.sheet(table), key_column, key)
            .await?
            .ok_or_else(|| LedgerError::NotFound {
                table,
                key: key.to_string(),
            })?;

        self.store
            .delete_row(
                self.sheet(table),
                row_number,
                &RowGuard::new(key_column, key),
            )
            .await?;

        info!(table = %table, id = %key, row_number, "Record deleted");
        Ok(())
    }

    /// Every record of `table` in row order. Blank rows are skipped.
    pub async fn list(&self, table: Table) -> Result<Vec<Record>, RepositoryError> {
        let schema = table.schema();
        let rows = self.store.read_range(self.sheet(table)).await?;
        Ok(rows
            .iter()
            .skip(1)
            .filter(|row| !is_blank(row))
            .map(|row| decode(row, schema))
            .collect())
    }

    /// The `limit` most recent records of `table`, newest first.
    pub async fn recent(&self, table: Table, limit: usize) -> Result<Vec<Record>, RepositoryError> {
        let records = self.list(table).await?;
        Ok(sort_recent(table, records, limit))
    }

    /// Adds a signed delta to an item's stock.
    pub async fn adjust_stock(
        &self,
        payload: Value,
        ctx: &MutationContext<'_>,
    ) -> Result<Record, RepositoryError> {
        let table = Table::Inventory;
        let schema = table.schema();
        let adjustment = LedgerService::parse_adjustment(payload)?;
        let (row_number, current) = self.locate(table, &adjustment.code).await?;
        let row = LedgerService::adjust_stock(&current, &adjustment, ctx)?;
        let record = decode(&row, schema);

        self.store
            .update_row(
                self.sheet(table),
                row_number,
                &RowGuard::new(schema.key_column(), adjustment.code.as_str()),
                row,
            )
            .await?;

        info!(
            code = %adjustment.code,
            delta = %adjustment.delta,
            "Stock adjusted"
        );
        Ok(record)
    }

    /// Dashboard totals. The three tables are read concurrently.
    pub async fn summary(&self) -> Result<LedgerSummary, RepositoryError> {
        let (sales, expenses, inventory) = tokio::try_join!(
            self.list(Table::Sales),
            self.list(Table::Expenses),
            self.list(Table::Inventory),
        )?;
        Ok(summarize(&sales, &expenses, &inventory))
    }
}
