//! Google Sheets row store.
//!
//! Each ledger table is a sheet (tab) of one spreadsheet, accessed through
//! the Sheets v4 REST API with a service account. Cells are written raw so
//! money strings keep their two decimals.

mod token;

use std::time::Duration;

use async_trait::async_trait;
use ledgerly_core::ledger::Row;
use ledgerly_shared::SheetsConfig;
use moka::future::Cache;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use self::token::TokenSource;
use crate::error::StoreError;
use crate::row_store::{RowGuard, RowStore};

/// Body of a `values` read.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// Row store backed by a Google Sheets spreadsheet.
#[derive(Debug)]
pub struct SheetsRowStore {
    client: Client,
    api_base: Url,
    spreadsheet_id: String,
    tokens: TokenSource,
    sheet_ids: Cache<String, i64>,
}

/// Quotes a sheet name for A1 notation.
fn quoted(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// Empty cells are sent as blank strings; the API rejects nulls in RAW mode.
fn outgoing(row: Row) -> Row {
    row.into_iter()
        .map(|cell| match cell {
            Value::Null => Value::String(String::new()),
            other => other,
        })
        .collect()
}

impl SheetsRowStore {
    /// Creates a store for the configured spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the key or API base URL is invalid.
    pub fn new(config: &SheetsConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| StoreError::Config(format!("invalid API base URL: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "invalid API base URL: {}",
                config.api_base
            )));
        }

        Ok(Self {
            client,
            api_base,
            spreadsheet_id: config.spreadsheet_id.clone(),
            tokens: TokenSource::new(config)?,
            sheet_ids: Cache::builder()
                .max_capacity(64)
                .time_to_live(Duration::from_secs(600))
                .build(),
        })
    }

    fn spreadsheet_url(&self, tail: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("spreadsheets")
                .extend(tail.iter().copied());
        }
        url
    }

    fn values_url(&self, range: &str) -> Url {
        self.spreadsheet_url(&[self.spreadsheet_id.as_str(), "values", range])
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.tokens.access_token(&self.client).await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Sheets API request failed");
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn read_row(&self, sheet: &str, row_number: usize) -> Result<Row, StoreError> {
        let range = format!("{}!{row_number}:{row_number}", quoted(sheet));
        let request = self
            .client
            .get(self.values_url(&range))
            .query(&[("valueRenderOption", "UNFORMATTED_VALUE")]);
        let body: ValueRange = Self::read_json(self.send(request).await?).await?;
        Ok(body.values.into_iter().next().unwrap_or_default())
    }

    /// Confirms that `row_number` is a data row still holding the guarded key.
    async fn check_guard(
        &self,
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
    ) -> Result<(), StoreError> {
        if row_number < 2 {
            return Err(StoreError::RowOutOfRange {
                sheet: sheet.to_string(),
                row: row_number,
            });
        }
        let current = self.read_row(sheet, row_number).await?;
        if guard.matches(&current) {
            Ok(())
        } else {
            Err(guard.stale(sheet, row_number))
        }
    }

    /// Numeric ID of a sheet, needed for structural edits.
    async fn sheet_id(&self, sheet: &str) -> Result<i64, StoreError> {
        if let Some(id) = self.sheet_ids.get(sheet).await {
            return Ok(id);
        }

        let request = self
            .client
            .get(self.spreadsheet_url(&[self.spreadsheet_id.as_str()]))
            .query(&[("fields", "sheets.properties(sheetId,title)")]);
        let meta: SpreadsheetMeta = Self::read_json(self.send(request).await?).await?;
        for entry in meta.sheets {
            self.sheet_ids
                .insert(entry.properties.title, entry.properties.sheet_id)
                .await;
        }

        self.sheet_ids
            .get(sheet)
            .await
            .ok_or_else(|| StoreError::UnknownSheet(sheet.to_string()))
    }
}

#[async_trait]
impl RowStore for SheetsRowStore {
    async fn append_row(&self, sheet: &str, row: Row) -> Result<(), StoreError> {
        let range = format!("{}!A1:append", quoted(sheet));
        let request = self
            .client
            .post(self.values_url(&range))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [outgoing(row)] }));
        self.send(request).await?;
        tracing::debug!(sheet, "Appended row");
        Ok(())
    }

    async fn read_range(&self, sheet: &str) -> Result<Vec<Row>, StoreError> {
        let request = self.client.get(self.values_url(&quoted(sheet))).query(&[
            ("majorDimension", "ROWS"),
            ("valueRenderOption", "UNFORMATTED_VALUE"),
            ("dateTimeRenderOption", "FORMATTED_STRING"),
        ]);
        let body: ValueRange = Self::read_json(self.send(request).await?).await?;
        tracing::debug!(sheet, rows = body.values.len(), "Read sheet");
        Ok(body.values)
    }

    async fn update_row(
        &self,
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
        row: Row,
    ) -> Result<(), StoreError> {
        self.check_guard(sheet, row_number, guard).await?;

        let range = format!("{}!A{row_number}", quoted(sheet));
        let request = self
            .client
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [outgoing(row)],
            }));
        self.send(request).await?;
        tracing::debug!(sheet, row_number, "Updated row");
        Ok(())
    }

    async fn delete_row(
        &self,
        sheet: &str,
        row_number: usize,
        guard: &RowGuard,
    ) -> Result<(), StoreError> {
        self.check_guard(sheet, row_number, guard).await?;
        let sheet_id = self.sheet_id(sheet).await?;

        let batch = format!("{}:batchUpdate", self.spreadsheet_id);
        let request = self
            .client
            .post(self.spreadsheet_url(&[batch.as_str()]))
            .json(&json!({
                "requests": [{
                    "deleteDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": row_number - 1,
                            "endIndex": row_number,
                        }
                    }
                }]
            }));
        self.send(request).await?;
        tracing::debug!(sheet, row_number, "Deleted row");
        Ok(())
    }
}
