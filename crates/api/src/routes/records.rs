//! Ledger record routes: create, update, delete and list for every table.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use ledgerly_core::ledger::{MutationContext, Table};
use ledgerly_shared::AppError;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the record routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create/{table}", post(create_record))
        .route("/update/{table}", post(update_record))
        .route("/delete/{table}", post(delete_record))
        .route("/list/{table}", get(list_records))
}

/// Request body for updating a record.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// Key of the record to change.
    pub id: String,
    /// Fields to change.
    #[serde(default)]
    pub patch: Value,
}

/// Request body for deleting a record.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    /// Key of the record to remove.
    pub id: String,
}

/// Query for listing records.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Return only this many of the most recent records.
    pub recent: Option<usize>,
}

/// Resolves the `{table}` path segment; unknown tables are a 404.
pub(crate) fn table_from_path(segment: &str) -> Result<Table, AppError> {
    Table::from_str(segment).map_err(AppError::NotFound)
}

/// Unwraps a JSON body, turning extractor rejections into validation errors.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        Err(AppError::Validation("id must not be empty".to_string()))
    } else {
        Ok(id)
    }
}

/// POST `/create/{table}` - Validate, compute and append a record.
async fn create_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(table): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let table = table_from_path(&table)?;
    let payload = json_body(body)?;
    let ctx = MutationContext::now(Some(auth.subject()));

    let created = state.ledger.create(table, payload, &ctx).await?;
    Ok(Json(json!({
        "success": true,
        "id": created.id,
        "record": created.record,
    })))
}

/// POST `/update/{table}` - Patch the record with the given ID.
async fn update_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(table): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let table = table_from_path(&table)?;
    let request: UpdateRequest = parse_body(json_body(body)?)?;
    let id = required_id(&request.id)?;
    let ctx = MutationContext::now(Some(auth.subject()));

    let record = state.ledger.update(table, id, request.patch, &ctx).await?;
    Ok(Json(json!({ "success": true, "record": record })))
}

/// POST `/delete/{table}` - Remove the record with the given ID.
async fn delete_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(table): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let table = table_from_path(&table)?;
    let request: DeleteRequest = parse_body(json_body(body)?)?;
    let id = required_id(&request.id)?;

    state.ledger.delete(table, id).await?;
    info!(table = %table, id = %id, by = %auth.subject(), "Delete requested");
    Ok(Json(json!({ "success": true })))
}

/// GET `/list/{table}` - All records in row order, or the most recent N.
async fn list_records(
    State(state): State<AppState>,
    Path(table): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let table = table_from_path(&table)?;
    let Query(query) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let data = match query.recent {
        Some(limit) => state.ledger.recent(table, limit).await?,
        None => state.ledger.list(table).await?,
    };
    Ok(Json(json!({ "success": true, "data": data })))
}
