//! Inventory stock adjustment.

use axum::{Json, Router, extract::State, extract::rejection::JsonRejection, routing::post};
use ledgerly_core::ledger::MutationContext;
use serde_json::{Value, json};

use crate::{AppState, error::ApiResult, middleware::AuthUser, routes::records::json_body};

/// Creates the inventory routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/inventory/adjust", post(adjust_stock))
}

/// POST `/inventory/adjust` - Add a signed delta to an item's stock.
async fn adjust_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let payload = json_body(body)?;
    let ctx = MutationContext::now(Some(auth.subject()));

    let record = state.ledger.adjust_stock(payload, &ctx).await?;
    Ok(Json(json!({ "success": true, "record": record })))
}
