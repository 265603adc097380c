//! Dashboard totals.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use tracing::warn;

use crate::{AppState, error::ApiResult};

/// Creates the summary routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/summary", get(summary))
}

/// GET `/summary` - Sales, expense and stock totals.
async fn summary(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let summary = state.ledger.summary().await?;
    if summary.unparsed_cells > 0 {
        warn!(
            unparsed_cells = summary.unparsed_cells,
            "Summary counted unreadable amounts as zero"
        );
    }
    Ok(Json(json!({ "success": true, "data": summary })))
}
