//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledgerly_shared::AppError;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by handlers; renders as `{success:false, error, code}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.is_server_error() {
            error!(error = %err, code = err.error_code(), "Request failed");
        } else {
            warn!(error = %err, code = err.error_code(), "Request rejected");
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": err.to_string(),
                "code": err.error_code(),
            })),
        )
            .into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;
