//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - Ledger create, update, delete and list routes
//! - Authentication middleware
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use ledgerly_shared::JwtService;
use ledgerly_store::LedgerRepository;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger tables over the configured row store.
    pub ledger: LedgerRepository,
    /// JWT service for token verification.
    pub jwt_service: Arc<JwtService>,
    /// Cookie that may carry the token when no `Authorization` header is sent.
    pub token_cookie: Arc<str>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
