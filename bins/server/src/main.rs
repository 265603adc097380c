//! Ledgerly API Server
//!
//! Main entry point for the Ledgerly backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerly_api::{AppState, create_router};
use ledgerly_shared::{AppConfig, JwtConfig, JwtService, StoreBackend, StoreConfig};
use ledgerly_store::{LedgerRepository, MemoryRowStore, RowStore, SheetsRowStore};

/// Builds the configured row store.
fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn RowStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory row store; data is lost on restart");
            Ok(Arc::new(MemoryRowStore::with_ledger_tables(&config.tables)))
        }
        StoreBackend::Sheets => {
            let sheets = config
                .sheets
                .as_ref()
                .context("store.sheets must be set when store.backend = \"sheets\"")?;
            let store = SheetsRowStore::new(sheets)?;
            info!(spreadsheet_id = %sheets.spreadsheet_id, "Using Google Sheets row store");
            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerly=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let store = build_store(&config.store)?;
    let ledger = LedgerRepository::new(store, config.store.tables.clone());

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.auth.jwt_secret.clone(),
        ..JwtConfig::default()
    });

    let state = AppState {
        ledger,
        jwt_service: Arc::new(jwt_service),
        token_cookie: Arc::from(config.auth.token_cookie.as_str()),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
