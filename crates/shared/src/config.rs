//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token verification configuration.
    pub auth: AuthConfig,
    /// Row store configuration.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Token verification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to verify HS256 tokens.
    pub jwt_secret: String,
    /// Name of the cookie that may carry the token instead of the header.
    #[serde(default = "default_token_cookie")]
    pub token_cookie: String,
}

fn default_token_cookie() -> String {
    "token".to_string()
}

/// Which row store backs the ledger tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process sheets, lost on restart.
    #[default]
    Memory,
    /// Google Sheets spreadsheet.
    Sheets,
}

/// Row store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Google Sheets settings, required when `backend = "sheets"`.
    pub sheets: Option<SheetsConfig>,
    /// Sheet names per ledger table.
    #[serde(default)]
    pub tables: TableNames,
}

/// Google Sheets service-account settings.
#[derive(Clone, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet document ID.
    pub spreadsheet_id: String,
    /// Service account email (`client_email` in the key file).
    pub client_email: String,
    /// PEM-encoded RSA private key of the service account.
    pub private_key: String,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Base URL of the Sheets REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[hidden]")
            .field("token_uri", &self.token_uri)
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

/// Sheet names for each ledger table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableNames {
    /// Sales sheet.
    #[serde(default = "default_sales_sheet")]
    pub sales: String,
    /// Expenses sheet.
    #[serde(default = "default_expenses_sheet")]
    pub expenses: String,
    /// Clients sheet.
    #[serde(default = "default_clients_sheet")]
    pub clients: String,
    /// Inventory sheet.
    #[serde(default = "default_inventory_sheet")]
    pub inventory: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            sales: default_sales_sheet(),
            expenses: default_expenses_sheet(),
            clients: default_clients_sheet(),
            inventory: default_inventory_sheet(),
        }
    }
}

fn default_sales_sheet() -> String {
    "Ventas".to_string()
}

fn default_expenses_sheet() -> String {
    "Gastos".to_string()
}

fn default_clients_sheet() -> String {
    "Clientes".to_string()
}

fn default_inventory_sheet() -> String {
    "Inventario".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
