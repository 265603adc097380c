//! Row store error types.

use ledgerly_shared::AppError;
use thiserror::Error;

/// Errors raised by a row store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named sheet does not exist.
    #[error("Sheet '{0}' not found")]
    UnknownSheet(String),

    /// The row number is outside the sheet's data rows.
    #[error("Row {row} is out of range in sheet '{sheet}'")]
    RowOutOfRange {
        /// Sheet name.
        sheet: String,
        /// 1-based row number.
        row: usize,
    },

    /// The row moved between lookup and write.
    #[error("Row {row} in sheet '{sheet}' no longer holds '{key}'")]
    StaleRow {
        /// Sheet name.
        sheet: String,
        /// 1-based row number.
        row: usize,
        /// Key the caller expected at that row.
        key: String,
    },

    /// The backend settings are unusable.
    #[error("Invalid store configuration: {0}")]
    Config(String),

    /// Obtaining an access token failed.
    #[error("Store authentication failed: {0}")]
    Auth(String),

    /// The transport failed before a response arrived.
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error status.
    #[error("Store returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The backend answered with a body we could not read.
    #[error("Unexpected store response: {0}")]
    Decode(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StaleRow { .. } => {
                Self::Conflict(format!("{err}; the table changed, retry the request"))
            }
            other => Self::Store(other.to_string()),
        }
    }
}
