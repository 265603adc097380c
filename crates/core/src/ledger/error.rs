//! Ledger error types.

use ledgerly_shared::AppError;
use thiserror::Error;

use super::table::Table;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input is missing, malformed, or out of range.
    #[error("{0}")]
    Validation(String),

    /// A numeric field is negative.
    #[error("{0} must be a non-negative number")]
    NegativeAmount(&'static str),

    /// Arithmetic overflowed the decimal range.
    #[error("{0} is too large")]
    Overflow(&'static str),

    /// No row carries the requested key.
    #[error("{table} record '{key}' not found")]
    NotFound {
        /// Table searched.
        table: Table,
        /// Key looked up.
        key: String,
    },

    /// A row with the same natural key already exists.
    #[error("{table} record '{key}' already exists")]
    Duplicate {
        /// Table written.
        table: Table,
        /// Conflicting key.
        key: String,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::Overflow(_) => "AMOUNT_OVERFLOW",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Duplicate { .. } => "DUPLICATE_KEY",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::NegativeAmount(_) | Self::Overflow(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Duplicate { .. } => 409,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Validation(_)
            | LedgerError::NegativeAmount(_)
            | LedgerError::Overflow(_) => Self::Validation(message),
            LedgerError::NotFound { .. } => Self::NotFound(message),
            LedgerError::Duplicate { .. } => Self::Conflict(message),
        }
    }
}
