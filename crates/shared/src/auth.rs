//! Authentication types for token verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name or ID issued by the login service).
    pub sub: String,
    /// User's role.
    #[serde(default)]
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(subject: &str, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the subject of the token.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }
}

/// Result of the authentication gate.
///
/// Mirrors the `{ok, payload}` / `{ok:false, statusCode, message}` contract:
/// a rejected request carries the status code the handler must answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Token accepted.
    Granted(Claims),
    /// Token missing or invalid.
    Denied {
        /// HTTP status to return.
        status_code: u16,
        /// Human-readable reason.
        message: String,
    },
}

impl AuthOutcome {
    /// Builds a 401 denial.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Denied {
            status_code: 401,
            message: message.into(),
        }
    }

    /// Returns true when the request may proceed.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}
