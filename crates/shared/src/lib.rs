//! Shared types, errors, and configuration for Ledgerly.
//!
//! This crate provides common types used across all other crates:
//! - Money rounding helpers with decimal precision
//! - Timestamped record ID generation
//! - Application-wide error types
//! - Token claims and JWT verification
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{AuthOutcome, Claims};
pub use config::{AppConfig, AuthConfig, SheetsConfig, StoreBackend, StoreConfig, TableNames};
pub use error::AppError;
pub use jwt::{JwtConfig, JwtError, JwtService};
