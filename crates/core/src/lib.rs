//! Core business logic for Ledgerly.
//!
//! This crate contains pure business logic with ZERO web or store dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Sale arithmetic, row codec, table schemas and mutation rules

pub mod ledger;
