//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::IdGenerator;
pub use money::{TAX_RATE, decimal_from_cell, money_cell, round_money};
