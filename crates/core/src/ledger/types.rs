//! Typed request payloads for ledger mutations.
//!
//! Request bodies arrive as loose JSON. They are deserialized into these
//! structs and validated before any arithmetic runs, so the service only ever
//! sees well-formed input.

use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::error::LedgerError;
use super::sale::ensure_non_negative;
use super::table::Table;

/// Request payload accepted by the ledger service.
pub trait Payload: DeserializeOwned + Validate {
    /// Checks every numeric field is non-negative.
    fn check_amounts(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Deserializes and validates a JSON body.
///
/// # Errors
///
/// Returns `LedgerError::Validation` for malformed shapes and rule violations,
/// `LedgerError::NegativeAmount` for negative numbers.
pub fn parse_payload<T: Payload>(payload: Value) -> Result<T, LedgerError> {
    if !payload.is_object() {
        return Err(LedgerError::Validation(
            "request body must be a JSON object".to_string(),
        ));
    }
    let parsed: T =
        serde_json::from_value(payload).map_err(|e| LedgerError::Validation(e.to_string()))?;
    parsed
        .validate()
        .map_err(|e| LedgerError::Validation(e.to_string()))?;
    parsed.check_amounts()?;
    Ok(parsed)
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid date '{s}', expected YYYY-MM-DD"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalInput {
    Number(Decimal),
    Text(String),
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<DecimalInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(DecimalInput::Number(n)) => Ok(Some(n)),
        Some(DecimalInput::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(DecimalInput::Text(s)) => Err(de::Error::custom(format!("'{s}' is not a number"))),
    }
}

fn check_all(amounts: &[(&'static str, Option<Decimal>)]) -> Result<(), LedgerError> {
    amounts
        .iter()
        .filter_map(|(field, value)| value.map(|v| (*field, v)))
        .try_for_each(|(field, value)| ensure_non_negative(field, value))
}

/// Body of `POST /create/sales`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSale {
    /// Sale date, defaults to today.
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<NaiveDate>,
    /// Client name.
    #[validate(custom(function = "non_blank"))]
    pub client: String,
    /// Units sold.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Partial payment received.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub amount_paid: Option<Decimal>,
    /// Free-form notes.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
}

impl Payload for CreateSale {
    fn check_amounts(&self) -> Result<(), LedgerError> {
        check_all(&[
            ("quantity", Some(self.quantity)),
            ("unit_price", Some(self.unit_price)),
            ("amount_paid", self.amount_paid),
        ])
    }
}

/// Body of `POST /create/expenses`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExpense {
    /// Expense date, defaults to today.
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<NaiveDate>,
    /// Supplier tax registration (RFC).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tax_id: Option<String>,
    /// Supplier name.
    #[validate(custom(function = "non_blank"))]
    pub company_name: String,
    /// Expense category.
    #[validate(custom(function = "non_blank"))]
    pub concept: String,
    /// Units bought.
    pub quantity: Decimal,
    /// Free-form notes.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Total, computed from quantity and price when absent.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub total_amount: Option<Decimal>,
    /// Tax, 16% of the total when absent.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub tax: Option<Decimal>,
}

impl Payload for CreateExpense {
    fn check_amounts(&self) -> Result<(), LedgerError> {
        check_all(&[
            ("quantity", Some(self.quantity)),
            ("unit_price", Some(self.unit_price)),
            ("total_amount", self.total_amount),
            ("tax", self.tax),
        ])
    }
}

/// Body of `POST /create/clients`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClient {
    /// Client name.
    #[validate(custom(function = "non_blank"))]
    pub name: String,
    /// Contact phone.
    #[validate(custom(function = "non_blank"))]
    pub phone: String,
    /// Contact email.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email)]
    pub email: Option<String>,
}

impl Payload for CreateClient {}

/// Body of `POST /create/inventory`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInventoryItem {
    /// Natural key.
    #[validate(custom(function = "non_blank"))]
    pub code: String,
    /// Item name.
    #[validate(custom(function = "non_blank"))]
    pub name: String,
    /// Item category.
    #[serde(default, rename = "type", deserialize_with = "blank_as_none")]
    pub item_type: Option<String>,
    /// Stock on hand, zero when absent.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub current_stock: Option<Decimal>,
    /// Unit the stock is counted in.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub unit_of_measure: Option<String>,
    /// Reorder threshold, zero when absent.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub minimum_stock: Option<Decimal>,
    /// Who created the item; the authenticated user when absent.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub last_modified_by: Option<String>,
}

impl Payload for CreateInventoryItem {
    fn check_amounts(&self) -> Result<(), LedgerError> {
        check_all(&[
            ("current_stock", self.current_stock),
            ("minimum_stock", self.minimum_stock),
        ])
    }
}

/// Patch for a sale. `balance_due` is always recomputed and cannot be set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SalePatch {
    /// New sale date.
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<NaiveDate>,
    /// New client name.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub client: Option<String>,
    /// New quantity.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub quantity: Option<Decimal>,
    /// New unit price.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub unit_price: Option<Decimal>,
    /// New notes.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    /// Explicit gross amount.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub gross_amount: Option<Decimal>,
    /// New amount paid.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub amount_paid: Option<Decimal>,
    /// Explicit tax.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub tax: Option<Decimal>,
}

impl Payload for SalePatch {
    fn check_amounts(&self) -> Result<(), LedgerError> {
        check_all(&[
            ("quantity", self.quantity),
            ("unit_price", self.unit_price),
            ("gross_amount", self.gross_amount),
            ("amount_paid", self.amount_paid),
            ("tax", self.tax),
        ])
    }
}

/// Patch for an expense. `created_at` cannot be set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ExpensePatch {
    /// New expense date.
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<NaiveDate>,
    /// New supplier tax registration.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tax_id: Option<String>,
    /// New supplier name.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub company_name: Option<String>,
    /// New category.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub concept: Option<String>,
    /// New quantity.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub quantity: Option<Decimal>,
    /// New notes.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    /// New unit price.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub unit_price: Option<Decimal>,
    /// Explicit total.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub total_amount: Option<Decimal>,
    /// Explicit tax.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub tax: Option<Decimal>,
}

impl Payload for ExpensePatch {
    fn check_amounts(&self) -> Result<(), LedgerError> {
        check_all(&[
            ("quantity", self.quantity),
            ("unit_price", self.unit_price),
            ("total_amount", self.total_amount),
            ("tax", self.tax),
        ])
    }
}

/// Patch for a client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ClientPatch {
    /// New name.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    /// New phone.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    /// New email.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email)]
    pub email: Option<String>,
}

impl Payload for ClientPatch {}

/// Patch for an inventory item. The `code` cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InventoryPatch {
    /// New name.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    /// New category.
    #[serde(default, rename = "type", deserialize_with = "blank_as_none")]
    pub item_type: Option<String>,
    /// New stock on hand.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub current_stock: Option<Decimal>,
    /// New unit of measure.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub unit_of_measure: Option<String>,
    /// New reorder threshold.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub minimum_stock: Option<Decimal>,
    /// Who made the change; the authenticated user when absent.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub last_modified_by: Option<String>,
}

impl Payload for InventoryPatch {
    fn check_amounts(&self) -> Result<(), LedgerError> {
        check_all(&[
            ("current_stock", self.current_stock),
            ("minimum_stock", self.minimum_stock),
        ])
    }
}

/// A validated patch, tagged with the table it applies to.
#[derive(Debug, Clone)]
pub enum Patch {
    /// Changes to a sale.
    Sale(SalePatch),
    /// Changes to an expense.
    Expense(ExpensePatch),
    /// Changes to a client.
    Client(ClientPatch),
    /// Changes to an inventory item.
    Item(InventoryPatch),
}

impl Patch {
    /// Table the patch applies to.
    #[must_use]
    pub const fn table(&self) -> Table {
        match self {
            Self::Sale(_) => Table::Sales,
            Self::Expense(_) => Table::Expenses,
            Self::Client(_) => Table::Clients,
            Self::Item(_) => Table::Inventory,
        }
    }
}

/// Body of `POST /inventory/adjust`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockAdjustment {
    /// Item code.
    #[validate(custom(function = "non_blank"))]
    pub code: String,
    /// Signed change to apply to the stock on hand.
    pub delta: Decimal,
    /// Who made the change; the authenticated user when absent.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub modified_by: Option<String>,
}

impl Payload for StockAdjustment {}
