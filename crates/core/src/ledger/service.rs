//! Ledger service: turns validated payloads into rows.
//!
//! This service contains pure business logic with no store dependencies.
//! Callers locate rows, hand the current cells in, and persist what comes out.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ledgerly_shared::types::{IdGenerator, decimal_from_cell, money_cell, round_money};
use rust_decimal::Decimal;
use serde_json::Value;

use super::codec::{Record, Row, decode, encode};
use super::error::LedgerError;
use super::sale::{SaleInput, compute_sale, line_total, recompute_balance, tax_for};
use super::table::Table;
use super::types::{
    ClientPatch, CreateClient, CreateExpense, CreateInventoryItem, CreateSale, ExpensePatch,
    InventoryPatch, Patch, SalePatch, StockAdjustment, parse_payload,
};

/// Per-request inputs that are not part of the payload.
#[derive(Debug, Clone, Copy)]
pub struct MutationContext<'a> {
    /// Request time; stamps IDs, default dates and `created_at`.
    pub now: DateTime<Utc>,
    /// Authenticated user, recorded as `last_modified_by` on inventory.
    pub actor: Option<&'a str>,
    /// Source of record IDs.
    pub ids: &'a IdGenerator,
}

impl<'a> MutationContext<'a> {
    /// Context at the current instant using the process-wide ID generator.
    #[must_use]
    pub fn now(actor: Option<&'a str>) -> Self {
        Self {
            now: Utc::now(),
            actor,
            ids: IdGenerator::global(),
        }
    }

    /// Calendar date of the request.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn created_at(&self) -> Value {
        text(self.now.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

fn text(value: impl Into<String>) -> Value {
    Value::String(value.into())
}

fn date_cell(date: NaiveDate) -> Value {
    text(date.format("%Y-%m-%d").to_string())
}

fn decimal_cell(value: Decimal) -> Value {
    text(value.normalize().to_string())
}

fn is_blank(cell: &Value) -> bool {
    match cell {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Stored numeric cell: `None` when blank, an error when unreadable.
fn stored_amount(record: &Record, field: &str) -> Result<Option<Decimal>, LedgerError> {
    let Some(cell) = record.get(field).filter(|cell| !is_blank(cell)) else {
        return Ok(None);
    };
    decimal_from_cell(cell).map(Some).ok_or_else(|| {
        LedgerError::Validation(format!(
            "stored {field} {cell} is not a number; set {field} in the patch"
        ))
    })
}

/// Stored numeric cell that a recomputation cannot do without.
fn required_amount(record: &Record, field: &str) -> Result<Decimal, LedgerError> {
    stored_amount(record, field)?.ok_or_else(|| {
        LedgerError::Validation(format!("stored {field} is blank; set {field} in the patch"))
    })
}

fn insert(record: &mut Record, field: &str, value: Value) {
    record.insert(field.to_string(), value);
}

/// Ledger service for building and patching rows.
pub struct LedgerService;

impl LedgerService {
    /// Builds the record for a new row, generating its ID.
    ///
    /// The returned record carries every schema field; for inventory the key
    /// is the caller's `code`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the payload is malformed.
    pub fn build_record(
        table: Table,
        payload: Value,
        ctx: &MutationContext<'_>,
    ) -> Result<Record, LedgerError> {
        match table {
            Table::Sales => Self::build_sale(parse_payload(payload)?, ctx),
            Table::Expenses => Self::build_expense(parse_payload(payload)?, ctx),
            Table::Clients => Ok(Self::build_client(parse_payload(payload)?, ctx)),
            Table::Inventory => Ok(Self::build_item(parse_payload(payload)?, ctx)),
        }
    }

    fn next_id(table: Table, ctx: &MutationContext<'_>) -> Value {
        let prefix = table.id_prefix().unwrap_or("ROW");
        text(ctx.ids.next_id(prefix, ctx.now))
    }

    fn build_sale(req: CreateSale, ctx: &MutationContext<'_>) -> Result<Record, LedgerError> {
        let amounts = compute_sale(
            &SaleInput {
                quantity: req.quantity,
                unit_price: req.unit_price,
                amount_paid: req.amount_paid,
                date: req.date,
            },
            ctx.today(),
        )?;

        let mut record = Record::new();
        insert(&mut record, "date", date_cell(amounts.date));
        insert(&mut record, "id", Self::next_id(Table::Sales, ctx));
        insert(&mut record, "client", text(req.client.trim()));
        insert(&mut record, "quantity", decimal_cell(req.quantity));
        insert(&mut record, "unit_price", decimal_cell(req.unit_price));
        insert(&mut record, "description", text(req.description.unwrap_or_default()));
        insert(&mut record, "gross_amount", money_cell(amounts.gross_amount));
        insert(&mut record, "amount_paid", money_cell(amounts.amount_paid));
        insert(&mut record, "balance_due", money_cell(amounts.balance_due));
        insert(&mut record, "tax", money_cell(amounts.tax));
        Ok(record)
    }

    fn build_expense(req: CreateExpense, ctx: &MutationContext<'_>) -> Result<Record, LedgerError> {
        let total = match req.total_amount {
            Some(total) => round_money(total),
            None => line_total(req.quantity, req.unit_price, "total_amount")?,
        };
        let tax = match req.tax {
            Some(tax) => round_money(tax),
            None => tax_for(total)?,
        };

        let mut record = Record::new();
        insert(&mut record, "date", date_cell(req.date.unwrap_or_else(|| ctx.today())));
        insert(&mut record, "id", Self::next_id(Table::Expenses, ctx));
        insert(&mut record, "tax_id", text(req.tax_id.unwrap_or_default()));
        insert(&mut record, "company_name", text(req.company_name.trim()));
        insert(&mut record, "concept", text(req.concept.trim()));
        insert(&mut record, "quantity", decimal_cell(req.quantity));
        insert(&mut record, "description", text(req.description.unwrap_or_default()));
        insert(&mut record, "unit_price", decimal_cell(req.unit_price));
        insert(&mut record, "total_amount", money_cell(total));
        insert(&mut record, "tax", money_cell(tax));
        insert(&mut record, "created_at", ctx.created_at());
        Ok(record)
    }

    fn build_client(req: CreateClient, ctx: &MutationContext<'_>) -> Record {
        let mut record = Record::new();
        insert(&mut record, "id", Self::next_id(Table::Clients, ctx));
        insert(&mut record, "name", text(req.name.trim()));
        insert(&mut record, "phone", text(req.phone.trim()));
        insert(&mut record, "email", text(req.email.unwrap_or_default()));
        insert(&mut record, "created_at", ctx.created_at());
        record
    }

    fn build_item(req: CreateInventoryItem, ctx: &MutationContext<'_>) -> Record {
        let modified_by = req
            .last_modified_by
            .or_else(|| ctx.actor.map(str::to_string))
            .unwrap_or_default();

        let mut record = Record::new();
        insert(&mut record, "code", text(req.code.trim()));
        insert(&mut record, "name", text(req.name.trim()));
        insert(&mut record, "type", text(req.item_type.unwrap_or_default()));
        insert(
            &mut record,
            "current_stock",
            decimal_cell(req.current_stock.unwrap_or(Decimal::ZERO)),
        );
        insert(
            &mut record,
            "unit_of_measure",
            text(req.unit_of_measure.unwrap_or_default()),
        );
        insert(
            &mut record,
            "minimum_stock",
            decimal_cell(req.minimum_stock.unwrap_or(Decimal::ZERO)),
        );
        insert(&mut record, "last_modified_by", text(modified_by));
        record
    }

    /// Parses a patch body for `table` without looking at any stored row.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the patch is malformed.
    pub fn parse_patch(table: Table, patch: Value) -> Result<Patch, LedgerError> {
        Ok(match table {
            Table::Sales => Patch::Sale(parse_payload(patch)?),
            Table::Expenses => Patch::Expense(parse_payload(patch)?),
            Table::Clients => Patch::Client(parse_payload(patch)?),
            Table::Inventory => Patch::Item(parse_payload(patch)?),
        })
    }

    /// Applies a parsed patch to the row currently stored, returning the row
    /// to write.
    ///
    /// Derived fields are recomputed here: a sale's `balance_due` always
    /// follows the resulting gross and paid amounts, and totals follow a
    /// changed quantity or unit price unless given explicitly. A blank stored
    /// gross is rebuilt from the stored quantity and unit price. Tax is only
    /// replaced when the patch names it.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a stored amount the recomputation
    /// needs is unreadable.
    pub fn apply_patch(
        current_row: &[Value],
        patch: Patch,
        ctx: &MutationContext<'_>,
    ) -> Result<Row, LedgerError> {
        let schema = patch.table().schema();
        let current = decode(current_row, schema);

        let changes = match patch {
            Patch::Sale(patch) => Self::sale_changes(&current, patch)?,
            Patch::Expense(patch) => Self::expense_changes(&current, patch)?,
            Patch::Client(patch) => Self::client_changes(patch),
            Patch::Item(patch) => Self::item_changes(patch, ctx),
        };

        Ok(encode(current_row, &changes, schema))
    }

    fn sale_changes(current: &Record, patch: SalePatch) -> Result<Record, LedgerError> {
        let mut changes = Record::new();
        if let Some(date) = patch.date {
            insert(&mut changes, "date", date_cell(date));
        }
        if let Some(client) = patch.client {
            insert(&mut changes, "client", text(client));
        }
        if let Some(description) = patch.description {
            insert(&mut changes, "description", text(description));
        }
        if let Some(quantity) = patch.quantity {
            insert(&mut changes, "quantity", decimal_cell(quantity));
        }
        if let Some(unit_price) = patch.unit_price {
            insert(&mut changes, "unit_price", decimal_cell(unit_price));
        }

        let gross = if let Some(gross) = patch.gross_amount {
            let gross = round_money(gross);
            insert(&mut changes, "gross_amount", money_cell(gross));
            gross
        } else if patch.quantity.is_some() || patch.unit_price.is_some() {
            let gross = Self::stored_line_total(
                current,
                patch.quantity,
                patch.unit_price,
                "gross_amount",
            )?;
            insert(&mut changes, "gross_amount", money_cell(gross));
            gross
        } else if let Some(gross) = stored_amount(current, "gross_amount")? {
            gross
        } else {
            let gross = Self::stored_line_total(current, None, None, "gross_amount")?;
            insert(&mut changes, "gross_amount", money_cell(gross));
            gross
        };

        let paid = if let Some(paid) = patch.amount_paid {
            let paid = round_money(paid);
            insert(&mut changes, "amount_paid", money_cell(paid));
            paid
        } else {
            stored_amount(current, "amount_paid")?.unwrap_or(Decimal::ZERO)
        };

        insert(
            &mut changes,
            "balance_due",
            money_cell(recompute_balance(gross, paid)?),
        );

        if let Some(tax) = patch.tax {
            insert(&mut changes, "tax", money_cell(tax));
        }
        Ok(changes)
    }

    /// `quantity × unit_price`, taking each factor from the patch when given
    /// and from the stored row otherwise.
    fn stored_line_total(
        current: &Record,
        quantity: Option<Decimal>,
        unit_price: Option<Decimal>,
        field: &'static str,
    ) -> Result<Decimal, LedgerError> {
        let quantity = match quantity {
            Some(quantity) => quantity,
            None => required_amount(current, "quantity")?,
        };
        let unit_price = match unit_price {
            Some(unit_price) => unit_price,
            None => required_amount(current, "unit_price")?,
        };
        line_total(quantity, unit_price, field)
    }

    fn expense_changes(current: &Record, patch: ExpensePatch) -> Result<Record, LedgerError> {
        let mut changes = Record::new();
        if let Some(date) = patch.date {
            insert(&mut changes, "date", date_cell(date));
        }
        for (field, value) in [
            ("tax_id", patch.tax_id),
            ("company_name", patch.company_name),
            ("concept", patch.concept),
            ("description", patch.description),
        ] {
            if let Some(value) = value {
                insert(&mut changes, field, text(value));
            }
        }
        if let Some(quantity) = patch.quantity {
            insert(&mut changes, "quantity", decimal_cell(quantity));
        }
        if let Some(unit_price) = patch.unit_price {
            insert(&mut changes, "unit_price", decimal_cell(unit_price));
        }

        if let Some(total) = patch.total_amount {
            insert(&mut changes, "total_amount", money_cell(total));
        } else if patch.quantity.is_some() || patch.unit_price.is_some() {
            let total =
                Self::stored_line_total(current, patch.quantity, patch.unit_price, "total_amount")?;
            insert(&mut changes, "total_amount", money_cell(total));
        }

        if let Some(tax) = patch.tax {
            insert(&mut changes, "tax", money_cell(tax));
        }
        Ok(changes)
    }

    fn client_changes(patch: ClientPatch) -> Record {
        let mut changes = Record::new();
        for (field, value) in [
            ("name", patch.name),
            ("phone", patch.phone),
            ("email", patch.email),
        ] {
            if let Some(value) = value {
                insert(&mut changes, field, text(value));
            }
        }
        changes
    }

    fn item_changes(patch: InventoryPatch, ctx: &MutationContext<'_>) -> Record {
        let mut changes = Record::new();
        for (field, value) in [
            ("name", patch.name),
            ("type", patch.item_type),
            ("unit_of_measure", patch.unit_of_measure),
        ] {
            if let Some(value) = value {
                insert(&mut changes, field, text(value));
            }
        }
        if let Some(stock) = patch.current_stock {
            insert(&mut changes, "current_stock", decimal_cell(stock));
        }
        if let Some(minimum) = patch.minimum_stock {
            insert(&mut changes, "minimum_stock", decimal_cell(minimum));
        }
        if let Some(by) = patch.last_modified_by.or_else(|| ctx.actor.map(str::to_string)) {
            insert(&mut changes, "last_modified_by", text(by));
        }
        changes
    }

    /// Parses the body of a stock adjustment.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the body is malformed.
    pub fn parse_adjustment(payload: Value) -> Result<StockAdjustment, LedgerError> {
        parse_payload(payload)
    }

    /// Applies a signed stock change to an inventory row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` when the stock would go negative.
    pub fn adjust_stock(
        current_row: &[Value],
        adjustment: &StockAdjustment,
        ctx: &MutationContext<'_>,
    ) -> Result<Row, LedgerError> {
        let schema = Table::Inventory.schema();
        let current = decode(current_row, schema);
        let stock = stored_amount(&current, "current_stock")?.unwrap_or(Decimal::ZERO);
        let updated = stock
            .checked_add(adjustment.delta)
            .ok_or(LedgerError::Overflow("current_stock"))?;
        if updated.is_sign_negative() && !updated.is_zero() {
            return Err(LedgerError::Validation(format!(
                "insufficient stock for '{}': on hand {}, change {}",
                adjustment.code,
                stock.normalize(),
                adjustment.delta.normalize()
            )));
        }

        let mut changes = Record::new();
        insert(&mut changes, "current_stock", decimal_cell(updated));
        if let Some(by) = adjustment
            .modified_by
            .clone()
            .or_else(|| ctx.actor.map(str::to_string))
        {
            insert(&mut changes, "last_modified_by", text(by));
        }
        Ok(encode(current_row, &changes, schema))
    }
}

fn record_date(record: &Record, field: &str) -> Option<NaiveDate> {
    let raw = record.get(field)?.as_str()?.trim();
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok())
}

/// Returns the `limit` most recent records, newest first.
///
/// Records are ordered by the table's date field, later rows first on equal
/// dates; undated records sort last. Tables without a date field fall back
/// to reverse row order.
#[must_use]
pub fn sort_recent(table: Table, records: Vec<Record>, limit: usize) -> Vec<Record> {
    let Some(field) = table.schema().date_field else {
        return records.into_iter().rev().take(limit).collect();
    };

    let mut dated: Vec<(usize, Option<NaiveDate>, Record)> = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| (idx, record_date(&record, field), record))
        .collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    dated
        .into_iter()
        .take(limit)
        .map(|(_, _, record)| record)
        .collect()
}
