//! Property-based tests for the row codec and patch rules.

use chrono::{TimeZone, Utc};
use ledgerly_shared::types::{IdGenerator, decimal_from_cell};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::codec::{Record, decode, encode, encode_new};
use super::service::{LedgerService, MutationContext};
use super::table::Table;

/// Strategy to pick a table.
fn table_strategy() -> impl Strategy<Value = Table> {
    prop_oneof![
        Just(Table::Sales),
        Just(Table::Expenses),
        Just(Table::Clients),
        Just(Table::Inventory),
    ]
}

/// Strategy to generate a single cell as the row store hands it back.
fn cell_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 -]{0,12}".prop_map(Value::String),
        (0i64..1_000_000).prop_map(|n| json!(n)),
        Just(Value::Null),
    ]
}

/// Strategy to generate a row of arbitrary length for a table.
fn row_strategy() -> impl Strategy<Value = (Table, Vec<Value>)> {
    table_strategy().prop_flat_map(|table| {
        let width = table.schema().width();
        (Just(table), prop::collection::vec(cell_strategy(), 0..=width + 2))
    })
}

fn money_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// An empty patch leaves a full row byte-for-byte unchanged and any row
    /// unchanged once decoded. Short rows come back padded with nulls to the
    /// schema width; the column count never shrinks.
    #[test]
    fn prop_empty_patch_round_trips((table, row) in row_strategy()) {
        let schema = table.schema();
        let encoded = encode(&row, &Record::new(), schema);

        prop_assert_eq!(decode(&encoded, schema), decode(&row, schema));
        prop_assert_eq!(encoded.len(), row.len().max(schema.width()));
        if row.len() >= schema.width() {
            prop_assert_eq!(encoded, row);
        } else {
            prop_assert!(encoded[row.len()..].iter().all(Value::is_null));
        }
    }

    /// Patching immutable fields never changes them.
    #[test]
    fn prop_immutable_fields_survive_patch(
        (table, row) in row_strategy(),
        replacement in "[A-Z]{3}-[0-9]{4}",
    ) {
        let schema = table.schema();
        let patch: Record = schema
            .fields
            .iter()
            .map(|f| ((*f).to_string(), Value::String(replacement.clone())))
            .collect();
        let encoded = encode(&row, &patch, schema);

        for field in schema.immutable {
            let idx = schema.column_of(field).unwrap();
            prop_assert_eq!(
                encoded.get(idx).cloned().unwrap_or(Value::Null),
                row.get(idx).cloned().unwrap_or(Value::Null)
            );
        }
    }

    /// After any payment patch, gross minus balance equals the amount paid.
    #[test]
    fn prop_sale_patch_keeps_balance_invariant(
        quantity in 0i64..1_000,
        unit_price in money_amount(),
        paid in money_amount(),
    ) {
        let ids = IdGenerator::new();
        let ctx = MutationContext {
            now: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
            actor: None,
            ids: &ids,
        };
        let record = LedgerService::build_record(
            Table::Sales,
            json!({"client": "Ana", "quantity": quantity, "unit_price": unit_price.to_string()}),
            &ctx,
        ).unwrap();
        let row = encode_new(&record, Table::Sales.schema());

        let patch = LedgerService::parse_patch(
            Table::Sales,
            json!({"amount_paid": paid.to_string()}),
        ).unwrap();
        let updated = LedgerService::apply_patch(&row, patch, &ctx).unwrap();
        let updated = decode(&updated, Table::Sales.schema());

        let gross = decimal_from_cell(&updated["gross_amount"]).unwrap();
        let balance = decimal_from_cell(&updated["balance_due"]).unwrap();
        prop_assert_eq!(gross - balance, paid);
        prop_assert_eq!(&updated["id"], &record["id"]);
        prop_assert_eq!(&updated["tax"], &record["tax"]);
    }
}
