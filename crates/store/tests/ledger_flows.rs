//! End-to-end ledger flows against the in-memory row store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use ledgerly_core::ledger::{LedgerError, MutationContext, Table};
use ledgerly_shared::TableNames;
use ledgerly_shared::types::IdGenerator;
use ledgerly_store::{
    LedgerRepository, MemoryRowStore, RepositoryError, RowGuard, RowStore, StoreError,
};
use rust_decimal_macros::dec;
use serde_json::json;

fn setup() -> (Arc<MemoryRowStore>, LedgerRepository) {
    let names = TableNames::default();
    let store = Arc::new(MemoryRowStore::with_ledger_tables(&names));
    let repo = LedgerRepository::new(store.clone(), names);
    (store, repo)
}

fn ctx(ids: &IdGenerator) -> MutationContext<'_> {
    MutationContext {
        now: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        actor: Some("admin"),
        ids,
    }
}

#[tokio::test]
async fn test_create_sale_computes_amounts() {
    let (store, repo) = setup();
    let ids = IdGenerator::new();

    let created = repo
        .create(
            Table::Sales,
            json!({"client": "Ana", "quantity": 3, "unit_price": 10, "amount_paid": 5}),
            &ctx(&ids),
        )
        .await
        .unwrap();

    assert_eq!(created.id, "VENTA-1792324800000");
    assert_eq!(created.record["gross_amount"], json!("30.00"));
    assert_eq!(created.record["balance_due"], json!("25.00"));
    assert_eq!(created.record["tax"], json!("4.80"));
    assert_eq!(created.record["date"], json!("2026-10-18"));

    let rows = store.read_range("Ventas").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][1], json!("VENTA-1792324800000"));
    assert_eq!(rows[1].len(), Table::Sales.schema().width());
}

#[tokio::test]
async fn test_update_sale_settles_balance() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    let created = repo
        .create(
            Table::Sales,
            json!({"client": "Ana", "quantity": 3, "unit_price": 10}),
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(created.record["balance_due"], json!("30.00"));

    let updated = repo
        .update(Table::Sales, &created.id, json!({"amount_paid": 30}), &ctx)
        .await
        .unwrap();
    assert_eq!(updated["amount_paid"], json!("30.00"));
    assert_eq!(updated["balance_due"], json!("0.00"));
    assert_eq!(updated["tax"], json!("4.80"));
    assert_eq!(updated["client"], json!("Ana"));

    let listed = repo.list(Table::Sales).await.unwrap();
    assert_eq!(listed, vec![updated]);
}

#[tokio::test]
async fn test_update_cannot_change_id() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    let created = repo
        .create(
            Table::Clients,
            json!({"name": "Ana", "phone": "555-0101"}),
            &ctx,
        )
        .await
        .unwrap();
    let updated = repo
        .update(
            Table::Clients,
            &created.id,
            json!({"id": "CLIENTE-1", "created_at": "2000-01-01T00:00:00Z", "phone": "555-0199"}),
            &ctx,
        )
        .await
        .unwrap();

    assert_eq!(updated["id"], json!(created.id));
    assert_eq!(updated["created_at"], created.record["created_at"]);
    assert_eq!(updated["phone"], json!("555-0199"));
}

#[tokio::test]
async fn test_update_missing_id_is_not_found() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();

    let err = repo
        .update(Table::Sales, "VENTA-404", json!({"amount_paid": 1}), &ctx(&ids))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Ledger(LedgerError::NotFound { table: Table::Sales, .. })
    ));
}

#[tokio::test]
async fn test_malformed_patch_is_rejected_before_lookup() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();

    let err = repo
        .update(Table::Sales, "VENTA-404", json!({"amount_paid": -5}), &ctx(&ids))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Ledger(LedgerError::NegativeAmount("amount_paid"))
    ));
}

fn hand_edited_sale(gross: &str) -> Vec<serde_json::Value> {
    vec![
        json!("2026-10-01"),
        json!("VENTA-1"),
        json!("Ana"),
        json!("3"),
        json!("10"),
        json!(""),
        json!(gross),
        json!("0.00"),
        json!("30.00"),
        json!("4.80"),
    ]
}

#[tokio::test]
async fn test_update_rebuilds_blank_gross() {
    let (store, repo) = setup();
    let ids = IdGenerator::new();
    store.append_row("Ventas", hand_edited_sale("")).await.unwrap();

    let updated = repo
        .update(Table::Sales, "VENTA-1", json!({"amount_paid": 5}), &ctx(&ids))
        .await
        .unwrap();
    assert_eq!(updated["gross_amount"], json!("30.00"));
    assert_eq!(updated["balance_due"], json!("25.00"));

    let rows = store.read_range("Ventas").await.unwrap();
    assert_eq!(rows[1][6], json!("30.00"));
    assert_eq!(rows[1][8], json!("25.00"));
}

#[tokio::test]
async fn test_update_refuses_unreadable_gross() {
    let (store, repo) = setup();
    let ids = IdGenerator::new();
    store.append_row("Ventas", hand_edited_sale("treinta")).await.unwrap();

    let err = repo
        .update(Table::Sales, "VENTA-1", json!({"amount_paid": 5}), &ctx(&ids))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Ledger(LedgerError::Validation(_))));

    let rows = store.read_range("Ventas").await.unwrap();
    assert_eq!(rows[1], hand_edited_sale("treinta"));
}

#[tokio::test]
async fn test_delete_missing_id_is_not_found() {
    let (_store, repo) = setup();

    let err = repo.delete(Table::Expenses, "GTO-404").await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Ledger(LedgerError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_removes_only_that_row() {
    let (store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    let mut keys = Vec::new();
    for name in ["Ana", "Luis", "Eva"] {
        let created = repo
            .create(Table::Clients, json!({"name": name, "phone": "555"}), &ctx)
            .await
            .unwrap();
        keys.push(created.id);
    }

    repo.delete(Table::Clients, &keys[1]).await.unwrap();

    let names: Vec<_> = repo
        .list(Table::Clients)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("Ana"), json!("Eva")]);
    assert_eq!(store.read_range("Clientes").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_duplicate_inventory_code_conflicts() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    let item = json!({"code": "VIN-01", "name": "Vinil", "current_stock": 4});
    let created = repo.create(Table::Inventory, item.clone(), &ctx).await.unwrap();
    assert_eq!(created.id, "VIN-01");
    assert_eq!(created.record["last_modified_by"], json!("admin"));

    let err = repo.create(Table::Inventory, item, &ctx).await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Ledger(LedgerError::Duplicate { table: Table::Inventory, .. })
    ));
    assert_eq!(repo.list(Table::Inventory).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_payload_never_reaches_store() {
    let (store, repo) = setup();
    let ids = IdGenerator::new();

    let err = repo
        .create(
            Table::Sales,
            json!({"client": "Ana", "quantity": -1, "unit_price": 10}),
            &ctx(&ids),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Ledger(_)));
    assert_eq!(store.read_range("Ventas").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_adjust_stock() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    repo.create(
        Table::Inventory,
        json!({"code": "TIN-02", "name": "Tinta", "current_stock": 5, "minimum_stock": 2}),
        &ctx,
    )
    .await
    .unwrap();

    let record = repo
        .adjust_stock(json!({"code": "TIN-02", "delta": -4, "modified_by": "luis"}), &ctx)
        .await
        .unwrap();
    assert_eq!(record["current_stock"], json!("1"));
    assert_eq!(record["last_modified_by"], json!("luis"));

    let err = repo
        .adjust_stock(json!({"code": "TIN-02", "delta": -2}), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Ledger(LedgerError::Validation(_))));

    let err = repo
        .adjust_stock(json!({"code": "NOPE", "delta": 1}), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Ledger(LedgerError::NotFound { .. })));
}

#[tokio::test]
async fn test_recent_orders_by_date() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    for (client, date) in [("A", "2026-10-01"), ("B", "2026-10-15"), ("C", "2026-09-30")] {
        repo.create(
            Table::Sales,
            json!({"client": client, "quantity": 1, "unit_price": 1, "date": date}),
            &ctx,
        )
        .await
        .unwrap();
    }

    let recent = repo.recent(Table::Sales, 2).await.unwrap();
    let clients: Vec<_> = recent.iter().map(|r| r["client"].clone()).collect();
    assert_eq!(clients, vec![json!("B"), json!("A")]);
}

#[tokio::test]
async fn test_summary_reads_all_tables() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    repo.create(
        Table::Sales,
        json!({"client": "Ana", "quantity": 3, "unit_price": 10, "amount_paid": 5}),
        &ctx,
    )
    .await
    .unwrap();
    repo.create(
        Table::Expenses,
        json!({"company_name": "Papeleria", "concept": "Insumos", "quantity": 2, "unit_price": 5}),
        &ctx,
    )
    .await
    .unwrap();
    repo.create(
        Table::Inventory,
        json!({"code": "VIN-01", "name": "Vinil", "current_stock": 1, "minimum_stock": 3}),
        &ctx,
    )
    .await
    .unwrap();

    let summary = repo.summary().await.unwrap();
    assert_eq!(summary.sales_count, 1);
    assert_eq!(summary.gross_sales, dec!(30));
    assert_eq!(summary.balance_outstanding, dec!(25));
    assert_eq!(summary.total_expenses, dec!(10));
    assert_eq!(summary.expenses_tax, dec!(1.60));
    assert_eq!(summary.net_income, dec!(20));
    assert_eq!(summary.low_stock.len(), 1);
}

#[tokio::test]
async fn test_stale_row_is_refused() {
    let (store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    let first = repo
        .create(Table::Clients, json!({"name": "Ana", "phone": "1"}), &ctx)
        .await
        .unwrap();
    let second = repo
        .create(Table::Clients, json!({"name": "Luis", "phone": "2"}), &ctx)
        .await
        .unwrap();

    // Row 3 held the second client until the first was removed.
    repo.delete(Table::Clients, &first.id).await.unwrap();
    let err = store
        .update_row(
            "Clientes",
            3,
            &RowGuard::new(0, second.id.as_str()),
            vec![json!(second.id)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::RowOutOfRange { row: 3, .. }));

    repo.create(Table::Clients, json!({"name": "Eva", "phone": "3"}), &ctx)
        .await
        .unwrap();
    let err = store
        .update_row(
            "Clientes",
            3,
            &RowGuard::new(0, second.id.as_str()),
            vec![json!(second.id)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::StaleRow { row: 3, .. }));
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let (_store, repo) = setup();
    let ids = IdGenerator::new();
    let ctx = ctx(&ids);

    let results = futures::future::join_all((0..8).map(|i| {
        repo.create(
            Table::Expenses,
            json!({"company_name": format!("P{i}"), "concept": "x", "quantity": 1, "unit_price": 1}),
            &ctx,
        )
    }))
    .await;

    let mut keys: Vec<String> = results.into_iter().map(|r| r.unwrap().id).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 8);
    assert_eq!(repo.list(Table::Expenses).await.unwrap().len(), 8);
}
