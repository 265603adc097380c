//! Router tests over the in-memory row store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use ledgerly_api::{AppState, create_router};
use ledgerly_core::ledger::Row;
use ledgerly_shared::{JwtConfig, JwtService, TableNames};
use ledgerly_store::{LedgerRepository, MemoryRowStore, RowGuard, RowStore, StoreError};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "router-test-secret";

fn jwt() -> Arc<JwtService> {
    Arc::new(JwtService::new(JwtConfig {
        secret: SECRET.to_string(),
        access_token_expires_minutes: 5,
    }))
}

fn app_with(store: Arc<dyn RowStore>) -> (Router, String) {
    let jwt_service = jwt();
    let token = jwt_service.generate_access_token("admin", "owner").unwrap();
    let state = AppState {
        ledger: LedgerRepository::new(store, TableNames::default()),
        jwt_service,
        token_cookie: Arc::from("token"),
    };
    (create_router(state), token)
}

fn app() -> (Router, String) {
    app_with(Arc::new(MemoryRowStore::with_ledger_tables(
        &TableNames::default(),
    )))
}

fn post(uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/list/sales")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_forged_token_is_rejected() {
    let (app, _) = app();
    let forged = JwtService::new(JwtConfig {
        secret: "other-secret".to_string(),
        access_token_expires_minutes: 5,
    })
    .generate_access_token("admin", "owner")
    .unwrap();
    let (status, _) = send(&app, get("/list/sales", &forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_cookie_is_accepted() {
    let (app, token) = app();
    let request = Request::builder()
        .uri("/list/clients")
        .header(header::COOKIE, format!("token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_sale_lifecycle() {
    let (app, token) = app();

    let (status, body) = send(
        &app,
        post(
            "/create/sales",
            &token,
            &json!({"client": "Ana", "quantity": 3, "unit_price": 10, "amount_paid": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["record"]["gross_amount"], "30.00");
    assert_eq!(body["record"]["balance_due"], "25.00");
    assert_eq!(body["record"]["tax"], "4.80");
    let id = body["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("VENTA-"));

    let (status, body) = send(
        &app,
        post(
            "/update/sales",
            &token,
            &json!({"id": id, "patch": {"amount_paid": 30}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["balance_due"], "0.00");

    let (status, body) = send(&app, get("/list/sales?recent=5", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, post("/delete/sales", &token, &json!({"id": id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = send(&app, post("/delete/sales", &token, &json!({"id": id}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let (app, token) = app();

    let (status, body) = send(
        &app,
        post(
            "/create/sales",
            &token,
            &json!({"client": "Ana", "quantity": "three", "unit_price": 10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        post("/create/expenses", &token, &json!({"concept": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/create/clients")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, post("/update/clients", &token, &json!({"patch": {}}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_table_is_404() {
    let (app, token) = app();
    let (status, body) = send(&app, post("/create/orders", &token, &json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_inventory_code_is_409() {
    let (app, token) = app();
    let item = json!({"code": "VIN-01", "name": "Vinil", "current_stock": 2, "minimum_stock": 5});

    let (status, body) = send(&app, post("/create/inventory", &token, &item)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "VIN-01");
    assert_eq!(body["record"]["last_modified_by"], "admin");

    let (status, body) = send(&app, post("/create/inventory", &token, &item)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_inventory_adjust_and_summary() {
    let (app, token) = app();
    send(
        &app,
        post(
            "/create/inventory",
            &token,
            &json!({"code": "TIN-02", "name": "Tinta", "current_stock": 10, "minimum_stock": 4}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post("/inventory/adjust", &token, &json!({"code": "TIN-02", "delta": -7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["current_stock"], "3");

    let (status, _) = send(
        &app,
        post("/inventory/adjust", &token, &json!({"code": "TIN-02", "delta": -9})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/summary", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["low_stock"][0]["code"], "TIN-02");
    assert_eq!(body["data"]["sales_count"], 0);
}

/// Store whose every call fails, standing in for an unreachable backend.
struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Api {
        status: 503,
        message: "backend unavailable".to_string(),
    }
}

#[async_trait]
impl RowStore for FailingStore {
    async fn append_row(&self, _sheet: &str, _row: Row) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn read_range(&self, _sheet: &str) -> Result<Vec<Row>, StoreError> {
        Err(unavailable())
    }

    async fn update_row(
        &self,
        _sheet: &str,
        _row_number: usize,
        _guard: &RowGuard,
        _row: Row,
    ) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn delete_row(
        &self,
        _sheet: &str,
        _row_number: usize,
        _guard: &RowGuard,
    ) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

#[tokio::test]
async fn test_store_failure_is_500_with_message() {
    let (app, token) = app_with(Arc::new(FailingStore));

    let (status, body) = send(
        &app,
        post(
            "/create/clients",
            &token,
            &json!({"name": "Ana", "phone": "555"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORE_ERROR");
    assert!(body["error"].as_str().unwrap().contains("backend unavailable"));

    let (status, _) = send(&app, get("/summary", &token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_malformed_patch_for_unknown_id_is_400() {
    let body = json!({"id": "VENTA-404", "patch": {"amount_paid": -5}});

    let (app, token) = app();
    let (status, response) = send(&app, post("/update/sales", &token, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");

    // Rejected before any read reaches the backend.
    let (app, token) = app_with(Arc::new(FailingStore));
    let (status, _) = send(&app, post("/update/sales", &token, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
