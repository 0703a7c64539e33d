//! HTTP-level tests for the ingestion boundary and operator endpoints
//!
//! Run against the in-memory store; both doors must behave exactly like
//! the contract in front of the external scheduler and the dashboard.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{Currency, Money};
use domain_billing::Invoice;
use domain_recon::{MemoryStore, ReconStore, SyncStatus};
use interface_api::{config::ApiConfig, router_with_store};

const TEST_KEY: &str = "test-feed-secret";

fn api_key() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-api-key"),
        HeaderValue::from_static(TEST_KEY),
    )
}

fn test_server(store: Arc<MemoryStore>) -> TestServer {
    let config = ApiConfig {
        sync_api_key: TEST_KEY.to_string(),
        ..ApiConfig::default()
    };
    TestServer::new(router_with_store(store, config)).expect("router should build")
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let mut invoice = Invoice::new(
        "INV-100",
        "Garuda Aerostructures",
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        Money::new(dec!(10000), Currency::INR),
    );
    invoice.send();
    store.seed_invoice(invoice);
    store
}

fn feed_row(invoice: &str, amount: i64, utr: &str) -> Value {
    json!({
        "invoiceNumber": invoice,
        "netAmount": amount,
        "utrNumber": utr,
        "utrTotal": amount,
        "date": "2025-01-10",
        "division": "Machining",
        "poNumber": "PO-7",
        "grossAmount": amount,
        "diffPercent": 0,
        "confidence": "HIGH",
        "mailLink": "https://mail/1"
    })
}

#[tokio::test]
async fn missing_api_key_is_unauthorized_and_writes_nothing() {
    let store = seeded_store();
    let server = test_server(store.clone());

    let response = server
        .post("/api/v1/payment-sync")
        .json(&json!([feed_row("INV-100", 10000, "UTR1")]))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Unauthorized");
    assert!(store.sync_records().is_empty());
}

#[tokio::test]
async fn wrong_api_key_is_unauthorized() {
    let store = seeded_store();
    let server = test_server(store.clone());

    let response = server
        .post("/api/v1/payment-sync")
        .add_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("not-the-secret"),
        )
        .json(&json!([feed_row("INV-100", 10000, "UTR1")]))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(store.sync_records().is_empty());
}

#[tokio::test]
async fn non_array_body_is_rejected_with_contract_message() {
    let store = seeded_store();
    let server = test_server(store.clone());
    let (name, value) = api_key();

    let response = server
        .post("/api/v1/payment-sync")
        .add_header(name, value)
        .json(&json!({ "invoiceNumber": "INV-100" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Invalid body, expected array of payment records"
    );
    assert!(store.sync_records().is_empty());
}

#[tokio::test]
async fn feed_batch_is_processed_and_reported() {
    let store = seeded_store();
    let server = test_server(store.clone());
    let (name, value) = api_key();

    let response = server
        .post("/api/v1/payment-sync")
        .add_header(name, value)
        .json(&json!([
            feed_row("INV-100", 4000, "UTR-A"),
            feed_row("INV-404", 100, "UTR-B"),
            { "invoiceNumber": "INV-100", "netAmount": 50, "utrNumber": "UTR-C", "date": "garbage" },
        ]))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["matched"], 1);
    assert_eq!(body["unmatched"], 1);
    assert_eq!(body["errors"], 1);
    assert_eq!(body["details"].as_array().unwrap().len(), 3);

    // Every row left a receipt, including the bad one.
    assert_eq!(store.sync_records().len(), 3);
}

#[tokio::test]
async fn dashboard_lists_records_by_status() {
    let store = seeded_store();
    let server = test_server(store.clone());
    let (name, value) = api_key();

    server
        .post("/api/v1/payment-sync")
        .add_header(name, value)
        .json(&json!([
            feed_row("INV-100", 4000, "UTR-A"),
            feed_row("INV-404", 100, "UTR-B"),
        ]))
        .await;

    let response = server
        .get("/api/v1/reconciliation")
        .add_query_param("status", "UNMATCHED")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["invoiceNumber"], "INV-404");
    assert_eq!(rows[0]["status"], "UNMATCHED");
}

#[tokio::test]
async fn manual_match_endpoint_resolves_unmatched_record() {
    let store = seeded_store();
    let server = test_server(store.clone());
    let (name, value) = api_key();

    server
        .post("/api/v1/payment-sync")
        .add_header(name, value)
        .json(&json!([feed_row("INV-404", 2500, "UTR-Z")]))
        .await;

    let sync = &store.sync_records()[0];
    assert_eq!(sync.status, SyncStatus::Unmatched);

    let invoice = store
        .find_invoice_by_number("INV-100")
        .await
        .unwrap()
        .unwrap();

    let response = server
        .post(&format!("/api/v1/reconciliation/{}/match", sync.id.as_uuid()))
        .add_header(
            HeaderName::from_static("x-operator-id"),
            HeaderValue::from_static("ops.nair"),
        )
        .json(&json!({ "invoiceId": invoice.id.as_uuid() }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.json::<Value>()["paymentId"].is_string());

    let sync = &store.sync_records()[0];
    assert_eq!(sync.status, SyncStatus::Matched);

    // Second attempt conflicts and mutates nothing further.
    let again = server
        .post(&format!("/api/v1/reconciliation/{}/match", sync.id.as_uuid()))
        .json(&json!({ "invoiceId": invoice.id.as_uuid() }))
        .await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);

    let events = store.audit_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].actor, "ops.nair");
}

#[tokio::test]
async fn ignore_endpoint_dismisses_record() {
    let store = seeded_store();
    let server = test_server(store.clone());
    let (name, value) = api_key();

    server
        .post("/api/v1/payment-sync")
        .add_header(name, value)
        .json(&json!([feed_row("INV-404", 2500, "UTR-Z")]))
        .await;

    let sync_id = store.sync_records()[0].id;

    let response = server
        .post(&format!("/api/v1/reconciliation/{}/ignore", sync_id.as_uuid()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(store.sync_records()[0].status, SyncStatus::Ignored);
}

#[tokio::test]
async fn invoice_search_returns_candidates() {
    let store = seeded_store();
    let server = test_server(store.clone());

    let response = server
        .get("/api/v1/invoices/search")
        .add_query_param("q", "garuda")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["invoiceNumber"], "INV-100");

    let short = server
        .get("/api/v1/invoices/search")
        .add_query_param("q", "g")
        .await;
    assert!(short.json::<Value>().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_endpoints_respond() {
    let store = seeded_store();
    let server = test_server(store);

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);

    // Without a database attached, readiness degrades to a liveness answer.
    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
}
