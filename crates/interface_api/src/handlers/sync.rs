//! Feed ingestion handlers
//!
//! Both entry points feed the same matching engine; the handlers only
//! adapt transport and format, so identical records have byte-identical
//! ledger effects whichever door they come through.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::Value;

use domain_recon::{actors, BatchResult, MatchingEngine, PaymentRecord};

use crate::error::ApiError;
use crate::upload::parse_feed_csv;
use crate::AppState;

const INVALID_BODY: &str = "Invalid body, expected array of payment records";

/// `POST /api/v1/payment-sync` — authenticated feed ingestion
///
/// The shared-secret guard has already run. The body must be a JSON array;
/// anything else is a 400 with the contract's exact message.
pub async fn ingest_feed(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let Ok(Json(body)) = body else {
        return Err(ApiError::BadRequest(INVALID_BODY.to_string()));
    };
    let Some(items) = body.as_array() else {
        return Err(ApiError::BadRequest(INVALID_BODY.to_string()));
    };

    let records: Vec<PaymentRecord> = items.iter().map(lenient_record).collect();

    let engine = MatchingEngine::new(state.store.clone());
    let result = engine.process_batch(&records, actors::API_KEY_USER).await;

    Ok(Json(result))
}

/// `POST /api/v1/reconciliation/upload` — operator bulk backfill
///
/// Accepts a multipart form with one CSV file part and forwards the parsed
/// rows to the same engine entry point the feed endpoint uses.
pub async fn upload_feed(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchResult>, ApiError> {
    let mut payload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") || payload.is_none() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Unreadable upload: {e}")))?;
            payload = Some(bytes.to_vec());
        }
    }

    let payload =
        payload.ok_or_else(|| ApiError::BadRequest("No file in upload".to_string()))?;
    let records = parse_feed_csv(&payload)?;

    let engine = MatchingEngine::new(state.store.clone());
    let result = engine.process_batch(&records, actors::MANUAL_UPLOAD).await;

    Ok(Json(result))
}

/// Deserializes one array element, falling back to a shell record that will
/// fail normalization (and be counted) rather than failing the batch.
fn lenient_record(item: &Value) -> PaymentRecord {
    serde_json::from_value(item.clone()).unwrap_or_else(|_| PaymentRecord {
        invoice_number: item
            .get("invoiceNumber")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        ..Default::default()
    })
}
