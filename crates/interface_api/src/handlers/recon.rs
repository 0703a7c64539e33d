//! Reconciliation dashboard handlers
//!
//! Operator actions return precise success/failure feedback immediately;
//! these are the interactive counterparts of the silent feed ingestion.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use uuid::Uuid;

use core_kernel::{InvoiceId, SyncRecordId};
use domain_recon::{ManualResolution, SyncStatus};

use crate::dto::recon::{
    ManualMatchRequest, ManualMatchResponse, SyncListParams, SyncRecordResponse,
};
use crate::error::ApiError;
use crate::AppState;

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

/// `GET /api/v1/reconciliation` — sync records, filterable by status
pub async fn list_sync_records(
    State(state): State<AppState>,
    Query(params): Query<SyncListParams>,
) -> Result<Json<Vec<SyncRecordResponse>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(SyncStatus::parse)
        .transpose()?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let records = state.store.list_sync_records(status, limit).await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// `POST /api/v1/reconciliation/:id/match` — bind a record to an invoice
pub async fn manual_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ManualMatchRequest>,
) -> Result<Json<ManualMatchResponse>, ApiError> {
    let workflow = ManualResolution::new(state.store.clone());
    let payment_id = workflow
        .manual_match(
            SyncRecordId::from_uuid(id),
            InvoiceId::from_uuid(request.invoice_id),
            operator_actor(&headers),
        )
        .await?;

    Ok(Json(ManualMatchResponse {
        payment_id: *payment_id.as_uuid(),
    }))
}

/// `POST /api/v1/reconciliation/:id/ignore` — dismiss a record
pub async fn ignore_sync_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let workflow = ManualResolution::new(state.store.clone());
    workflow
        .ignore(SyncRecordId::from_uuid(id), operator_actor(&headers))
        .await?;

    Ok(Json(serde_json::json!({ "ignored": true })))
}

/// The session layer in front of this service injects the operator
/// identity; anything without one is an operator-console default.
fn operator_actor(headers: &HeaderMap) -> &str {
    headers
        .get("x-operator-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("OPERATOR")
}
