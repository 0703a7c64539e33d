//! Invoice candidate search handlers

use axum::extract::{Query, State};
use axum::Json;

use domain_recon::ManualResolution;

use crate::dto::recon::{InvoiceResponse, SearchParams};
use crate::error::ApiError;
use crate::AppState;

/// `GET /api/v1/invoices/search?q=` — candidates for manual matching
pub async fn search_invoices(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let query = params.q.unwrap_or_default();

    let workflow = ManualResolution::new(state.store.clone());
    let invoices = workflow.search_invoices(&query).await?;

    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}
