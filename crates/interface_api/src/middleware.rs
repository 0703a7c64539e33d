//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Shared-secret guard for the feed ingestion routes
///
/// The external scheduler presents the key in `x-api-key`; absence or
/// mismatch is a 401 before any body parsing happens, so an unauthorized
/// call can never create sync records.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok());

    match presented {
        Some(key) if key == state.config.sync_api_key => Ok(next.run(request).await),
        _ => {
            warn!(uri = %request.uri(), "Feed request with missing or invalid API key");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Request audit middleware
///
/// Logs every API request with its acting identity for compliance and
/// debugging. The operator identity is injected by the session layer in
/// front of this service.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let actor = request
        .headers()
        .get("x-operator-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        actor = %actor,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
