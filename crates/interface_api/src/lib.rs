//! HTTP API Layer
//!
//! This crate provides the REST API for the ERP reconciliation core using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: feed ingestion, bulk upload, dashboard, candidate search
//! - **Middleware**: shared-secret feed auth, request audit logging, rate
//!   limiting on the ingestion route
//! - **DTOs**: request/response data transfer objects
//! - **Error handling**: consistent JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, config::ApiConfig};
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod upload;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_recon::ReconStore;
use infra_db::PgReconStore;

use crate::config::ApiConfig;
use crate::handlers::{health, invoices, recon, sync};
use crate::middleware::{api_key_middleware, audit_middleware};
use crate::rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReconStore>,
    /// Present when running against PostgreSQL; used by readiness checks
    pub pool: Option<PgPool>,
    pub config: ApiConfig,
}

/// Creates the main API router backed by PostgreSQL
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let store = Arc::new(PgReconStore::new(pool.clone()));
    router_with_state(AppState {
        store,
        pool: Some(pool),
        config,
    })
}

/// Creates the API router over any store implementation
///
/// Lets HTTP-level tests run against the in-memory store.
pub fn router_with_store(store: Arc<dyn ReconStore>, config: ApiConfig) -> Router {
    router_with_state(AppState {
        store,
        pool: None,
        config,
    })
}

fn router_with_state(state: AppState) -> Router {
    let limiter = create_ip_rate_limiter(
        state.config.sync_rate_limit,
        state.config.sync_rate_window_secs,
    );

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Feed ingestion: shared-secret guarded and rate limited
    let feed_routes = Router::new()
        .route("/", post(sync::ingest_feed))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            limiter,
            ip_rate_limit_middleware,
        ));

    // Operator routes: the session layer in front of this service owns
    // their authentication
    let recon_routes = Router::new()
        .route("/", get(recon::list_sync_records))
        .route("/upload", post(sync::upload_feed))
        .route("/:id/match", post(recon::manual_match))
        .route("/:id/ignore", post(recon::ignore_sync_record));

    let invoice_routes = Router::new().route("/search", get(invoices::search_invoices));

    let api_routes = Router::new()
        .nest("/payment-sync", feed_routes)
        .nest("/reconciliation", recon_routes)
        .nest("/invoices", invoice_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
