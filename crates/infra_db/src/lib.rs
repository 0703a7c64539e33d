//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the reconciliation core, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: repositories own the SQL for
//! one aggregate each, and [`PgReconStore`] composes them into the
//! transactional [`domain_recon::ReconStore`] port the matching engine and
//! manual workflow run against.
//!
//! Schema migrations live in `migrations/` at the repository root and are
//! applied by the deployment pipeline.

pub mod error;
pub mod pool;
pub mod repositories;
pub mod store;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{InvoiceRepository, SyncRecordRepository};
pub use store::PgReconStore;
