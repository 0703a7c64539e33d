//! Reconciliation Domain - Bank-Feed Matching Engine
//!
//! This crate is the payment-sync core of the ERP: it ingests payment
//! records from the bank/email-derived feed, matches each record to an
//! invoice by invoice number, applies matched payments to the invoice
//! ledger, and keeps a complete per-row audit trail in the sync-record
//! store.
//!
//! # Flow
//!
//! ```text
//! external feed ──▶ ingestion boundary ──▶ MatchingEngine
//!                                              │
//!                            ┌─────────────────┼──────────────────┐
//!                            ▼                 ▼                  ▼
//!                      sync records      payment ledger    invoice ledger
//!                            ▲
//!                            │ (unmatched queue)
//!                     ManualResolution ◀── operator
//! ```
//!
//! The engine and the manual workflow share one ledger update rule and one
//! storage port ([`ReconStore`]); adapters only change where the rows live.

pub mod audit;
pub mod engine;
pub mod error;
pub mod manual;
#[cfg(feature = "mock")]
pub mod memory;
pub mod record;
pub mod store;
pub mod sync_record;

pub use audit::{actors, AuditAction, AuditEvent};
pub use engine::{BatchResult, MatchingEngine, OutcomeKind, RecordOutcome};
pub use error::ReconError;
pub use manual::ManualResolution;
#[cfg(feature = "mock")]
pub use memory::MemoryStore;
pub use record::{parse_payment_date, NormalizedRecord, PaymentRecord};
pub use store::{PaymentApplication, ReconStore};
pub use sync_record::{SyncRecord, SyncStatus};
