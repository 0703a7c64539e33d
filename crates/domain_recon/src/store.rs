//! Storage port for the reconciliation core
//!
//! The domain defines the port; adapters implement it. The PostgreSQL
//! adapter lives in `infra_db`, and a mutex-guarded in-memory adapter ships
//! behind the `mock` feature for tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{InvoiceId, PaymentId, SyncRecordId};
use domain_billing::{Invoice, PaymentMode};

use crate::error::ReconError;
use crate::sync_record::{SyncRecord, SyncStatus};

/// Everything the store needs to apply one matched payment atomically
#[derive(Debug, Clone)]
pub struct PaymentApplication {
    /// Sync record being resolved
    pub sync_id: SyncRecordId,
    /// Invoice the payment settles against
    pub invoice_id: InvoiceId,
    /// Net amount from the feed row, in the invoice's currency
    pub amount: Decimal,
    /// Value date of the transfer
    pub payment_date: NaiveDate,
    /// Inferred payment mode (always NEFT for bank-feed rows)
    pub mode: PaymentMode,
    /// Bank UTR carried onto the payment's reference field
    pub utr_number: String,
    /// Provenance remarks, e.g. "Auto-synced, UTR: <utr>"
    pub remarks: String,
    /// Acting user or sentinel actor
    pub actor: String,
}

/// Storage port shared by the matching engine and the manual workflow
///
/// `apply_matched_payment` is the transactional heart: the invoice update,
/// the payment insert, the sync-record resolution and the audit entry must
/// commit or roll back as one unit, and the invoice read-modify-write must
/// happen inside that transaction (row-locked), never from a stale
/// pre-fetched value.
#[async_trait]
pub trait ReconStore: Send + Sync {
    /// Case-insensitive exact lookup by invoice number
    async fn find_invoice_by_number(
        &self,
        invoice_number: &str,
    ) -> Result<Option<Invoice>, ReconError>;

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, ReconError>;

    /// Case-insensitive substring search over invoice number and party name
    async fn search_invoices(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Invoice>, ReconError>;

    /// Persists a freshly ingested receipt (any status)
    async fn insert_sync_record(&self, record: &SyncRecord) -> Result<(), ReconError>;

    async fn get_sync_record(
        &self,
        id: SyncRecordId,
    ) -> Result<Option<SyncRecord>, ReconError>;

    async fn list_sync_records(
        &self,
        status: Option<SyncStatus>,
        limit: i64,
    ) -> Result<Vec<SyncRecord>, ReconError>;

    /// Applies a matched payment as a single atomic unit
    ///
    /// Fails with `NotFound` when the sync record or invoice is missing and
    /// with `Conflict` when the sync record already carries a payment.
    async fn apply_matched_payment(
        &self,
        application: PaymentApplication,
    ) -> Result<PaymentId, ReconError>;

    /// Dismisses an unmatched record; writes the audit entry alongside
    async fn ignore_sync_record(
        &self,
        id: SyncRecordId,
        actor: &str,
    ) -> Result<(), ReconError>;
}
