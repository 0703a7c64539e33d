//! Manual resolution workflow
//!
//! Operators work the unmatched queue from the reconciliation dashboard:
//! search for the right invoice, bind the record to it, or dismiss it.
//! Binding runs the exact same ledger update the engine would have run.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use core_kernel::{InvoiceId, PaymentId, SyncRecordId};
use domain_billing::{Invoice, PaymentMode};

use crate::error::ReconError;
use crate::store::{PaymentApplication, ReconStore};
use crate::sync_record::SyncStatus;

/// Minimum query length for candidate search
const MIN_SEARCH_LEN: usize = 2;
/// Cap on candidate search results
const SEARCH_LIMIT: i64 = 20;

/// Operator-facing resolution service over the unmatched queue
pub struct ManualResolution {
    store: Arc<dyn ReconStore>,
}

impl ManualResolution {
    pub fn new(store: Arc<dyn ReconStore>) -> Self {
        Self { store }
    }

    /// Binds an unmatched sync record to a chosen invoice
    ///
    /// Preconditions: the sync record exists and is not already matched;
    /// the invoice exists. On success the stored net amount and payment
    /// date go through the shared ledger update rule and the record
    /// transitions to `Matched` with both links populated. On precondition
    /// failure nothing is mutated.
    pub async fn manual_match(
        &self,
        sync_id: SyncRecordId,
        invoice_id: InvoiceId,
        actor: &str,
    ) -> Result<PaymentId, ReconError> {
        let sync = self
            .store
            .get_sync_record(sync_id)
            .await?
            .ok_or_else(|| ReconError::not_found("Sync record", sync_id))?;

        if sync.status == SyncStatus::Matched {
            return Err(ReconError::Conflict(format!(
                "Sync record {sync_id} is already matched"
            )));
        }

        let invoice = self
            .store
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| ReconError::not_found("Invoice", invoice_id))?;

        // Error receipts carry no parsed date; the operator is exercising
        // judgment at this point, so the match date is today.
        let payment_date = sync
            .payment_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let payment_id = self
            .store
            .apply_matched_payment(PaymentApplication {
                sync_id,
                invoice_id,
                amount: sync.net_amount,
                payment_date,
                mode: PaymentMode::Neft,
                utr_number: sync.utr_number.clone(),
                remarks: format!("Manually matched, UTR: {}", sync.utr_number),
                actor: actor.to_string(),
            })
            .await?;

        info!(
            sync_id = %sync_id,
            invoice_number = %invoice.invoice_number,
            actor = %actor,
            "Sync record manually matched"
        );

        Ok(payment_id)
    }

    /// Dismisses a sync record from the unmatched queue
    ///
    /// No ledger effect. Matched records cannot be dismissed.
    pub async fn ignore(&self, sync_id: SyncRecordId, actor: &str) -> Result<(), ReconError> {
        let sync = self
            .store
            .get_sync_record(sync_id)
            .await?
            .ok_or_else(|| ReconError::not_found("Sync record", sync_id))?;

        if sync.status == SyncStatus::Matched {
            return Err(ReconError::Conflict(format!(
                "Sync record {sync_id} is already matched and cannot be ignored"
            )));
        }

        self.store.ignore_sync_record(sync_id, actor).await?;

        info!(sync_id = %sync_id, actor = %actor, "Sync record ignored");
        Ok(())
    }

    /// Searches candidate invoices by number or party name
    ///
    /// Read-only; queries shorter than two characters return nothing.
    pub async fn search_invoices(&self, query: &str) -> Result<Vec<Invoice>, ReconError> {
        let query = query.trim();
        if query.len() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        self.store.search_invoices(query, SEARCH_LIMIT).await
    }
}
