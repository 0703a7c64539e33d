//! Matching engine
//!
//! Ingests a batch of payment-feed records, resolves each against the
//! invoice ledger by invoice number, and applies matched payments through
//! the shared ledger update rule. One bad record never aborts a batch.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use core_kernel::{PaymentId, SyncRecordId};
use domain_billing::PaymentMode;

use crate::error::ReconError;
use crate::record::{NormalizedRecord, PaymentRecord};
use crate::store::{PaymentApplication, ReconStore};
use crate::sync_record::SyncRecord;

/// Outcome of one record in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Matched,
    Unmatched,
    Error,
}

/// Per-record result reported back to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    /// Invoice number as received (trimmed where parseable)
    pub invoice_number: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_record_id: Option<SyncRecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate result of one ingestion batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub matched: u32,
    pub unmatched: u32,
    pub errors: u32,
    pub details: Vec<RecordOutcome>,
}

impl BatchResult {
    fn push(&mut self, outcome: RecordOutcome) {
        match outcome.outcome {
            OutcomeKind::Matched => self.matched += 1,
            OutcomeKind::Unmatched => self.unmatched += 1,
            OutcomeKind::Error => self.errors += 1,
        }
        self.details.push(outcome);
    }
}

/// The reconciliation matching engine
///
/// Records are processed sequentially so that two records referencing the
/// same invoice within one batch apply in input order and compose
/// deterministically. Chunking very large feeds is the caller's concern.
pub struct MatchingEngine {
    store: Arc<dyn ReconStore>,
}

impl MatchingEngine {
    pub fn new(store: Arc<dyn ReconStore>) -> Self {
        Self { store }
    }

    /// Processes a batch of feed records
    ///
    /// Never fails as a whole because of a bad row: every per-record error
    /// is caught, persisted as an ERROR receipt where possible, counted,
    /// and reported in the batch result.
    pub async fn process_batch(
        &self,
        records: &[PaymentRecord],
        actor: &str,
    ) -> BatchResult {
        let mut result = BatchResult::default();

        for record in records {
            let outcome = match record.normalize() {
                Err(err) => {
                    warn!(
                        invoice_number = %record.invoice_number,
                        utr = %record.utr_number,
                        error = %err,
                        "Payment record failed normalization"
                    );
                    let sync_record_id = self.persist_error_receipt(record, &err).await;
                    RecordOutcome {
                        invoice_number: record.invoice_number.clone(),
                        outcome: OutcomeKind::Error,
                        sync_record_id,
                        payment_id: None,
                        message: Some(err.to_string()),
                    }
                }
                Ok(normalized) => match self.process_normalized(record, normalized, actor).await
                {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!(
                            invoice_number = %record.invoice_number,
                            utr = %record.utr_number,
                            error = %err,
                            "Failed to process payment record"
                        );
                        RecordOutcome {
                            invoice_number: record.invoice_number.clone(),
                            outcome: OutcomeKind::Error,
                            sync_record_id: None,
                            payment_id: None,
                            message: Some(err.to_string()),
                        }
                    }
                },
            };
            result.push(outcome);
        }

        info!(
            actor = %actor,
            matched = result.matched,
            unmatched = result.unmatched,
            errors = result.errors,
            "Payment sync batch processed"
        );

        result
    }

    async fn process_normalized(
        &self,
        record: &PaymentRecord,
        normalized: NormalizedRecord,
        actor: &str,
    ) -> Result<RecordOutcome, ReconError> {
        let invoice = self
            .store
            .find_invoice_by_number(&normalized.invoice_number)
            .await?;

        // The receipt goes in before any ledger mutation, whatever the
        // lookup said.
        let sync = match &invoice {
            Some(invoice) => {
                SyncRecord::matched(record, normalized.payment_date, invoice.id)
            }
            None => SyncRecord::unmatched(record, normalized.payment_date),
        };
        self.store.insert_sync_record(&sync).await?;

        let Some(invoice) = invoice else {
            return Ok(RecordOutcome {
                invoice_number: normalized.invoice_number,
                outcome: OutcomeKind::Unmatched,
                sync_record_id: Some(sync.id),
                payment_id: None,
                message: None,
            });
        };

        let payment_id = self
            .store
            .apply_matched_payment(PaymentApplication {
                sync_id: sync.id,
                invoice_id: invoice.id,
                amount: record.net_amount,
                payment_date: normalized.payment_date,
                mode: PaymentMode::Neft,
                utr_number: record.utr_number.clone(),
                remarks: format!("Auto-synced, UTR: {}", record.utr_number),
                actor: actor.to_string(),
            })
            .await?;

        Ok(RecordOutcome {
            invoice_number: normalized.invoice_number,
            outcome: OutcomeKind::Matched,
            sync_record_id: Some(sync.id),
            payment_id: Some(payment_id),
            message: None,
        })
    }

    /// Keeps the audit trail complete even for rows that never became
    /// eligible for matching. A failure here is logged and swallowed; the
    /// batch keeps going.
    async fn persist_error_receipt(
        &self,
        record: &PaymentRecord,
        err: &ReconError,
    ) -> Option<SyncRecordId> {
        let receipt = SyncRecord::failed(record, err.to_string());
        match self.store.insert_sync_record(&receipt).await {
            Ok(()) => Some(receipt.id),
            Err(store_err) => {
                warn!(
                    invoice_number = %record.invoice_number,
                    error = %store_err,
                    "Could not persist error receipt for feed row"
                );
                None
            }
        }
    }
}
