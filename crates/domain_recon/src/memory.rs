//! In-memory store adapter
//!
//! A mutex-guarded implementation of [`ReconStore`] for tests. Behaves like
//! the PostgreSQL adapter in every observable way: the apply step is atomic
//! (one lock scope), conflicts are detected on the payment link, and audit
//! entries land beside every mutation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{InvoiceId, Money, PaymentId, SyncRecordId};
use domain_billing::{Invoice, Payment};

use crate::audit::{AuditAction, AuditEvent};
use crate::error::ReconError;
use crate::store::{PaymentApplication, ReconStore};
use crate::sync_record::{SyncRecord, SyncStatus};

#[derive(Default)]
struct Inner {
    invoices: HashMap<InvoiceId, Invoice>,
    payments: Vec<Payment>,
    sync_records: HashMap<SyncRecordId, SyncRecord>,
    audit_events: Vec<AuditEvent>,
}

/// In-memory [`ReconStore`] for unit and HTTP-level tests
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an invoice as the invoicing flow would have created it
    pub fn seed_invoice(&self, invoice: Invoice) {
        let mut inner = self.inner.lock().unwrap();
        inner.invoices.insert(invoice.id, invoice);
    }

    /// Returns the current state of an invoice
    pub fn invoice(&self, id: InvoiceId) -> Option<Invoice> {
        self.inner.lock().unwrap().invoices.get(&id).cloned()
    }

    /// All payments recorded against an invoice, in insertion order
    pub fn payments_for(&self, invoice_id: InvoiceId) -> Vec<Payment> {
        self.inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect()
    }

    /// Snapshot of every sync record, oldest first
    pub fn sync_records(&self) -> Vec<SyncRecord> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<_> = inner.sync_records.values().cloned().collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Snapshot of the audit trail, oldest first
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.inner.lock().unwrap().audit_events.clone()
    }
}

#[async_trait]
impl ReconStore for MemoryStore {
    async fn find_invoice_by_number(
        &self,
        invoice_number: &str,
    ) -> Result<Option<Invoice>, ReconError> {
        let inner = self.inner.lock().unwrap();
        let mut candidates: Vec<_> = inner
            .invoices
            .values()
            .filter(|i| i.invoice_number.eq_ignore_ascii_case(invoice_number))
            .collect();
        // Deterministic first match, as the unique index makes moot in
        // the real store.
        candidates.sort_by_key(|i| (i.created_at, *i.id.as_uuid()));
        Ok(candidates.first().map(|i| (*i).clone()))
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, ReconError> {
        Ok(self.inner.lock().unwrap().invoices.get(&id).cloned())
    }

    async fn search_invoices(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Invoice>, ReconError> {
        let needle = query.to_lowercase();
        let inner = self.inner.lock().unwrap();
        let mut hits: Vec<_> = inner
            .invoices
            .values()
            .filter(|i| {
                i.invoice_number.to_lowercase().contains(&needle)
                    || i.party_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.invoice_number.cmp(&b.invoice_number));
        hits.truncate(limit.max(0) as usize);
        Ok(hits)
    }

    async fn insert_sync_record(&self, record: &SyncRecord) -> Result<(), ReconError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sync_records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_sync_record(
        &self,
        id: SyncRecordId,
    ) -> Result<Option<SyncRecord>, ReconError> {
        Ok(self.inner.lock().unwrap().sync_records.get(&id).cloned())
    }

    async fn list_sync_records(
        &self,
        status: Option<SyncStatus>,
        limit: i64,
    ) -> Result<Vec<SyncRecord>, ReconError> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<_> = inner
            .sync_records
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn apply_matched_payment(
        &self,
        application: PaymentApplication,
    ) -> Result<PaymentId, ReconError> {
        let mut inner = self.inner.lock().unwrap();

        let sync = inner
            .sync_records
            .get(&application.sync_id)
            .ok_or_else(|| ReconError::not_found("Sync record", application.sync_id))?;
        if sync.payment_id.is_some() {
            return Err(ReconError::Conflict(format!(
                "Sync record {} already carries a payment",
                application.sync_id
            )));
        }
        let prior_status = sync.status;

        let mut invoice = inner
            .invoices
            .get(&application.invoice_id)
            .cloned()
            .ok_or_else(|| ReconError::not_found("Invoice", application.invoice_id))?;

        let amount = Money::new(application.amount, invoice.currency);
        invoice.apply_payment(amount)?;

        let payment = Payment::new(
            invoice.id,
            amount,
            application.payment_date,
            application.mode,
            application.utr_number.clone(),
        )
        .with_remarks(application.remarks.clone());
        let payment_id = payment.id;

        let audit = AuditEvent::new(
            "Payment",
            *payment_id.as_uuid(),
            AuditAction::Create,
            serde_json::json!({
                "invoiceNumber": invoice.invoice_number.clone(),
                "amount": application.amount,
                "utrNumber": application.utr_number,
                "syncRecordId": application.sync_id,
                "priorSyncStatus": prior_status,
                "remarks": application.remarks,
            }),
            application.actor.clone(),
        );

        // Single lock scope stands in for the row-locked transaction.
        inner.invoices.insert(invoice.id, invoice);
        inner.payments.push(payment);
        inner
            .sync_records
            .get_mut(&application.sync_id)
            .expect("checked above")
            .resolve(application.invoice_id, payment_id)?;
        inner.audit_events.push(audit);

        Ok(payment_id)
    }

    async fn ignore_sync_record(
        &self,
        id: SyncRecordId,
        actor: &str,
    ) -> Result<(), ReconError> {
        let mut inner = self.inner.lock().unwrap();

        let record = inner
            .sync_records
            .get_mut(&id)
            .ok_or_else(|| ReconError::not_found("Sync record", id))?;
        let prior_status = record.status;
        record.dismiss()?;

        let audit = AuditEvent::new(
            "SyncRecord",
            *id.as_uuid(),
            AuditAction::Update,
            serde_json::json!({
                "status": SyncStatus::Ignored,
                "priorStatus": prior_status,
            }),
            actor,
        );
        inner.audit_events.push(audit);

        Ok(())
    }
}
