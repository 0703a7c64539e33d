//! PostgreSQL reconciliation store
//!
//! Implements the domain's [`ReconStore`] port. The apply path runs the
//! ledger update rule inside one transaction with the affected rows locked,
//! so concurrent matches against the same invoice serialize and a crash
//! mid-update leaves no partial effect.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{InvoiceId, Money, PaymentId, SyncRecordId};
use domain_billing::{Invoice, Payment};
use domain_recon::{
    AuditAction, AuditEvent, PaymentApplication, ReconError, ReconStore, SyncRecord,
    SyncStatus,
};

use crate::error::DatabaseError;
use crate::repositories::invoice::InvoiceRow;
use crate::repositories::sync::SyncRecordRow;
use crate::repositories::{InvoiceRepository, SyncRecordRepository};

/// [`ReconStore`] adapter over PostgreSQL
#[derive(Debug, Clone)]
pub struct PgReconStore {
    pool: PgPool,
    invoices: InvoiceRepository,
    sync_records: SyncRecordRepository,
}

impl PgReconStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            invoices: InvoiceRepository::new(pool.clone()),
            sync_records: SyncRecordRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the invoice repository for read-side callers
    pub fn invoices(&self) -> &InvoiceRepository {
        &self.invoices
    }
}

#[async_trait]
impl ReconStore for PgReconStore {
    async fn find_invoice_by_number(
        &self,
        invoice_number: &str,
    ) -> Result<Option<Invoice>, ReconError> {
        Ok(self.invoices.find_by_number(invoice_number).await?)
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, ReconError> {
        Ok(self.invoices.get(id).await?)
    }

    async fn search_invoices(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Invoice>, ReconError> {
        Ok(self.invoices.search(query, limit).await?)
    }

    async fn insert_sync_record(&self, record: &SyncRecord) -> Result<(), ReconError> {
        Ok(self.sync_records.insert(record).await?)
    }

    async fn get_sync_record(
        &self,
        id: SyncRecordId,
    ) -> Result<Option<SyncRecord>, ReconError> {
        Ok(self.sync_records.get(id).await?)
    }

    async fn list_sync_records(
        &self,
        status: Option<SyncStatus>,
        limit: i64,
    ) -> Result<Vec<SyncRecord>, ReconError> {
        Ok(self.sync_records.list(status, limit).await?)
    }

    async fn apply_matched_payment(
        &self,
        application: PaymentApplication,
    ) -> Result<PaymentId, ReconError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        // Lock the sync record first, then the invoice. Both paths (engine
        // and manual) take locks in this order.
        let sync_row = sqlx::query_as::<_, SyncRecordRow>(
            "SELECT id, invoice_number_raw, net_amount, gross_amount, diff_percent, \
             utr_number, utr_total, payment_date, division, po_number, confidence, \
             mail_link, status, invoice_id, payment_id, error_message, created_at, \
             updated_at \
             FROM sync_records WHERE id = $1 FOR UPDATE",
        )
        .bind(application.sync_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| ReconError::not_found("Sync record", application.sync_id))?;

        if sync_row.payment_id.is_some() {
            return Err(ReconError::Conflict(format!(
                "Sync record {} already carries a payment",
                application.sync_id
            )));
        }
        let prior_status = SyncStatus::parse(&sync_row.status)?;

        let invoice_row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, invoice_number, party_name, invoice_date, currency, total_amount, \
             paid_amount, balance_due, status, created_at, updated_at \
             FROM invoices WHERE id = $1 FOR UPDATE",
        )
        .bind(application.invoice_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| ReconError::not_found("Invoice", application.invoice_id))?;

        // Read-modify-write happens on the row-locked value, never from a
        // stale pre-fetched invoice.
        let mut invoice = invoice_row.into_domain()?;
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

        sqlx::query(
            "INSERT INTO payments (id, invoice_id, amount, payment_date, mode, reference, \
             status, remarks, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(payment.id.as_uuid())
        .bind(payment.invoice_id.as_uuid())
        .bind(payment.amount.amount())
        .bind(payment.payment_date)
        .bind(payment.mode.as_str())
        .bind(&payment.reference)
        .bind(payment.status.as_str())
        .bind(&payment.remarks)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        sqlx::query(
            "UPDATE invoices SET paid_amount = $2, balance_due = $3, status = $4, \
             updated_at = $5 WHERE id = $1",
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.paid_amount.amount())
        .bind(invoice.balance_due.amount())
        .bind(invoice.status.as_str())
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        sqlx::query(
            "UPDATE sync_records SET status = $2, invoice_id = $3, payment_id = $4, \
             updated_at = $5 WHERE id = $1",
        )
        .bind(application.sync_id.as_uuid())
        .bind(SyncStatus::Matched.as_str())
        .bind(invoice.id.as_uuid())
        .bind(payment.id.as_uuid())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let audit = AuditEvent::new(
            "Payment",
            *payment.id.as_uuid(),
            AuditAction::Create,
            serde_json::json!({
                "invoiceNumber": invoice.invoice_number,
                "amount": application.amount,
                "utrNumber": application.utr_number,
                "syncRecordId": application.sync_id,
                "priorSyncStatus": prior_status,
                "remarks": application.remarks,
            }),
            application.actor.clone(),
        );
        insert_audit_event(&mut tx, &audit).await?;

        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(payment.id)
    }

    async fn ignore_sync_record(
        &self,
        id: SyncRecordId,
        actor: &str,
    ) -> Result<(), ReconError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = sqlx::query_as::<_, SyncRecordRow>(
            "SELECT id, invoice_number_raw, net_amount, gross_amount, diff_percent, \
             utr_number, utr_total, payment_date, division, po_number, confidence, \
             mail_link, status, invoice_id, payment_id, error_message, created_at, \
             updated_at \
             FROM sync_records WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| ReconError::not_found("Sync record", id))?;

        let mut record = row.into_domain()?;
        let prior_status = record.status;
        record.dismiss()?;

        sqlx::query(
            "UPDATE sync_records SET status = $2, invoice_id = NULL, payment_id = NULL, \
             updated_at = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(record.status.as_str())
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

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
        insert_audit_event(&mut tx, &audit).await?;

        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(())
    }
}

async fn insert_audit_event(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    event: &AuditEvent,
) -> Result<(), ReconError> {
    sqlx::query(
        "INSERT INTO audit_events (id, entity, entity_id, action, payload, actor, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(event.id.as_uuid())
    .bind(&event.entity)
    .bind(event.entity_id)
    .bind(event.action.as_str())
    .bind(event.payload.to_string())
    .bind(&event.actor)
    .bind(event.created_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;

    Ok(())
}
