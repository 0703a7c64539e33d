//! Sync record repository
//!
//! The sync_records table is the append-only reconciliation audit trail:
//! every ingested feed row stays, whatever its outcome.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{InvoiceId, PaymentId, SyncRecordId};
use domain_recon::{SyncRecord, SyncStatus};

use crate::error::DatabaseError;

const SYNC_COLUMNS: &str = "id, invoice_number_raw, net_amount, gross_amount, diff_percent, \
     utr_number, utr_total, payment_date, division, po_number, confidence, mail_link, \
     status, invoice_id, payment_id, error_message, created_at, updated_at";

/// Database row for a sync record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRecordRow {
    pub id: Uuid,
    pub invoice_number_raw: String,
    pub net_amount: Decimal,
    pub gross_amount: Decimal,
    pub diff_percent: Decimal,
    pub utr_number: String,
    pub utr_total: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub division: String,
    pub po_number: String,
    pub confidence: String,
    pub mail_link: String,
    pub status: String,
    pub invoice_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncRecordRow {
    /// Maps the row onto the domain entity
    pub fn into_domain(self) -> Result<SyncRecord, DatabaseError> {
        let status = SyncStatus::parse(&self.status).map_err(DatabaseError::mapping)?;

        Ok(SyncRecord {
            id: SyncRecordId::from_uuid(self.id),
            invoice_number_raw: self.invoice_number_raw,
            net_amount: self.net_amount,
            gross_amount: self.gross_amount,
            diff_percent: self.diff_percent,
            utr_number: self.utr_number,
            utr_total: self.utr_total,
            payment_date: self.payment_date,
            division: self.division,
            po_number: self.po_number,
            confidence: self.confidence,
            mail_link: self.mail_link,
            status,
            invoice_id: self.invoice_id.map(InvoiceId::from_uuid),
            payment_id: self.payment_id.map(PaymentId::from_uuid),
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for sync record reads and receipt inserts
#[derive(Debug, Clone)]
pub struct SyncRecordRepository {
    pool: PgPool,
}

impl SyncRecordRepository {
    /// Creates a new SyncRecordRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a freshly ingested receipt
    pub async fn insert(&self, record: &SyncRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO sync_records (id, invoice_number_raw, net_amount, gross_amount, \
             diff_percent, utr_number, utr_total, payment_date, division, po_number, \
             confidence, mail_link, status, invoice_id, payment_id, error_message, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(record.id.as_uuid())
        .bind(&record.invoice_number_raw)
        .bind(record.net_amount)
        .bind(record.gross_amount)
        .bind(record.diff_percent)
        .bind(&record.utr_number)
        .bind(record.utr_total)
        .bind(record.payment_date)
        .bind(&record.division)
        .bind(&record.po_number)
        .bind(&record.confidence)
        .bind(&record.mail_link)
        .bind(record.status.as_str())
        .bind(record.invoice_id.map(|id| *id.as_uuid()))
        .bind(record.payment_id.map(|id| *id.as_uuid()))
        .bind(&record.error_message)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a sync record by id
    pub async fn get(&self, id: SyncRecordId) -> Result<Option<SyncRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, SyncRecordRow>(&format!(
            "SELECT {SYNC_COLUMNS} FROM sync_records WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SyncRecordRow::into_domain).transpose()
    }

    /// Lists sync records for the reconciliation dashboard, newest first
    pub async fn list(
        &self,
        status: Option<SyncStatus>,
        limit: i64,
    ) -> Result<Vec<SyncRecord>, DatabaseError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, SyncRecordRow>(&format!(
                    "SELECT {SYNC_COLUMNS} FROM sync_records WHERE status = $1 \
                     ORDER BY created_at DESC LIMIT $2"
                ))
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SyncRecordRow>(&format!(
                    "SELECT {SYNC_COLUMNS} FROM sync_records \
                     ORDER BY created_at DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(SyncRecordRow::into_domain).collect()
    }
}
