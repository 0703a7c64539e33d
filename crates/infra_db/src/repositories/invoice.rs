//! Invoice repository
//!
//! Read paths over the invoice ledger. Writes happen only inside the
//! reconciliation store's transaction, which reuses the row mapping here.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{Currency, InvoiceId, Money};
use domain_billing::{Invoice, InvoiceStatus};

use crate::error::DatabaseError;

const INVOICE_COLUMNS: &str = "id, invoice_number, party_name, invoice_date, currency, \
     total_amount, paid_amount, balance_due, status, created_at, updated_at";

/// Database row for an invoice
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub invoice_number: String,
    pub party_name: String,
    pub invoice_date: NaiveDate,
    pub currency: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_due: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    /// Maps the row onto the domain entity
    pub fn into_domain(self) -> Result<Invoice, DatabaseError> {
        let currency = Currency::parse(&self.currency).map_err(DatabaseError::mapping)?;
        let status = InvoiceStatus::parse(&self.status).map_err(DatabaseError::mapping)?;

        Ok(Invoice {
            id: InvoiceId::from_uuid(self.id),
            invoice_number: self.invoice_number,
            party_name: self.party_name,
            invoice_date: self.invoice_date,
            currency,
            total_amount: Money::new(self.total_amount, currency),
            paid_amount: Money::new(self.paid_amount, currency),
            balance_due: Money::new(self.balance_due, currency),
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for invoice reads
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Case-insensitive exact lookup by invoice number
    ///
    /// The schema keeps `lower(invoice_number)` unique; the ordering makes
    /// the result deterministic even against a legacy table without that
    /// index.
    pub async fn find_by_number(
        &self,
        invoice_number: &str,
    ) -> Result<Option<Invoice>, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE lower(invoice_number) = lower($1) \
             ORDER BY created_at, id LIMIT 1"
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InvoiceRow::into_domain).transpose()
    }

    /// Fetches an invoice by id
    pub async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(InvoiceRow::into_domain).transpose()
    }

    /// Case-insensitive substring search on invoice number or party name
    pub async fn search(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE invoice_number ILIKE $1 OR party_name ILIKE $1 \
             ORDER BY invoice_number LIMIT $2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InvoiceRow::into_domain).collect()
    }

}
