//! Reconciliation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_billing::{Invoice, InvoiceStatus};
use domain_recon::{SyncRecord, SyncStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMatchRequest {
    pub invoice_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMatchResponse {
    pub payment_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SyncListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecordResponse {
    pub id: Uuid,
    pub invoice_number: String,
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
    pub status: SyncStatus,
    pub invoice_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SyncRecord> for SyncRecordResponse {
    fn from(record: SyncRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            invoice_number: record.invoice_number_raw,
            net_amount: record.net_amount,
            gross_amount: record.gross_amount,
            diff_percent: record.diff_percent,
            utr_number: record.utr_number,
            utr_total: record.utr_total,
            payment_date: record.payment_date,
            division: record.division,
            po_number: record.po_number,
            confidence: record.confidence,
            mail_link: record.mail_link,
            status: record.status,
            invoice_id: record.invoice_id.map(|id| *id.as_uuid()),
            payment_id: record.payment_id.map(|id| *id.as_uuid()),
            error_message: record.error_message,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub party_name: String,
    pub invoice_date: NaiveDate,
    pub currency: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_due: Decimal,
    pub status: InvoiceStatus,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: *invoice.id.as_uuid(),
            invoice_number: invoice.invoice_number,
            party_name: invoice.party_name,
            invoice_date: invoice.invoice_date,
            currency: invoice.currency.code().to_string(),
            total_amount: invoice.total_amount.amount(),
            paid_amount: invoice.paid_amount.amount(),
            balance_due: invoice.balance_due.amount(),
            status: invoice.status,
        }
    }
}
