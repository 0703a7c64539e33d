//! Sync records
//!
//! A sync record is the persisted receipt for one ingested feed row. Every
//! row the feed ever delivered has one, whatever its outcome, which makes
//! the table the reconciliation audit trail.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, PaymentId, SyncRecordId};

use crate::error::ReconError;
use crate::record::PaymentRecord;

/// Reconciliation lifecycle of a sync record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Resolved to an invoice, payment applied
    Matched,
    /// No invoice found; awaiting manual resolution
    Unmatched,
    /// Row failed normalization and was never eligible for matching
    Error,
    /// Dismissed by an operator; no ledger effect
    Ignored,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Matched => "MATCHED",
            SyncStatus::Unmatched => "UNMATCHED",
            SyncStatus::Error => "ERROR",
            SyncStatus::Ignored => "IGNORED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ReconError> {
        match s {
            "MATCHED" => Ok(SyncStatus::Matched),
            "UNMATCHED" => Ok(SyncStatus::Unmatched),
            "ERROR" => Ok(SyncStatus::Error),
            "IGNORED" => Ok(SyncStatus::Ignored),
            other => Err(ReconError::Validation(format!(
                "Unknown sync status: {other}"
            ))),
        }
    }
}

/// One persisted receipt per ingested payment-feed row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecord {
    pub id: SyncRecordId,
    /// Invoice number exactly as received, before any validation
    pub invoice_number_raw: String,
    pub net_amount: Decimal,
    pub gross_amount: Decimal,
    pub diff_percent: Decimal,
    pub utr_number: String,
    pub utr_total: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub division: String,
    pub po_number: String,
    /// Upstream extraction-confidence label, carried through for audit
    pub confidence: String,
    /// Link to the source mail, carried through for audit
    pub mail_link: String,
    pub status: SyncStatus,
    pub invoice_id: Option<InvoiceId>,
    pub payment_id: Option<PaymentId>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncRecord {
    fn from_feed(record: &PaymentRecord, payment_date: Option<NaiveDate>) -> Self {
        let now = Utc::now();
        Self {
            id: SyncRecordId::new_v7(),
            invoice_number_raw: record.invoice_number.clone(),
            net_amount: record.net_amount,
            gross_amount: record.gross_amount,
            diff_percent: record.diff_percent,
            utr_number: record.utr_number.clone(),
            utr_total: record.utr_total,
            payment_date,
            division: record.division.clone(),
            po_number: record.po_number.clone(),
            confidence: record.confidence.clone(),
            mail_link: record.mail_link.clone(),
            status: SyncStatus::Unmatched,
            invoice_id: None,
            payment_id: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Receipt for a row that resolved to an invoice
    ///
    /// The payment link is attached once the ledger transaction lands.
    pub fn matched(
        record: &PaymentRecord,
        payment_date: NaiveDate,
        invoice_id: InvoiceId,
    ) -> Self {
        let mut sync = Self::from_feed(record, Some(payment_date));
        sync.status = SyncStatus::Matched;
        sync.invoice_id = Some(invoice_id);
        sync
    }

    /// Receipt for a row with no matching invoice
    pub fn unmatched(record: &PaymentRecord, payment_date: NaiveDate) -> Self {
        Self::from_feed(record, Some(payment_date))
    }

    /// Receipt for a row that failed normalization
    pub fn failed(record: &PaymentRecord, message: impl Into<String>) -> Self {
        let mut sync = Self::from_feed(record, None);
        sync.status = SyncStatus::Error;
        sync.error_message = Some(message.into());
        sync
    }

    /// Transitions the record to `Matched` with both links populated
    ///
    /// Rejects records that are already matched; a matched record never
    /// re-opens.
    pub fn resolve(
        &mut self,
        invoice_id: InvoiceId,
        payment_id: PaymentId,
    ) -> Result<(), ReconError> {
        if self.status == SyncStatus::Matched && self.payment_id.is_some() {
            return Err(ReconError::Conflict(format!(
                "Sync record {} is already matched",
                self.id
            )));
        }
        self.status = SyncStatus::Matched;
        self.invoice_id = Some(invoice_id);
        self.payment_id = Some(payment_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Dismisses the record without any ledger effect
    pub fn dismiss(&mut self) -> Result<(), ReconError> {
        if self.status == SyncStatus::Matched {
            return Err(ReconError::Conflict(format!(
                "Sync record {} is already matched and cannot be ignored",
                self.id
            )));
        }
        self.status = SyncStatus::Ignored;
        self.invoice_id = None;
        self.payment_id = None;
        self.updated_at = Utc::now();
        Ok(())
    }
}
