//! Incoming payment-feed records
//!
//! One `PaymentRecord` is one row of the bank/email-derived feed, exactly as
//! the upstream producer sends it. Fields are deliberately lenient: the feed
//! and the bulk-upload sheet both omit cells, so missing numerics default to
//! zero and missing text to the empty string.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// A raw payment record from the external feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRecord {
    pub invoice_number: String,
    pub net_amount: Decimal,
    pub utr_number: String,
    pub utr_total: Decimal,
    /// Either `YYYY-MM-DD HH:mm:ss`, an ISO timestamp, or a bare date
    pub date: String,
    pub division: String,
    pub po_number: String,
    pub gross_amount: Decimal,
    pub diff_percent: Decimal,
    pub confidence: String,
    pub mail_link: String,
}

/// The validated subset of a record the matching engine operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Trimmed invoice number, ready for case-insensitive lookup
    pub invoice_number: String,
    /// Parsed value date of the transfer
    pub payment_date: NaiveDate,
}

impl PaymentRecord {
    /// Normalizes the record for matching
    ///
    /// Trims the invoice number, parses the payment date, and checks the
    /// net amount is positive. Failures here are record-level: the caller
    /// counts them and moves on to the next row.
    pub fn normalize(&self) -> Result<NormalizedRecord, ReconError> {
        let invoice_number = self.invoice_number.trim().to_string();
        if invoice_number.is_empty() {
            return Err(ReconError::validation("Missing invoice number"));
        }

        if self.net_amount <= Decimal::ZERO {
            return Err(ReconError::Validation(format!(
                "Net amount must be positive, got {}",
                self.net_amount
            )));
        }

        let payment_date = parse_payment_date(&self.date)?;

        Ok(NormalizedRecord {
            invoice_number,
            payment_date,
        })
    }
}

/// Parses a feed date that may arrive as a combined date-time or a bare date
pub fn parse_payment_date(raw: &str) -> Result<NaiveDate, ReconError> {
    let raw = raw.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }

    Err(ReconError::Validation(format!(
        "Unparseable payment date: {raw:?}"
    )))
}
