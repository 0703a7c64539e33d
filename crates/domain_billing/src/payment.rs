//! Payment ledger
//!
//! Append-only records of individual payments applied to invoices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, Money, PaymentId};

use crate::error::BillingError;

/// Payment mode
///
/// Bank-feed reconciliation always infers NEFT; the remaining modes come in
/// through manually keyed receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Neft,
    Rtgs,
    Cheque,
    Upi,
    Cash,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Neft => "NEFT",
            PaymentMode::Rtgs => "RTGS",
            PaymentMode::Cheque => "CHEQUE",
            PaymentMode::Upi => "UPI",
            PaymentMode::Cash => "CASH",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BillingError> {
        match s {
            "NEFT" => Ok(PaymentMode::Neft),
            "RTGS" => Ok(PaymentMode::Rtgs),
            "CHEQUE" => Ok(PaymentMode::Cheque),
            "UPI" => Ok(PaymentMode::Upi),
            "CASH" => Ok(PaymentMode::Cash),
            other => Err(BillingError::InvalidOperation(format!(
                "Unknown payment mode: {other}"
            ))),
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Funds confirmed against the invoice
    Received,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Received => "RECEIVED",
        }
    }
}

/// A payment applied to an invoice
///
/// Created exactly once per successful match and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Invoice the payment settles against
    pub invoice_id: InvoiceId,
    /// Payment amount
    pub amount: Money,
    /// Value date of the transfer
    pub payment_date: NaiveDate,
    /// Payment mode
    pub mode: PaymentMode,
    /// Bank reference (UTR / transaction id)
    pub reference: String,
    /// Status
    pub status: PaymentStatus,
    /// Provenance remarks (auto-synced vs manually matched, with UTR)
    pub remarks: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new received payment
    pub fn new(
        invoice_id: InvoiceId,
        amount: Money,
        payment_date: NaiveDate,
        mode: PaymentMode,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            invoice_id,
            amount,
            payment_date,
            mode,
            reference: reference.into(),
            status: PaymentStatus::Received,
            remarks: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Sets the provenance remarks
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_new() {
        let invoice_id = InvoiceId::new_v7();
        let payment = Payment::new(
            invoice_id,
            Money::new(dec!(5000), Currency::INR),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            PaymentMode::Neft,
            "UTR123456",
        )
        .with_remarks("Auto-synced, UTR: UTR123456");

        assert_eq!(payment.invoice_id, invoice_id);
        assert_eq!(payment.status, PaymentStatus::Received);
        assert_eq!(payment.mode, PaymentMode::Neft);
        assert_eq!(payment.reference, "UTR123456");
        assert!(payment.remarks.contains("UTR123456"));
    }

    #[test]
    fn test_mode_roundtrip() {
        for mode in [
            PaymentMode::Neft,
            PaymentMode::Rtgs,
            PaymentMode::Cheque,
            PaymentMode::Upi,
            PaymentMode::Cash,
        ] {
            assert_eq!(PaymentMode::parse(mode.as_str()).unwrap(), mode);
        }
    }

    #[test]
    fn test_mode_serde_uses_screaming_case() {
        let json = serde_json::to_string(&PaymentMode::Neft).unwrap();
        assert_eq!(json, "\"NEFT\"");
    }
}
