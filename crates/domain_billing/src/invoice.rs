//! Invoice ledger
//!
//! This module holds the invoice entity and the payment application rule
//! shared by every path that credits money against an invoice.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, InvoiceId, Money};

use crate::error::BillingError;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Invoice is being drafted
    Draft,
    /// Invoice has been sent to the customer
    Sent,
    /// Partial payment received
    PartiallyPaid,
    /// Fully paid
    Paid,
    /// Cancelled/voided
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the database representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::PartiallyPaid => "PARTIALLY_PAID",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses the database representation of the status
    pub fn parse(s: &str) -> Result<Self, BillingError> {
        match s {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "SENT" => Ok(InvoiceStatus::Sent),
            "PARTIALLY_PAID" => Ok(InvoiceStatus::PartiallyPaid),
            "PAID" => Ok(InvoiceStatus::Paid),
            "CANCELLED" => Ok(InvoiceStatus::Cancelled),
            other => Err(BillingError::InvalidOperation(format!(
                "Unknown invoice status: {other}"
            ))),
        }
    }
}

/// An invoice raised against a customer purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice number (human-readable, unique case-insensitively)
    pub invoice_number: String,
    /// Name of the party being billed
    pub party_name: String,
    /// Invoice date
    pub invoice_date: NaiveDate,
    /// Currency
    pub currency: Currency,
    /// Total amount
    pub total_amount: Money,
    /// Amount paid to date
    pub paid_amount: Money,
    /// Balance due (always `total_amount - paid_amount`)
    pub balance_due: Money,
    /// Status
    pub status: InvoiceStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new invoice with nothing paid against it
    pub fn new(
        invoice_number: impl Into<String>,
        party_name: impl Into<String>,
        invoice_date: NaiveDate,
        total_amount: Money,
    ) -> Self {
        let now = Utc::now();
        let currency = total_amount.currency();

        Self {
            id: InvoiceId::new_v7(),
            invoice_number: invoice_number.into(),
            party_name: party_name.into(),
            invoice_date,
            currency,
            total_amount,
            paid_amount: Money::zero(currency),
            balance_due: total_amount,
            status: InvoiceStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the invoice as sent
    pub fn send(&mut self) {
        self.status = InvoiceStatus::Sent;
        self.updated_at = Utc::now();
    }

    /// Applies a payment amount to the invoice
    ///
    /// This is the single update rule both the matching engine and the
    /// manual resolution workflow go through. After the call:
    ///
    /// - `paid_amount` has grown by `amount`
    /// - `balance_due == total_amount - paid_amount` exactly
    /// - `status` is `Paid` when the balance reaches zero or below,
    ///   `PartiallyPaid` when something has been paid and a balance remains,
    ///   and otherwise keeps its prior non-payment value
    pub fn apply_payment(&mut self, amount: Money) -> Result<(), BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::InvalidPaymentAmount(amount.amount()));
        }

        let new_paid = self.paid_amount.checked_add(&amount)?;
        let new_balance = self.total_amount.checked_sub(&new_paid)?;

        self.paid_amount = new_paid;
        self.balance_due = new_balance;
        self.status = if !new_balance.is_positive() {
            InvoiceStatus::Paid
        } else if new_paid.is_positive() {
            InvoiceStatus::PartiallyPaid
        } else {
            self.status
        };
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Returns true when nothing is owed on the invoice
    pub fn is_settled(&self) -> bool {
        !self.balance_due.is_positive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_invoice(total: Money) -> Invoice {
        Invoice::new(
            "INV-100",
            "Garuda Aerostructures",
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            total,
        )
    }

    #[test]
    fn test_new_invoice_balance_equals_total() {
        let invoice = sample_invoice(Money::new(dec!(10000), Currency::INR));

        assert_eq!(invoice.balance_due, invoice.total_amount);
        assert!(invoice.paid_amount.is_zero());
        assert_eq!(invoice.status, InvoiceStatus::Draft);
    }

    #[test]
    fn test_partial_payment() {
        let mut invoice = sample_invoice(Money::new(dec!(10000), Currency::INR));
        invoice.send();

        invoice
            .apply_payment(Money::new(dec!(4000), Currency::INR))
            .unwrap();

        assert_eq!(invoice.paid_amount.amount(), dec!(4000));
        assert_eq!(invoice.balance_due.amount(), dec!(6000));
        assert_eq!(invoice.status, InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn test_full_payment() {
        let mut invoice = sample_invoice(Money::new(dec!(10000), Currency::INR));
        invoice.send();

        invoice
            .apply_payment(Money::new(dec!(10000), Currency::INR))
            .unwrap();

        assert_eq!(invoice.balance_due.amount(), dec!(0));
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(invoice.is_settled());
    }

    #[test]
    fn test_overpayment_still_marks_paid() {
        let mut invoice = sample_invoice(Money::new(dec!(10000), Currency::INR));

        invoice
            .apply_payment(Money::new(dec!(12000), Currency::INR))
            .unwrap();

        assert_eq!(invoice.balance_due.amount(), dec!(-2000));
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_zero_payment_rejected() {
        let mut invoice = sample_invoice(Money::new(dec!(10000), Currency::INR));

        let result = invoice.apply_payment(Money::zero(Currency::INR));
        assert!(matches!(
            result,
            Err(BillingError::InvalidPaymentAmount(_))
        ));
        assert!(invoice.paid_amount.is_zero());
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut invoice = sample_invoice(Money::new(dec!(10000), Currency::INR));

        let result = invoice.apply_payment(Money::new(dec!(100), Currency::USD));
        assert!(result.is_err());
        assert!(invoice.paid_amount.is_zero());
        assert_eq!(invoice.balance_due, invoice.total_amount);
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::PartiallyPaid,
            InvoiceStatus::Paid,
            InvoiceStatus::Cancelled,
        ] {
            assert_eq!(InvoiceStatus::parse(status.as_str()).unwrap(), status);
        }
    }
}
