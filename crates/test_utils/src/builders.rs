//! Test data builders
//!
//! Builder patterns for constructing test data with sensible defaults, so
//! tests specify only the fields they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::Money;
use domain_billing::Invoice;
use domain_recon::PaymentRecord;

use crate::fixtures::{DateFixtures, MoneyFixtures, StringFixtures};

/// Builder for test invoices
pub struct InvoiceBuilder {
    invoice_number: String,
    party_name: String,
    invoice_date: NaiveDate,
    total_amount: Money,
    sent: bool,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self {
            invoice_number: StringFixtures::invoice_number().to_string(),
            party_name: StringFixtures::party_name().to_string(),
            invoice_date: DateFixtures::invoice_date(),
            total_amount: MoneyFixtures::invoice_total(),
            sent: true,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party_name = party.into();
        self
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total_amount = total;
        self
    }

    /// Leaves the invoice in DRAFT instead of SENT
    pub fn draft(mut self) -> Self {
        self.sent = false;
        self
    }

    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(
            self.invoice_number,
            self.party_name,
            self.invoice_date,
            self.total_amount,
        );
        if self.sent {
            invoice.send();
        }
        invoice
    }
}

/// Builder for feed records
pub struct PaymentRecordBuilder {
    record: PaymentRecord,
}

impl Default for PaymentRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentRecordBuilder {
    pub fn new() -> Self {
        Self {
            record: PaymentRecord {
                invoice_number: StringFixtures::invoice_number().to_string(),
                net_amount: MoneyFixtures::invoice_total().amount(),
                utr_number: StringFixtures::utr_number().to_string(),
                utr_total: MoneyFixtures::invoice_total().amount(),
                date: DateFixtures::payment_date().format("%Y-%m-%d").to_string(),
                division: "Machining".to_string(),
                po_number: "PO-2425-081".to_string(),
                gross_amount: MoneyFixtures::invoice_total().amount(),
                diff_percent: Decimal::ZERO,
                confidence: "HIGH".to_string(),
                mail_link: "https://mail.example.com/thread/1".to_string(),
            },
        }
    }

    pub fn with_invoice_number(mut self, number: impl Into<String>) -> Self {
        self.record.invoice_number = number.into();
        self
    }

    pub fn with_net_amount(mut self, amount: Decimal) -> Self {
        self.record.net_amount = amount;
        self
    }

    pub fn with_utr(mut self, utr: impl Into<String>) -> Self {
        self.record.utr_number = utr.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.record.date = date.into();
        self
    }

    pub fn build(self) -> PaymentRecord {
        self.record
    }
}
