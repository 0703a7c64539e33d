//! Custom assertion helpers for domain types

use domain_billing::{Invoice, InvoiceStatus};

/// Asserts the invoice ledger invariant: balance equals total minus paid,
/// and the status reflects the numeric state.
pub fn assert_ledger_consistent(invoice: &Invoice) {
    assert_eq!(
        invoice.balance_due.amount(),
        invoice.total_amount.amount() - invoice.paid_amount.amount(),
        "balance_due must equal total_amount - paid_amount for {}",
        invoice.invoice_number
    );

    if !invoice.balance_due.is_positive() {
        assert_eq!(
            invoice.status,
            InvoiceStatus::Paid,
            "settled invoice {} must be PAID",
            invoice.invoice_number
        );
    } else if invoice.paid_amount.is_positive() {
        assert_eq!(
            invoice.status,
            InvoiceStatus::PartiallyPaid,
            "partly settled invoice {} must be PARTIALLY_PAID",
            invoice.invoice_number
        );
    }
}
