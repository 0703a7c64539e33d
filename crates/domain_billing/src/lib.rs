//! Billing Domain - Invoice and Payment Ledgers
//!
//! This crate holds the two ledgers the reconciliation core writes to:
//!
//! - The **invoice ledger**: each invoice's total, paid amount, balance due
//!   and status, with `Invoice::apply_payment` as the single update rule.
//! - The **payment ledger**: append-only records of individual payments.
//!
//! The invariant `balance_due == total_amount - paid_amount` holds after
//! every mutation, and statuses are closed enums so transition logic lives
//! here rather than at call sites.

pub mod error;
pub mod invoice;
pub mod payment;

pub use error::BillingError;
pub use invoice::{Invoice, InvoiceStatus};
pub use payment::{Payment, PaymentMode, PaymentStatus};
