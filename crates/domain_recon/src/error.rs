//! Reconciliation domain errors

use thiserror::Error;

use domain_billing::BillingError;

/// Errors raised by the reconciliation core
///
/// The taxonomy maps one-to-one onto how callers must react: validation
/// failures are per-record and recoverable, not-found and conflict are
/// operator-facing precondition failures, and storage failures roll back
/// the whole ledger transaction.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Malformed record or request payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced sync record or invoice does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation conflicts with the record's current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence-layer failure; the enclosing transaction is rolled back
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReconError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReconError::Validation(message.into())
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ReconError::NotFound(format!("{entity} {id} not found"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ReconError::Conflict(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ReconError::Storage(message.into())
    }
}

impl From<BillingError> for ReconError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidPaymentAmount(amount) => {
                ReconError::Validation(format!("Invalid payment amount: {amount}"))
            }
            other => ReconError::Storage(other.to_string()),
        }
    }
}
