//! Core Kernel - Foundational types and utilities for the ERP system
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers

pub mod identifiers;
pub mod money;

pub use identifiers::{AuditEventId, InvoiceId, PaymentId, SyncRecordId};
pub use money::{Currency, Money, MoneyError};
