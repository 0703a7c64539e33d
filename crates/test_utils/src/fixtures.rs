//! Pre-built test data for common entities

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};

/// Money fixtures in the house currency
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical machining-job invoice total
    pub fn invoice_total() -> Money {
        Money::new(dec!(118000.00), Currency::INR)
    }

    /// A typical partial NEFT transfer
    pub fn partial_payment() -> Money {
        Money::new(dec!(50000.00), Currency::INR)
    }

    pub fn inr(amount: i64) -> Money {
        Money::new(rust_decimal::Decimal::from(amount), Currency::INR)
    }
}

/// Date fixtures
pub struct DateFixtures;

impl DateFixtures {
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date")
    }

    pub fn payment_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date")
    }
}

/// String fixtures matching the shop's numbering schemes
pub struct StringFixtures;

impl StringFixtures {
    pub fn invoice_number() -> &'static str {
        "AF/2425/0117"
    }

    pub fn party_name() -> &'static str {
        "Garuda Aerostructures Pvt Ltd"
    }

    pub fn utr_number() -> &'static str {
        "SBIN525010012345"
    }
}
