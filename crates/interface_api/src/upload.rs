//! Bulk-upload CSV parsing
//!
//! The upstream tracking sheet exports one CSV row per payment. Cells are
//! coerced defensively: a missing or unparseable numeric cell becomes zero
//! and a missing text cell becomes the empty string, so a ragged export
//! still reaches the engine and gets judged there, row by row.

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;

use domain_recon::PaymentRecord;

use crate::error::ApiError;

/// Header set the upload sheet must carry
pub const EXPECTED_COLUMNS: [&str; 11] = [
    "Invoice Number",
    "Net Amount",
    "UTR Number",
    "UTR Total",
    "Date",
    "Division",
    "PO Number",
    "Gross Amount",
    "Diff % (Gross - Net)",
    "Confidence",
    "Mail Link",
];

/// Parses an uploaded CSV into feed records
pub fn parse_feed_csv(bytes: &[u8]) -> Result<Vec<PaymentRecord>, ApiError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ApiError::BadRequest(format!("Unreadable CSV header row: {e}")))?
        .clone();

    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .filter(|expected| {
            !headers
                .iter()
                .any(|h| h.eq_ignore_ascii_case(expected))
        })
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Upload is missing expected columns: {}",
            missing.join(", ")
        )));
    }

    let column = |name: &str| -> Option<usize> {
        headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| ApiError::BadRequest(format!("Unreadable CSV row: {e}")))?;
        records.push(record_from_row(&row, &column));
    }

    Ok(records)
}

fn record_from_row(
    row: &StringRecord,
    column: &impl Fn(&str) -> Option<usize>,
) -> PaymentRecord {
    let text = |name: &str| -> String {
        column(name)
            .and_then(|i| row.get(i))
            .unwrap_or("")
            .to_string()
    };
    let number = |name: &str| -> Decimal {
        column(name)
            .and_then(|i| row.get(i))
            .and_then(|cell| cell.trim().replace(',', "").parse::<Decimal>().ok())
            .unwrap_or(Decimal::ZERO)
    };

    PaymentRecord {
        invoice_number: text("Invoice Number"),
        net_amount: number("Net Amount"),
        utr_number: text("UTR Number"),
        utr_total: number("UTR Total"),
        date: text("Date"),
        division: text("Division"),
        po_number: text("PO Number"),
        gross_amount: number("Gross Amount"),
        diff_percent: number("Diff % (Gross - Net)"),
        confidence: text("Confidence"),
        mail_link: text("Mail Link"),
    }
}
