//! Matching engine and manual workflow tests against the in-memory store

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, InvoiceId, Money};
use domain_billing::{Invoice, InvoiceStatus, PaymentMode, PaymentStatus};
use domain_recon::{
    actors, ManualResolution, MatchingEngine, MemoryStore, OutcomeKind, PaymentRecord,
    ReconError, ReconStore, SyncStatus,
};

fn seeded_store(invoices: &[(&str, &str, i64)]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (number, party, total) in invoices {
        let mut invoice = Invoice::new(
            *number,
            *party,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            Money::new(rust_decimal::Decimal::from(*total), Currency::INR),
        );
        invoice.send();
        store.seed_invoice(invoice);
    }
    store
}

async fn invoice_id_by_number(store: &MemoryStore, number: &str) -> InvoiceId {
    store
        .find_invoice_by_number(number)
        .await
        .unwrap()
        .expect("invoice seeded")
        .id
}

fn feed_record(invoice: &str, amount: rust_decimal::Decimal, utr: &str, date: &str) -> PaymentRecord {
    PaymentRecord {
        invoice_number: invoice.to_string(),
        net_amount: amount,
        utr_number: utr.to_string(),
        date: date.to_string(),
        division: "Machining".to_string(),
        po_number: "PO-77".to_string(),
        ..Default::default()
    }
}

/// Scenario A: single full payment settles the invoice.
#[tokio::test]
async fn full_payment_marks_invoice_paid() {
    let store = seeded_store(&[("INV-100", "Garuda Aerostructures", 10000)]);
    let engine = MatchingEngine::new(store.clone());

    let result = engine
        .process_batch(
            &[feed_record("INV-100", dec!(10000), "UTR1", "2025-01-10")],
            actors::API_KEY_USER,
        )
        .await;

    assert_eq!(result.matched, 1);
    assert_eq!(result.unmatched, 0);
    assert_eq!(result.errors, 0);

    let records = store.sync_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, SyncStatus::Matched);
    assert!(records[0].payment_id.is_some());

    let invoice_id = records[0].invoice_id.unwrap();
    let invoice = store.invoice(invoice_id).unwrap();
    assert_eq!(invoice.paid_amount.amount(), dec!(10000));
    assert_eq!(invoice.balance_due.amount(), dec!(0));
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    let payments = store.payments_for(invoice_id);
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount.amount(), dec!(10000));
    assert_eq!(payments[0].mode, PaymentMode::Neft);
    assert_eq!(payments[0].status, PaymentStatus::Received);
    assert_eq!(payments[0].reference, "UTR1");
    assert_eq!(payments[0].remarks, "Auto-synced, UTR: UTR1");
    assert_eq!(
        payments[0].payment_date,
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    );
}

/// Scenario B: two records for the same invoice in one batch compose in
/// input order and settle the balance exactly.
#[tokio::test]
async fn same_invoice_records_compose_within_batch() {
    let store = seeded_store(&[("INV-100", "Garuda Aerostructures", 10000)]);
    let engine = MatchingEngine::new(store.clone());

    let result = engine
        .process_batch(
            &[
                feed_record("INV-100", dec!(4000), "UTR-A", "2025-01-10"),
                feed_record("INV-100", dec!(6000), "UTR-B", "2025-01-11"),
            ],
            actors::API_KEY_USER,
        )
        .await;

    assert_eq!(result.matched, 2);

    let invoice_id = invoice_id_by_number(&store, "INV-100").await;
    let invoice = store.invoice(invoice_id).unwrap();
    assert_eq!(invoice.balance_due.amount(), dec!(0));
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    assert_eq!(store.payments_for(invoice_id).len(), 2);
    let records = store.sync_records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == SyncStatus::Matched));
}

/// Scenario C: an unknown invoice number leaves an unmatched receipt which
/// can later be manually bound to an existing invoice.
#[tokio::test]
async fn unmatched_record_resolves_via_manual_match() {
    let store = seeded_store(&[("INV-200", "Indus Avionics", 5000)]);
    let engine = MatchingEngine::new(store.clone());

    let result = engine
        .process_batch(
            &[feed_record("INV-999", dec!(5000), "UTR-X", "2025-01-12")],
            actors::API_KEY_USER,
        )
        .await;

    assert_eq!(result.unmatched, 1);

    let records = store.sync_records();
    assert_eq!(records[0].status, SyncStatus::Unmatched);
    assert!(records[0].invoice_id.is_none());
    assert!(records[0].payment_id.is_none());

    let invoice_id = invoice_id_by_number(&store, "INV-200").await;
    // No invoice was touched by the unmatched ingestion.
    let invoice = store.invoice(invoice_id).unwrap();
    assert!(invoice.paid_amount.is_zero());

    let workflow = ManualResolution::new(store.clone());
    workflow
        .manual_match(records[0].id, invoice_id, "ops.nair")
        .await
        .unwrap();

    let records = store.sync_records();
    assert_eq!(records[0].status, SyncStatus::Matched);
    assert_eq!(records[0].invoice_id, Some(invoice_id));
    assert!(records[0].payment_id.is_some());

    let invoice = store.invoice(invoice_id).unwrap();
    assert_eq!(invoice.balance_due.amount(), dec!(0));
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    let payments = store.payments_for(invoice_id);
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].remarks, "Manually matched, UTR: UTR-X");
}

/// Matching is case-insensitive on the invoice number.
#[tokio::test]
async fn lookup_is_case_insensitive() {
    let store = seeded_store(&[("INV-001", "Garuda Aerostructures", 1000)]);
    let engine = MatchingEngine::new(store.clone());

    let result = engine
        .process_batch(
            &[feed_record("inv-001", dec!(1000), "UTR-C", "2025-01-10")],
            actors::API_KEY_USER,
        )
        .await;

    assert_eq!(result.matched, 1);
}

/// One unparseable record must not poison the rest of the batch.
#[tokio::test]
async fn batch_isolates_record_failures() {
    let store = seeded_store(&[("INV-100", "Garuda Aerostructures", 1_000_000)]);
    let engine = MatchingEngine::new(store.clone());

    let mut records = vec![feed_record(
        "INV-100",
        dec!(100),
        "UTR-BAD",
        "not-a-date",
    )];
    for n in 0..9 {
        let invoice = if n < 5 { "INV-100" } else { "INV-404" };
        records.push(feed_record(
            invoice,
            dec!(100),
            &format!("UTR-{n}"),
            "2025-01-10",
        ));
    }

    let result = engine.process_batch(&records, actors::API_KEY_USER).await;

    assert_eq!(result.errors, 1);
    assert_eq!(result.matched + result.unmatched, 9);
    assert_eq!(result.details.len(), 10);
    assert_eq!(result.details[0].outcome, OutcomeKind::Error);
    assert!(result.details[0].message.is_some());

    // The bad row still left an audit receipt, in ERROR status.
    let error_rows: Vec<_> = store
        .sync_records()
        .into_iter()
        .filter(|r| r.status == SyncStatus::Error)
        .collect();
    assert_eq!(error_rows.len(), 1);
    assert!(error_rows[0].error_message.is_some());
}

/// At-least-once upstream delivery: a repeated record produces a second,
/// auditable receipt and a second payment rather than corrupting the first.
#[tokio::test]
async fn duplicate_delivery_creates_second_receipt() {
    let store = seeded_store(&[("INV-100", "Garuda Aerostructures", 10000)]);
    let engine = MatchingEngine::new(store.clone());
    let record = feed_record("INV-100", dec!(4000), "UTR-DUP", "2025-01-10");

    let first = engine
        .process_batch(std::slice::from_ref(&record), actors::API_KEY_USER)
        .await;
    let second = engine
        .process_batch(std::slice::from_ref(&record), actors::API_KEY_USER)
        .await;

    assert_eq!(first.matched, 1);
    assert_eq!(second.matched, 1);

    let records = store.sync_records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == SyncStatus::Matched));
    assert_ne!(records[0].id, records[1].id);
    assert_ne!(records[0].payment_id, records[1].payment_id);

    let invoice_id = invoice_id_by_number(&store, "INV-100").await;
    let invoice = store.invoice(invoice_id).unwrap();
    assert_eq!(invoice.paid_amount.amount(), dec!(8000));
    assert_eq!(store.payments_for(invoice_id).len(), 2);
}

/// Second manual match on the same record must conflict without touching
/// the invoice again.
#[tokio::test]
async fn manual_match_rejects_double_application() {
    let store = seeded_store(&[("INV-300", "Indus Avionics", 9000)]);
    let engine = MatchingEngine::new(store.clone());
    engine
        .process_batch(
            &[feed_record("INV-301", dec!(9000), "UTR-M", "2025-01-15")],
            actors::API_KEY_USER,
        )
        .await;

    let sync_id = store.sync_records()[0].id;
    let invoice_id = invoice_id_by_number(&store, "INV-300").await;
    let workflow = ManualResolution::new(store.clone());

    workflow
        .manual_match(sync_id, invoice_id, "ops.nair")
        .await
        .unwrap();
    let after_first = store.invoice(invoice_id).unwrap();

    let second = workflow.manual_match(sync_id, invoice_id, "ops.nair").await;
    assert!(matches!(second, Err(ReconError::Conflict(_))));

    let after_second = store.invoice(invoice_id).unwrap();
    assert_eq!(after_first.paid_amount, after_second.paid_amount);
    assert_eq!(store.payments_for(invoice_id).len(), 1);
}

/// Manual match against entities that do not exist fails cleanly.
#[tokio::test]
async fn manual_match_preconditions() {
    let store = seeded_store(&[("INV-300", "Indus Avionics", 9000)]);
    let workflow = ManualResolution::new(store.clone());
    let invoice_id = invoice_id_by_number(&store, "INV-300").await;

    let missing_sync = workflow
        .manual_match(core_kernel::SyncRecordId::new(), invoice_id, "ops.nair")
        .await;
    assert!(matches!(missing_sync, Err(ReconError::NotFound(_))));

    let engine = MatchingEngine::new(store.clone());
    engine
        .process_batch(
            &[feed_record("INV-888", dec!(100), "UTR-N", "2025-01-15")],
            actors::API_KEY_USER,
        )
        .await;
    let sync_id = store.sync_records()[0].id;

    let missing_invoice = workflow
        .manual_match(sync_id, InvoiceId::new(), "ops.nair")
        .await;
    assert!(matches!(missing_invoice, Err(ReconError::NotFound(_))));

    // Preconditions failed, so nothing moved.
    assert_eq!(store.sync_records()[0].status, SyncStatus::Unmatched);
    assert!(store.invoice(invoice_id).unwrap().paid_amount.is_zero());
}

/// Ignoring removes a record from the queue without ledger effect; a
/// matched record cannot be ignored.
#[tokio::test]
async fn ignore_dismisses_only_unmatched_records() {
    let store = seeded_store(&[("INV-100", "Garuda Aerostructures", 10000)]);
    let engine = MatchingEngine::new(store.clone());
    engine
        .process_batch(
            &[
                feed_record("INV-100", dec!(10000), "UTR-1", "2025-01-10"),
                feed_record("INV-404", dec!(50), "UTR-2", "2025-01-10"),
            ],
            actors::API_KEY_USER,
        )
        .await;

    let records = store.sync_records();
    let matched = records.iter().find(|r| r.status == SyncStatus::Matched).unwrap();
    let unmatched = records
        .iter()
        .find(|r| r.status == SyncStatus::Unmatched)
        .unwrap();

    let workflow = ManualResolution::new(store.clone());
    workflow.ignore(unmatched.id, "ops.nair").await.unwrap();
    assert_eq!(
        store
            .sync_records()
            .iter()
            .filter(|r| r.status == SyncStatus::Ignored)
            .count(),
        1
    );

    let refused = workflow.ignore(matched.id, "ops.nair").await;
    assert!(matches!(refused, Err(ReconError::Conflict(_))));
}

/// Candidate search is substring, case-insensitive, and gated on length.
#[tokio::test]
async fn search_invoices_behaviour() {
    let store = seeded_store(&[
        ("INV-100", "Garuda Aerostructures", 1000),
        ("INV-101", "Indus Avionics", 2000),
        ("DC-55", "Garuda Aerostructures", 3000),
    ]);
    let workflow = ManualResolution::new(store.clone());

    let by_number = workflow.search_invoices("inv-1").await.unwrap();
    assert_eq!(by_number.len(), 2);

    let by_party = workflow.search_invoices("garuda").await.unwrap();
    assert_eq!(by_party.len(), 2);

    let too_short = workflow.search_invoices("i").await.unwrap();
    assert!(too_short.is_empty());
}

/// Every ledger mutation leaves an audit entry tagged with the actor.
#[tokio::test]
async fn audit_trail_records_actor() {
    let store = seeded_store(&[("INV-100", "Garuda Aerostructures", 10000)]);
    let engine = MatchingEngine::new(store.clone());
    engine
        .process_batch(
            &[feed_record("INV-100", dec!(10000), "UTR-1", "2025-01-10")],
            actors::MANUAL_UPLOAD,
        )
        .await;

    let events = store.audit_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].entity, "Payment");
    assert_eq!(events[0].actor, actors::MANUAL_UPLOAD);
    assert_eq!(events[0].payload["utrNumber"], "UTR-1");
}
