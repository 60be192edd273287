//! Required/optional anchoring policy behavior.

use std::sync::Arc;

use veriseal_core::{
    FailureKind, MemoryStore, RecordBuilder, RecordStore, SealError, Verification, Verifier,
};

use crate::support::{sensor_section, test_config, ScriptedLedger};

#[tokio::test]
async fn required_anchor_failure_aborts_and_persists_nothing() {
    let ledger = Arc::new(ScriptedLedger::refusing());
    let store = Arc::new(MemoryStore::new());
    let builder = RecordBuilder::new(test_config(true), ledger);

    let result = builder.build(sensor_section(), "stm-dht11", None).await;
    match result {
        Err(SealError::Anchor(e)) => assert!(e.to_string().contains("connection refused")),
        other => panic!("expected anchor error, got {other:?}"),
    }

    // The build never produced a record, so nothing reached the store.
    assert!(store.is_empty());
}

#[tokio::test]
async fn optional_anchor_failure_marks_record_unanchored() {
    let ledger = Arc::new(ScriptedLedger::refusing());
    let builder = RecordBuilder::new(test_config(false), ledger);

    let record = builder
        .build(sensor_section(), "stm-dht11", None)
        .await
        .expect("optional anchoring proceeds past the failure");

    let anchor = &record.proof().anchor;
    assert!(anchor.anchor_reference.is_none());
    assert!(anchor
        .anchor_error
        .as_deref()
        .is_some_and(|e| e.contains("connection refused")));
}

#[tokio::test]
async fn unanchored_record_verifies_but_fails_chain_check() {
    let ledger = Arc::new(ScriptedLedger::refusing());
    let config = test_config(false);
    let builder = RecordBuilder::new(config.clone(), ledger.clone());

    let record = builder
        .build(sensor_section(), "stm-dht11", None)
        .await
        .unwrap();
    let store = Arc::new(MemoryStore::new());
    store.insert(&record.to_document()).await.unwrap();

    let verifier = Verifier::new(&config, store, ledger);
    let actual = &record.proof().actual_hash;

    // Content checks pass: the payload is intact.
    assert!(verifier.verify(actual, false).await.passed());

    // Chain check fails: there is no reference to confirm.
    match verifier.verify(actual, true).await {
        Verification::Fail { kind, detail } => {
            assert_eq!(kind, FailureKind::Chain);
            assert!(detail.contains("no anchor reference"));
        },
        other => panic!("expected Chain failure, got {other:?}"),
    }
}

#[tokio::test]
async fn successful_anchor_records_reference_and_no_error() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let builder = RecordBuilder::new(test_config(true), ledger);

    let record = builder
        .build(sensor_section(), "stm-dht11", None)
        .await
        .unwrap();

    let anchor = &record.proof().anchor;
    assert!(anchor.anchor_reference.as_deref().is_some_and(|r| r.starts_with("sig-")));
    assert!(anchor.anchor_error.is_none());
    assert_eq!(anchor.ledger_endpoint, "https://ledger.test");
}
