//! Build → persist → verify flows, including every failure verdict.

use std::sync::Arc;

use serde_json::{json, Value};
use veriseal_core::{
    FailureKind, LinkageCause, MemoryStore, RecordBuilder, RecordStore, Verification, Verifier,
};
use veriseal_hash::modified_hash;
use veriseal_ledger::AnchorStatus;

use crate::support::{sensor_section, test_config, FailingStore, PinnedStore, ScriptedLedger};

/// Build a record, persist it, and return (store, actual hash).
async fn seeded_store(ledger: Arc<ScriptedLedger>) -> (Arc<MemoryStore>, String) {
    let config = test_config(true);
    let builder = RecordBuilder::new(config, ledger);
    let record = builder
        .build(sensor_section(), "stm-dht11", Some(json!({"temperature": 24.0})))
        .await
        .expect("build succeeds");

    let store = Arc::new(MemoryStore::new());
    store
        .insert(&record.to_document())
        .await
        .expect("insert succeeds");
    (store, record.proof().actual_hash.clone())
}

#[tokio::test]
async fn fresh_record_verifies() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let (store, actual) = seeded_store(ledger.clone()).await;
    let verifier = Verifier::new(&test_config(true), store, ledger);

    let verdict = verifier.verify(&actual, false).await;
    assert_eq!(verdict, Verification::Pass { confirmation: None });
}

#[tokio::test]
async fn claimed_hash_is_normalized() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let (store, actual) = seeded_store(ledger.clone()).await;
    let verifier = Verifier::new(&test_config(true), store, ledger);

    let shouted = format!("  {}  ", actual.to_ascii_uppercase());
    assert!(verifier.verify(&shouted, false).await.passed());
}

#[tokio::test]
async fn flipped_hex_character_is_not_found() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let (store, actual) = seeded_store(ledger.clone()).await;
    let verifier = Verifier::new(&test_config(true), store, ledger);

    let mut flipped: Vec<char> = actual.chars().collect();
    flipped[0] = if flipped[0] == '0' { '1' } else { '0' };
    let flipped: String = flipped.into_iter().collect();

    match verifier.verify(&flipped, false).await {
        Verification::Fail { kind, .. } => assert_eq!(kind, FailureKind::NotFound),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn tampered_payload_is_integrity_failure() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let config = test_config(true);
    let builder = RecordBuilder::new(config.clone(), ledger.clone());
    let record = builder
        .build(sensor_section(), "stm-dht11", None)
        .await
        .unwrap();

    // Mutate a sensor value after the proof was attached.
    let mut document = record.to_document();
    document["sensor"]["temperature"] = json!(99.9);

    let store = Arc::new(MemoryStore::new());
    store.insert(&document).await.unwrap();
    let verifier = Verifier::new(&config, store, ledger);

    match verifier.verify(&record.proof().actual_hash, false).await {
        Verification::Fail { kind, .. } => assert_eq!(kind, FailureKind::Integrity),
        other => panic!("expected Integrity, got {other:?}"),
    }
}

#[tokio::test]
async fn every_payload_field_mutation_is_detected() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let config = test_config(true);
    let builder = RecordBuilder::new(config.clone(), ledger.clone());
    let record = builder
        .build(sensor_section(), "stm-dht11", Some(json!({"temperature": 24.0})))
        .await
        .unwrap();
    let actual = record.proof().actual_hash.clone();

    let fields = ["deviceId", "sensor", "weather", "ts", "board", "transport", "source"];
    for field in fields {
        let mut document = record.to_document();
        document[field] = json!("tampered");

        let store = Arc::new(MemoryStore::new());
        store.insert(&document).await.unwrap();
        let verifier = Verifier::new(&config, store, ledger.clone());

        match verifier.verify(&actual, false).await {
            Verification::Fail { kind, .. } => {
                assert_eq!(kind, FailureKind::Integrity, "field {field} mutation missed")
            },
            other => panic!("mutating {field} passed verification: {other:?}"),
        }
    }
}

#[tokio::test]
async fn forged_stored_actual_hash_is_claim_linkage_failure() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let config = test_config(true);
    let builder = RecordBuilder::new(config.clone(), ledger.clone());
    let record = builder
        .build(sensor_section(), "stm-dht11", None)
        .await
        .unwrap();

    let mut document = record.to_document();
    document["proof"]["actualHash"] = json!("ff".repeat(32));

    let store = Arc::new(MemoryStore::new());
    store.insert(&document).await.unwrap();
    let verifier = Verifier::new(&config, store, ledger);

    match verifier.verify(&record.proof().actual_hash, false).await {
        Verification::Fail { kind, .. } => {
            assert_eq!(kind, FailureKind::Linkage(LinkageCause::ClaimMismatch));
        },
        other => panic!("expected Linkage(ClaimMismatch), got {other:?}"),
    }
}

#[tokio::test]
async fn forged_index_document_is_proof_linkage_failure() {
    // A store whose index hands back a document whose stored modified
    // hash does not match the derivation for the claimed hash.
    let ledger = Arc::new(ScriptedLedger::accepting());
    let config = test_config(true);
    let builder = RecordBuilder::new(config.clone(), ledger.clone());
    let record = builder
        .build(sensor_section(), "stm-dht11", None)
        .await
        .unwrap();

    let mut document = record.to_document();
    document["proof"]["modifiedHash"] = json!("ee".repeat(32));

    let store = Arc::new(PinnedStore { document });
    let verifier = Verifier::new(&config, store, ledger);

    match verifier.verify(&record.proof().actual_hash, false).await {
        Verification::Fail { kind, .. } => {
            assert_eq!(kind, FailureKind::Linkage(LinkageCause::ProofMismatch));
        },
        other => panic!("expected Linkage(ProofMismatch), got {other:?}"),
    }
}

#[tokio::test]
async fn store_transport_failure_surfaces_as_lookup_failure() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let verifier = Verifier::new(&test_config(true), Arc::new(FailingStore), ledger);

    match verifier.verify(&"ab".repeat(32), false).await {
        Verification::Fail { kind, detail } => {
            assert_eq!(kind, FailureKind::NotFound);
            assert!(detail.contains("store lookup failed"));
        },
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn ledger_confirmation_reported_on_pass() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let (store, actual) = seeded_store(ledger.clone()).await;
    let verifier = Verifier::new(&test_config(true), store, ledger);

    match verifier.verify(&actual, true).await {
        Verification::Pass { confirmation } => {
            assert_eq!(confirmation.as_deref(), Some("finalized"));
        },
        other => panic!("expected Pass, got {other:?}"),
    }
}

#[tokio::test]
async fn pending_anchor_still_passes() {
    let ledger = Arc::new(ScriptedLedger::with_status(AnchorStatus::Pending));
    let (store, actual) = seeded_store(ledger.clone()).await;
    let verifier = Verifier::new(&test_config(true), store, ledger);

    match verifier.verify(&actual, true).await {
        Verification::Pass { confirmation } => {
            assert_eq!(confirmation.as_deref(), Some("pending"));
        },
        other => panic!("expected Pass, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_reference_is_chain_failure() {
    let ledger = Arc::new(ScriptedLedger::with_status(AnchorStatus::Unknown));
    let (store, actual) = seeded_store(ledger.clone()).await;
    let verifier = Verifier::new(&test_config(true), store, ledger);

    match verifier.verify(&actual, true).await {
        Verification::Fail { kind, detail } => {
            assert_eq!(kind, FailureKind::Chain);
            assert!(detail.contains("not found"));
        },
        other => panic!("expected Chain, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_transaction_is_chain_failure_with_reason() {
    let ledger = Arc::new(ScriptedLedger::with_status(AnchorStatus::Failed {
        reason: "InstructionError".to_string(),
    }));
    let (store, actual) = seeded_store(ledger.clone()).await;
    let verifier = Verifier::new(&test_config(true), store, ledger);

    match verifier.verify(&actual, true).await {
        Verification::Fail { kind, detail } => {
            assert_eq!(kind, FailureKind::Chain);
            assert!(detail.contains("InstructionError"));
        },
        other => panic!("expected Chain, got {other:?}"),
    }
}

#[tokio::test]
async fn verifier_leaves_store_unchanged() {
    let ledger = Arc::new(ScriptedLedger::accepting());
    let (store, actual) = seeded_store(ledger.clone()).await;
    let before = store.len();

    let verifier = Verifier::new(&test_config(true), store.clone(), ledger);
    let _ = verifier.verify(&actual, true).await;
    let _ = verifier.verify(&"00".repeat(32), false).await;

    assert_eq!(store.len(), before);
}

#[tokio::test]
async fn stored_document_survives_serde_round_trip() {
    // Verification must hold after the document passes through the
    // store's JSON representation, not just on the in-memory record.
    let ledger = Arc::new(ScriptedLedger::accepting());
    let (store, actual) = seeded_store(ledger.clone()).await;

    let lookup = modified_hash(&actual, "s");
    let document = store
        .find_by_modified_hash(&lookup)
        .await
        .unwrap()
        .expect("document stored under derived lookup hash");
    let reparsed: Value = serde_json::from_str(&document.to_string()).unwrap();

    let rehydrated = Arc::new(MemoryStore::new());
    rehydrated.insert(&reparsed).await.unwrap();

    let verifier = Verifier::new(&test_config(true), rehydrated, ledger);
    assert!(verifier.verify(&actual, false).await.passed());
}
