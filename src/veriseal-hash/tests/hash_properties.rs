//! Property-based tests for canonicalization and the two-hash scheme.
//!
//! These pin the determinism and key-separation properties the rest of
//! the pipeline relies on: canonical bytes are a function of the
//! payload's abstract value, and the modified hash cannot be produced or
//! predicted without the secret.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};

use veriseal_hash::{actual_hash, canonicalize, modified_hash};

/// Strategy for payload map keys.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,11}"
}

/// Strategy for arbitrary JSON leaf values with finite numbers only.
fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        any::<f64>()
            .prop_filter("finite floats only", |f| f.is_finite())
            .prop_map(|f| Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

/// Strategy for nested JSON values up to a bounded depth.
fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(key_strategy(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for payloads: a map of named sections.
fn payload_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 1..6)
        .prop_map(|m| m.into_iter().collect())
}

fn assemble(entries: &[(String, Value)]) -> Map<String, Value> {
    entries.iter().cloned().collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Canonicalization is byte-identical across repeated calls.
    #[test]
    fn canonicalize_is_deterministic(entries in payload_strategy()) {
        let payload = assemble(&entries);
        let first = canonicalize(&payload).unwrap();
        let second = canonicalize(&payload).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Canonical bytes are independent of key insertion order.
    #[test]
    fn canonicalize_ignores_insertion_order(
        entries in payload_strategy(),
        seed in any::<u64>(),
    ) {
        let payload = assemble(&entries);

        // Deterministically shuffle the insertion order from the seed.
        let mut shuffled = entries.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            shuffled.swap(i, j);
        }
        let permuted = assemble(&shuffled);

        prop_assert_eq!(canonicalize(&payload).unwrap(), canonicalize(&permuted).unwrap());
    }

    /// The actual hash is stable across semantically equal reconstruction.
    #[test]
    fn actual_hash_is_stable(entries in payload_strategy()) {
        let payload = assemble(&entries);
        let rebuilt: Map<String, Value> =
            serde_json::from_slice(&canonicalize(&payload).unwrap()).unwrap();
        prop_assert_eq!(actual_hash(&payload).unwrap(), actual_hash(&rebuilt).unwrap());
    }

    /// Two different secrets never produce the same modified hash for the
    /// same actual hash.
    #[test]
    fn modified_hash_separates_secrets(
        entries in payload_strategy(),
        secret_a in "[a-z]{1,12}",
        secret_b in "[a-z]{1,12}",
    ) {
        prop_assume!(secret_a != secret_b);
        let actual = actual_hash(&assemble(&entries)).unwrap();
        prop_assert_ne!(modified_hash(&actual, &secret_a), modified_hash(&actual, &secret_b));
    }

    /// Brute force over a small secret space finds nothing cheaper than
    /// exhaustion: only the true secret reproduces the modified hash.
    #[test]
    fn modified_hash_requires_the_secret(
        entries in payload_strategy(),
        secret_index in 0usize..8,
    ) {
        let space = ["red", "orange", "yellow", "green", "blue", "indigo", "violet", "umber"];
        let secret = space[secret_index];

        let actual = actual_hash(&assemble(&entries)).unwrap();
        let target = modified_hash(&actual, secret);

        let matches: Vec<&str> = space
            .iter()
            .copied()
            .filter(|candidate| modified_hash(&actual, candidate) == target)
            .collect();
        prop_assert_eq!(matches, vec![secret]);
    }
}
