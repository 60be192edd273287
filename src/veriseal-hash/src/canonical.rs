//! Deterministic byte serialization of record payloads.
//!
//! The canonical form is compact UTF-8 JSON with map keys in byte-wise
//! sorted order. `serde_json`'s default object representation is an
//! ordered map, and its number formatter emits the shortest round-trip
//! rendering, so serializing a [`Value`] tree yields identical bytes for
//! semantically equal payloads no matter how they were assembled. The
//! `preserve_order` feature must stay off for this to hold.

use serde_json::{Map, Number, Value};

use crate::error::EncodingError;

/// Serialize a payload to its canonical byte encoding.
///
/// Two payloads that are equal as abstract values (same keys, same
/// values, any construction order) canonicalize to identical bytes.
/// Sequence order is preserved; it is semantically significant.
///
/// # Errors
///
/// Returns [`EncodingError::Unrepresentable`] if the payload cannot be
/// rendered as JSON. Payload assembly validates values before they reach
/// this point, so this is not an expected runtime path.
pub fn canonicalize(payload: &Map<String, Value>) -> Result<Vec<u8>, EncodingError> {
    serde_json::to_vec(payload).map_err(|e| EncodingError::Unrepresentable {
        reason: e.to_string(),
    })
}

/// Canonical form as a `String`, for logging and test assertions.
///
/// # Errors
///
/// Same failure surface as [`canonicalize`].
pub fn canonical_json(payload: &Map<String, Value>) -> Result<String, EncodingError> {
    serde_json::to_string(payload).map_err(|e| EncodingError::Unrepresentable {
        reason: e.to_string(),
    })
}

/// Convert a float into a canonical JSON number, rejecting NaN and
/// infinities.
///
/// Payload assembly must route every measured float through this so a
/// non-finite reading is caught before hashing, not silently rendered as
/// `null`.
///
/// # Errors
///
/// Returns [`EncodingError::NonFiniteNumber`] naming `context` when the
/// value has no canonical rendering.
pub fn finite_number(value: f64, context: &str) -> Result<Number, EncodingError> {
    Number::from_f64(value).ok_or_else(|| EncodingError::NonFiniteNumber {
        context: context.to_string(),
    })
}
