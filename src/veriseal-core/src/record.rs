//! The record and its proof block.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primary digest algorithm identifier, as persisted in proof blocks.
pub const HASH_ALGORITHM: &str = "sha256";

/// Derivation scheme identifier for the lookup token.
pub const MODIFIED_HASH_ALGORITHM: &str = "hmac-sha256(actualHash, secret)";

/// Board identifier recorded in every payload.
pub const BOARD: &str = "stm32";

/// Transport identifier recorded in every payload.
pub const TRANSPORT: &str = "wired-serial";

/// Ledger anchoring outcome inside a proof block.
///
/// Exactly one of `anchor_reference` / `anchor_error` is non-null once
/// anchoring has been attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorProof {
    /// Ledger endpoint the anchor was submitted to.
    pub ledger_endpoint: String,
    /// Transaction signature returned on acceptance.
    pub anchor_reference: Option<String>,
    /// Captured anchoring failure when anchoring is optional.
    pub anchor_error: Option<String>,
}

/// The proof block attached to a record after its payload is finalized.
///
/// Field names are the wire contract other tools rely on; they serialize
/// in camelCase exactly as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Content digest of the payload (lower-case hex, 64 chars).
    pub actual_hash: String,
    /// Secret-keyed lookup token (lower-case hex, 64 chars).
    pub modified_hash: String,
    /// Primary digest algorithm, always [`HASH_ALGORITHM`].
    pub hash_algorithm: String,
    /// Derivation scheme, always [`MODIFIED_HASH_ALGORITHM`].
    pub modified_hash_algorithm: String,
    /// Ledger anchoring outcome.
    pub anchor: AnchorProof,
}

/// A finished record: hashed payload plus proof block.
///
/// Constructed once by [`crate::builder::RecordBuilder`], immutable
/// thereafter. The payload is everything that was hashed; the proof is
/// attached after hashing and is never part of the hashed content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// The hashed payload sections, flattened into the document root.
    #[serde(flatten)]
    payload: Map<String, Value>,
    /// The proof block.
    proof: Proof,
}

impl Record {
    /// Assemble a record from a finalized payload and its proof.
    #[must_use]
    pub fn new(payload: Map<String, Value>, proof: Proof) -> Self {
        Self { payload, proof }
    }

    /// The hashed payload sections.
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// The attached proof block.
    #[must_use]
    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    /// Render the record as the document persisted to the store:
    /// payload fields at the root with the proof block alongside.
    #[must_use]
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
