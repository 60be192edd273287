//! Independent record verification against store and ledger.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};
use veriseal_hash::{actual_hash, constant_time_eq, modified_hash};
use veriseal_ledger::{AnchorStatus, LedgerAnchor};

use crate::config::SealConfig;
use crate::store::RecordStore;

/// Which linkage comparison failed.
///
/// The two causes point at different culprits: a claim mismatch means the
/// caller presented the wrong hash, a proof mismatch means the stored
/// proof block itself is corrupted or forged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkageCause {
    /// The stored actual hash does not match the claimed hash.
    ClaimMismatch,
    /// The stored modified hash does not match the derived lookup token.
    ProofMismatch,
}

/// The four terminal failure kinds a verification can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No stored record matches the derived lookup hash.
    NotFound,
    /// The stored proof block disagrees with the claim or the derivation.
    Linkage(LinkageCause),
    /// The stored payload no longer reproduces the claimed hash — it was
    /// altered after anchoring.
    Integrity,
    /// The ledger could not confirm the anchor.
    Chain,
}

/// Outcome of a verification: a closed verdict, never a bare boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// All checks passed.
    Pass {
        /// Ledger confirmation tier, when a ledger check was requested.
        confirmation: Option<String>,
    },
    /// A check failed.
    Fail {
        /// Which check failed.
        kind: FailureKind,
        /// Human-readable cause.
        detail: String,
    },
}

impl Verification {
    /// Whether this verdict is a pass.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    fn fail(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Fail {
            kind,
            detail: detail.into(),
        }
    }
}

/// Re-derives both hashes for a claimed record and cross-checks the
/// store and, on demand, the ledger. Read-only everywhere: verification
/// never mutates the store or the ledger.
pub struct Verifier {
    secret: String,
    store: Arc<dyn RecordStore>,
    ledger: Arc<dyn LedgerAnchor>,
}

impl Verifier {
    /// Create a verifier over the given store and ledger.
    #[must_use]
    pub fn new(config: &SealConfig, store: Arc<dyn RecordStore>, ledger: Arc<dyn LedgerAnchor>) -> Self {
        Self {
            secret: config.tweak_secret.clone(),
            store,
            ledger,
        }
    }

    /// Verify a claimed actual hash against the stored record.
    ///
    /// Steps: normalize the claim, derive the lookup token, fetch the
    /// document, cross-check the stored proof hashes, recompute the
    /// actual hash over the reconstructed payload, and optionally query
    /// ledger confirmation. Store transport failures surface as the
    /// lookup's failure kind with the cause in the detail string.
    #[instrument(skip(self))]
    pub async fn verify(&self, claimed_actual_hash: &str, check_ledger: bool) -> Verification {
        let claimed = claimed_actual_hash.trim().to_ascii_lowercase();
        let expected_modified = modified_hash(&claimed, &self.secret);
        debug!(lookup = %expected_modified, "derived lookup hash");

        let document = match self.store.find_by_modified_hash(&expected_modified).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                return Verification::fail(
                    FailureKind::NotFound,
                    "no stored record matches the derived lookup hash",
                )
            },
            Err(e) => {
                warn!(error = %e, "store lookup failed");
                return Verification::fail(
                    FailureKind::NotFound,
                    format!("store lookup failed: {e}"),
                );
            },
        };

        let stored_actual = stored_proof_field(&document, "actualHash");
        if !constant_time_eq(&stored_actual, &claimed) {
            return Verification::fail(
                FailureKind::Linkage(LinkageCause::ClaimMismatch),
                "stored actual hash does not match the claimed hash",
            );
        }

        let stored_modified = stored_proof_field(&document, "modifiedHash");
        if !constant_time_eq(&stored_modified, &expected_modified) {
            return Verification::fail(
                FailureKind::Linkage(LinkageCause::ProofMismatch),
                "stored modified hash does not match the derived lookup hash",
            );
        }

        let payload = strip_non_hashed_fields(&document);
        let recomputed = match actual_hash(&payload) {
            Ok(digest) => digest,
            Err(e) => {
                return Verification::fail(
                    FailureKind::Integrity,
                    format!("stored payload could not be canonicalized: {e}"),
                )
            },
        };
        if !constant_time_eq(&recomputed, &claimed) {
            warn!(expected = %claimed, got = %recomputed, "payload integrity mismatch");
            return Verification::fail(
                FailureKind::Integrity,
                "recomputed payload hash differs from the claimed hash",
            );
        }

        if !check_ledger {
            info!("hash linkage and payload integrity verified");
            return Verification::Pass { confirmation: None };
        }

        self.check_chain(&document).await
    }

    /// Step 6: confirm the stored anchor reference on the ledger.
    async fn check_chain(&self, document: &Value) -> Verification {
        let reference = document
            .pointer("/proof/anchor/anchorReference")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty());

        let Some(reference) = reference else {
            return Verification::fail(FailureKind::Chain, "no anchor reference recorded");
        };

        match self.ledger.status(reference).await {
            Ok(AnchorStatus::Confirmed { tier }) => {
                info!(%tier, "anchor confirmed on ledger");
                Verification::Pass {
                    confirmation: Some(tier),
                }
            },
            Ok(AnchorStatus::Pending) => Verification::Pass {
                confirmation: Some("pending".to_string()),
            },
            Ok(AnchorStatus::Unknown) => {
                Verification::fail(FailureKind::Chain, "anchor reference not found on ledger")
            },
            Ok(AnchorStatus::Failed { reason }) => Verification::fail(
                FailureKind::Chain,
                format!("ledger reports transaction error: {reason}"),
            ),
            Err(e) => Verification::fail(FailureKind::Chain, format!("ledger query failed: {e}")),
        }
    }
}

/// Read a proof hash field from a stored document, lower-cased.
fn stored_proof_field(document: &Value, field: &str) -> String {
    document
        .pointer(&format!("/proof/{field}"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Reconstruct the payload as it was hashed: everything except the proof
/// block and any storage-assigned identifier.
fn strip_non_hashed_fields(document: &Value) -> Map<String, Value> {
    let mut payload = document.as_object().cloned().unwrap_or_default();
    payload.remove("proof");
    payload.remove("_id");
    payload
}
