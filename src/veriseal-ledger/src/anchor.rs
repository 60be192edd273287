//! The anchoring seam: submit a hash, query its confirmation status.

use async_trait::async_trait;

use crate::error::AnchorError;

/// Confirmation state of a previously submitted anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorStatus {
    /// The ledger has seen the transaction but not yet confirmed it.
    Pending,
    /// The transaction is confirmed at the named tier.
    Confirmed {
        /// Confirmation tier reported by the ledger (e.g. "confirmed",
        /// "finalized").
        tier: String,
    },
    /// The transaction failed on the ledger.
    Failed {
        /// Transaction-level error reported by the ledger.
        reason: String,
    },
    /// The ledger does not know this reference.
    Unknown,
}

/// A write-once, read-many anchoring backend.
///
/// `submit` succeeds on ledger **acceptance** of the transaction, not on
/// confirmation; `status` is the read-side query the verifier uses to
/// check confirmation later. Implementations make at most one network
/// call per method and never retry internally.
#[async_trait]
pub trait LedgerAnchor: Send + Sync {
    /// Publish `memo` as opaque data in a new ledger transaction.
    ///
    /// Returns the transaction signature as the anchor reference.
    async fn submit(&self, memo: &[u8]) -> Result<String, AnchorError>;

    /// Query the confirmation status of a previously returned reference.
    async fn status(&self, reference: &str) -> Result<AnchorStatus, AnchorError>;

    /// The ledger endpoint this anchor talks to, recorded in proof blocks.
    fn endpoint(&self) -> &str;
}
