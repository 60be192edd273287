//! Error types for ledger anchoring.

use thiserror::Error;

/// Errors that can occur while anchoring a hash or querying its status.
///
/// Every variant carries a human-readable cause; whether an anchoring
/// failure aborts a record build or is captured into the proof block is
/// decided by the record builder, not here.
#[derive(Debug, Error)]
pub enum AnchorError {
    /// No anchoring identity is configured.
    #[error("Anchoring identity is not configured")]
    IdentityUnconfigured,

    /// The configured anchoring identity could not be parsed.
    #[error("Invalid anchoring identity: {reason}")]
    InvalidIdentity {
        /// Reason the identity material is unusable.
        reason: String,
    },

    /// Ledger endpoint or program identity is misconfigured.
    #[error("Ledger configuration error: {message}")]
    Config {
        /// What is misconfigured.
        message: String,
    },

    /// The ledger endpoint could not be reached or timed out.
    #[error("Ledger transport error: {message}")]
    Transport {
        /// Transport-level cause.
        message: String,
    },

    /// The ledger accepted the connection but rejected the request.
    #[error("Ledger rejected request: {reason}")]
    Rejected {
        /// Rejection cause reported by the ledger.
        reason: String,
    },
}
