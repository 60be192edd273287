//! Error types for the record pipeline.

use thiserror::Error;

/// Errors that can occur while building or persisting records.
///
/// The pipeline never retries: every error is returned immediately with
/// its cause so the caller can decide on retry or escalation. Failed
/// verifications are not errors — they are verdicts, reported through
/// [`crate::verifier::Verification`].
#[derive(Debug, Error)]
pub enum SealError {
    /// The payload could not be canonically encoded.
    #[error("Encoding error: {0}")]
    Encoding(#[from] veriseal_hash::EncodingError),

    /// Ledger anchoring failed and the policy made it fatal.
    #[error("Anchor error: {0}")]
    Anchor(#[from] veriseal_ledger::AnchorError),

    /// Document store operation failed.
    #[error("Store error: {message}")]
    Store {
        /// Store-level cause.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// What is misconfigured.
        message: String,
    },
}
