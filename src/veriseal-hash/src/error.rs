//! Error types for canonical encoding.

use thiserror::Error;

/// Errors that can occur while reducing a payload to its canonical form.
///
/// These are always local faults in the payload itself; they are fatal to
/// the build that produced the payload and are never retried.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A numeric value is NaN or infinite and has no canonical rendering.
    #[error("Non-finite number in payload: {context}")]
    NonFiniteNumber {
        /// Which value was non-finite (field name or position).
        context: String,
    },

    /// The payload could not be serialized to canonical JSON.
    #[error("Payload not representable in canonical form: {reason}")]
    Unrepresentable {
        /// Reason serialization failed.
        reason: String,
    },
}
