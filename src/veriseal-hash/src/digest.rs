//! The two-hash scheme: content digest and keyed lookup token.

use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::canonical::canonicalize;
use crate::error::EncodingError;

type HmacSha256 = Hmac<Sha256>;

/// Compute the actual hash of a payload: lower-case hex SHA-256 over the
/// canonical byte encoding.
///
/// No secret material is involved; anyone holding the payload can
/// recompute this digest, which is what makes the ledger anchor publicly
/// checkable.
///
/// # Errors
///
/// Propagates [`EncodingError`] from canonicalization.
pub fn actual_hash(payload: &Map<String, Value>) -> Result<String, EncodingError> {
    let canonical = canonicalize(payload)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

/// Derive the modified hash from an actual hash: lower-case hex
/// HMAC-SHA256 keyed with `secret` over the **hex string** of the actual
/// hash.
///
/// The message is the 64-character hex rendering, not the raw digest
/// bytes; previously anchored records were derived that way and changing
/// it would orphan them.
#[must_use]
pub fn modified_hash(actual_hash_hex: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(actual_hash_hex.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
