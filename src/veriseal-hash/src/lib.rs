//! # veriseal-hash
//!
//! Canonical serialization and the two-hash scheme for VeriSeal records.
//!
//! A record payload is reduced to a unique byte encoding (the canonical
//! form), from which two digests are derived:
//!
//! - the **actual hash**: `SHA-256(canonicalize(payload))`, the public
//!   content digest that gets anchored on the ledger;
//! - the **modified hash**: `HMAC-SHA256(secret, actual_hash_hex)`, a
//!   secret-keyed lookup token used as the document store's index key.
//!
//! Keeping the two apart means a ledger entry alone never reveals which
//! store key a record lives under, and the store key alone cannot be
//! reversed into the anchored digest without the secret.
//!
//! Everything in this crate is pure: no I/O, no clocks, no global state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod canonical;
mod digest;
mod error;

pub use canonical::{canonical_json, canonicalize, finite_number};
pub use digest::{actual_hash, modified_hash};
pub use error::EncodingError;

/// Constant-time comparison of two hex digest strings.
///
/// Digest comparisons during verification go through this helper so a
/// mismatch position is not observable through timing. Inputs of unequal
/// length compare unequal immediately; digest lengths are not secret.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
