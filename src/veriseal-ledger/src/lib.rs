//! # veriseal-ledger
//!
//! Ledger anchoring for VeriSeal records.
//!
//! A record's actual hash is published as opaque memo data in a new
//! transaction on a public append-only ledger, signed by a configured
//! anchoring identity. Submission acceptance yields a transaction
//! signature — the **anchor reference** — which is stored in the record's
//! proof block. Confirmation is a separate, read-only status query made
//! on demand by the verifier.
//!
//! The [`LedgerAnchor`] trait is the seam the rest of the pipeline
//! depends on; [`MemoLedger`] is the production implementation speaking
//! Solana-style JSON-RPC (memo program, legacy transaction wire format,
//! Ed25519 signing).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod anchor;
mod error;
mod identity;
mod memo;
mod wire;

pub use anchor::{AnchorStatus, LedgerAnchor};
pub use error::AnchorError;
pub use identity::AnchorIdentity;
pub use memo::{MemoLedger, DEFAULT_RPC_URL, MEMO_PROGRAM_ID};
pub use wire::SignedTransaction;
