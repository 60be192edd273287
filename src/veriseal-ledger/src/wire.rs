//! Legacy transaction wire encoding for memo anchors.
//!
//! A memo anchor is the smallest possible transaction: one signer (the
//! anchoring identity, which also pays the fee), one readonly program
//! account (the memo program), and a single instruction whose data is
//! the memo bytes. Layout, in order:
//!
//! ```text
//! shortvec(1) || signature(64) || message
//! message = header(3) || shortvec(account_keys) || blockhash(32)
//!           || shortvec(instructions)
//! instruction = program_index(1) || shortvec(account_indexes)
//!               || shortvec(data)
//! ```
//!
//! `shortvec` is the ledger's compact-u16 length prefix: little-endian,
//! 7 data bits per byte, high bit as continuation.

use crate::identity::AnchorIdentity;

/// A fully signed transaction ready for submission.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Complete wire bytes (signature section plus message).
    pub bytes: Vec<u8>,
    /// The identity's signature over the message, which doubles as the
    /// transaction's reference once the ledger accepts it.
    pub signature: [u8; 64],
}

/// Append a compact-u16 length prefix.
pub(crate) fn push_shortvec_len(out: &mut Vec<u8>, mut value: u16) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Build and sign a memo transaction.
///
/// Account table: index 0 is the signing identity (writable signer),
/// index 1 the memo program (readonly non-signer). The instruction
/// references no accounts; its data is the memo verbatim.
pub fn build_memo_transaction(
    identity: &AnchorIdentity,
    memo_program: &[u8; 32],
    recent_blockhash: &[u8; 32],
    memo: &[u8],
) -> SignedTransaction {
    let mut message = Vec::with_capacity(3 + 1 + 64 + 32 + 8 + memo.len());

    // Header: 1 required signature, 0 readonly signed, 1 readonly unsigned.
    message.push(1);
    message.push(0);
    message.push(1);

    // Account keys.
    push_shortvec_len(&mut message, 2);
    message.extend_from_slice(&identity.public_key());
    message.extend_from_slice(memo_program);

    message.extend_from_slice(recent_blockhash);

    // Instructions.
    push_shortvec_len(&mut message, 1);
    message.push(1); // program id index
    push_shortvec_len(&mut message, 0); // no instruction accounts
    push_shortvec_len(&mut message, memo.len() as u16);
    message.extend_from_slice(memo);

    let signature = identity.sign(&message);

    let mut bytes = Vec::with_capacity(1 + 64 + message.len());
    push_shortvec_len(&mut bytes, 1);
    bytes.extend_from_slice(&signature);
    bytes.extend_from_slice(&message);

    SignedTransaction { bytes, signature }
}
