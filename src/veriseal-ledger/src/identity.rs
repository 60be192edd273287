//! The Ed25519 anchoring identity that signs memo transactions.

use ed25519_dalek::{Signer, SigningKey};

use crate::error::AnchorError;

/// A configured anchoring identity.
///
/// Wraps the Ed25519 signing key that pays for and signs anchor
/// transactions. Identity material is provided as a base58 string of
/// either a 64-byte keypair (seed followed by public key, the common
/// wallet export format) or a bare 32-byte seed.
pub struct AnchorIdentity {
    signing_key: SigningKey,
}

impl AnchorIdentity {
    /// Parse identity material from its base58 encoding.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::InvalidIdentity`] if the encoding is not
    /// base58, the decoded length is neither 32 nor 64 bytes, or the
    /// public half of a 64-byte keypair does not match its seed.
    pub fn from_base58(encoded: &str) -> Result<Self, AnchorError> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| AnchorError::InvalidIdentity {
                reason: format!("not valid base58: {e}"),
            })?;

        let seed: [u8; 32] = match bytes.len() {
            32 => bytes.as_slice().try_into().map_err(|_| AnchorError::InvalidIdentity {
                reason: "seed must be 32 bytes".to_string(),
            })?,
            64 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes[..32]);
                let signing_key = SigningKey::from_bytes(&seed);
                if signing_key.verifying_key().to_bytes() != bytes[32..] {
                    return Err(AnchorError::InvalidIdentity {
                        reason: "keypair public half does not match seed".to_string(),
                    });
                }
                seed
            },
            other => {
                return Err(AnchorError::InvalidIdentity {
                    reason: format!("expected 32 or 64 bytes, got {other}"),
                })
            },
        };

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// The identity's public key bytes (its ledger account).
    #[must_use]
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The identity's base58 address, for logging.
    #[must_use]
    pub fn address(&self) -> String {
        bs58::encode(self.public_key()).into_string()
    }

    /// Sign a transaction message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for AnchorIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorIdentity")
            .field("address", &self.address())
            .finish()
    }
}
