//! JSON-RPC memo ledger: the production [`LedgerAnchor`].

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::anchor::{AnchorStatus, LedgerAnchor};
use crate::error::AnchorError;
use crate::identity::AnchorIdentity;
use crate::wire::build_memo_transaction;

/// Well-known memo program identity anchors are published under.
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Default RPC endpoint (devnet).
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Ledger anchor over Solana-style JSON-RPC.
///
/// Submission fetches the latest blockhash, builds a single-instruction
/// memo transaction signed by the anchoring identity, and posts it via
/// `sendTransaction`. Status queries go through `getSignatureStatuses`.
/// Each operation is a single attempt bounded by the configured timeout;
/// retry policy belongs to the caller.
pub struct MemoLedger {
    client: Client,
    rpc_url: String,
    memo_program: [u8; 32],
    identity: Option<AnchorIdentity>,
}

impl MemoLedger {
    /// Create a new memo ledger client.
    ///
    /// `identity_base58` may be `None` for read-only use (status queries);
    /// submission will then fail with [`AnchorError::IdentityUnconfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::Config`] if the program id or HTTP client
    /// configuration is unusable, [`AnchorError::InvalidIdentity`] if the
    /// identity material does not parse.
    pub fn new(
        rpc_url: &str,
        memo_program_id: &str,
        identity_base58: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, AnchorError> {
        let program_bytes = bs58::decode(memo_program_id)
            .into_vec()
            .map_err(|e| AnchorError::Config {
                message: format!("memo program id is not base58: {e}"),
            })?;
        let memo_program: [u8; 32] =
            program_bytes
                .as_slice()
                .try_into()
                .map_err(|_| AnchorError::Config {
                    message: format!(
                        "memo program id must decode to 32 bytes, got {}",
                        program_bytes.len()
                    ),
                })?;

        let identity = identity_base58
            .filter(|s| !s.trim().is_empty())
            .map(AnchorIdentity::from_base58)
            .transpose()?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("veriseal/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnchorError::Config {
                message: format!("failed to create RPC client: {e}"),
            })?;

        Ok(Self {
            client,
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            memo_program,
            identity,
        })
    }

    /// Issue a JSON-RPC call and return the `result` value.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, AnchorError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnchorError::Transport {
                message: format!("{method} request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(AnchorError::Transport {
                message: format!("{method} HTTP error: {}", response.status()),
            });
        }

        let envelope: Value = response.json().await.map_err(|e| AnchorError::Transport {
            message: format!("{method} returned malformed JSON: {e}"),
        })?;

        if let Some(err) = envelope.get("error").filter(|e| !e.is_null()) {
            let reason = err
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| err.to_string(), ToString::to_string);
            return Err(AnchorError::Rejected { reason });
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| AnchorError::Rejected {
                reason: format!("{method} response carried no result"),
            })
    }

    /// Fetch the latest blockhash for transaction construction.
    async fn latest_blockhash(&self) -> Result<[u8; 32], AnchorError> {
        let result = self.rpc_call("getLatestBlockhash", json!([])).await?;
        let encoded = result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| AnchorError::Rejected {
                reason: "getLatestBlockhash response missing blockhash".to_string(),
            })?;

        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| AnchorError::Rejected {
                reason: format!("blockhash is not base58: {e}"),
            })?;
        bytes.as_slice().try_into().map_err(|_| AnchorError::Rejected {
            reason: format!("blockhash must be 32 bytes, got {}", bytes.len()),
        })
    }
}

#[async_trait]
impl LedgerAnchor for MemoLedger {
    #[instrument(skip(self, memo), fields(memo_len = memo.len()))]
    async fn submit(&self, memo: &[u8]) -> Result<String, AnchorError> {
        let identity = self
            .identity
            .as_ref()
            .ok_or(AnchorError::IdentityUnconfigured)?;

        let blockhash = self.latest_blockhash().await?;
        let tx = build_memo_transaction(identity, &self.memo_program, &blockhash, memo);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&tx.bytes);
        debug!(signer = %identity.address(), "submitting memo transaction");

        let result = self
            .rpc_call(
                "sendTransaction",
                json!([encoded, {"encoding": "base64"}]),
            )
            .await?;

        let reference = result.as_str().ok_or_else(|| AnchorError::Rejected {
            reason: format!("sendTransaction returned non-string result: {result}"),
        })?;

        info!(reference, "ledger accepted anchor transaction");
        Ok(reference.to_string())
    }

    #[instrument(skip(self))]
    async fn status(&self, reference: &str) -> Result<AnchorStatus, AnchorError> {
        let result = self
            .rpc_call(
                "getSignatureStatuses",
                json!([[reference], {"searchTransactionHistory": true}]),
            )
            .await?;

        let status = parse_signature_status(result.pointer("/value/0"));
        if matches!(status, AnchorStatus::Unknown) {
            warn!(reference, "anchor reference not known to ledger");
        }
        Ok(status)
    }

    fn endpoint(&self) -> &str {
        &self.rpc_url
    }
}

/// Map one `getSignatureStatuses` slot into an [`AnchorStatus`].
fn parse_signature_status(entry: Option<&Value>) -> AnchorStatus {
    let Some(entry) = entry.filter(|v| !v.is_null()) else {
        return AnchorStatus::Unknown;
    };

    if let Some(err) = entry.get("err").filter(|e| !e.is_null()) {
        return AnchorStatus::Failed {
            reason: err.to_string(),
        };
    }

    match entry.get("confirmationStatus").and_then(Value::as_str) {
        Some("processed") | None => AnchorStatus::Pending,
        Some(tier) => AnchorStatus::Confirmed {
            tier: tier.to_string(),
        },
    }
}
