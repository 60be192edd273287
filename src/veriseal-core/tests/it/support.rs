//! Shared ledger and store stand-ins for the flow tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use veriseal_core::{RecordStore, SealConfig, SealError};
use veriseal_ledger::{AnchorError, AnchorStatus, LedgerAnchor};

/// Ledger double with scripted submit and status outcomes.
pub struct ScriptedLedger {
    pub fail_submit: bool,
    pub status: AnchorStatus,
}

impl ScriptedLedger {
    pub fn accepting() -> Self {
        Self {
            fail_submit: false,
            status: AnchorStatus::Confirmed {
                tier: "finalized".to_string(),
            },
        }
    }

    pub fn refusing() -> Self {
        Self {
            fail_submit: true,
            status: AnchorStatus::Unknown,
        }
    }

    pub fn with_status(status: AnchorStatus) -> Self {
        Self {
            fail_submit: false,
            status,
        }
    }
}

#[async_trait]
impl LedgerAnchor for ScriptedLedger {
    async fn submit(&self, memo: &[u8]) -> Result<String, AnchorError> {
        if self.fail_submit {
            return Err(AnchorError::Transport {
                message: "connection refused".to_string(),
            });
        }
        Ok(format!("sig-{}", hex::encode(&memo[..4.min(memo.len())])))
    }

    async fn status(&self, _reference: &str) -> Result<AnchorStatus, AnchorError> {
        Ok(self.status.clone())
    }

    fn endpoint(&self) -> &str {
        "https://ledger.test"
    }
}

/// Store double that fails every operation at the transport level.
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn insert(&self, _document: &Value) -> Result<(), SealError> {
        Err(SealError::Store {
            message: "store unreachable".to_string(),
        })
    }

    async fn find_by_modified_hash(&self, _hash: &str) -> Result<Option<Value>, SealError> {
        Err(SealError::Store {
            message: "store unreachable".to_string(),
        })
    }
}

/// Store double that returns one pinned document for every lookup,
/// simulating a corrupted or forged index.
pub struct PinnedStore {
    pub document: Value,
}

#[async_trait]
impl RecordStore for PinnedStore {
    async fn insert(&self, _document: &Value) -> Result<(), SealError> {
        Ok(())
    }

    async fn find_by_modified_hash(&self, _hash: &str) -> Result<Option<Value>, SealError> {
        Ok(Some(self.document.clone()))
    }
}

/// Test configuration with a known secret and anchoring policy.
pub fn test_config(anchor_required: bool) -> SealConfig {
    SealConfig {
        tweak_secret: "s".to_string(),
        device_id: "dht-lab-01".to_string(),
        anchor_required,
        ..SealConfig::default()
    }
}

/// A representative sensor section.
pub fn sensor_section() -> Map<String, Value> {
    match serde_json::json!({"humidity": 61.5, "temperature": 30.2}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}
