//! Record assembly: payload, hashes, anchor, proof.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};
use veriseal_hash::{actual_hash, modified_hash};
use veriseal_ledger::LedgerAnchor;

use crate::config::SealConfig;
use crate::error::SealError;
use crate::record::{AnchorProof, Proof, Record, BOARD, HASH_ALGORITHM, MODIFIED_HASH_ALGORITHM, TRANSPORT};

/// Builds proof-annotated records from sensor and auxiliary data.
///
/// One `build` call performs, in order: payload assembly, actual-hash
/// computation, modified-hash derivation, a single anchoring attempt
/// under the required/optional policy, and proof attachment. Persisting
/// the result (indexed by its modified hash) is the caller's job.
pub struct RecordBuilder {
    config: SealConfig,
    ledger: Arc<dyn LedgerAnchor>,
}

impl RecordBuilder {
    /// Create a builder over the given ledger anchor.
    #[must_use]
    pub fn new(config: SealConfig, ledger: Arc<dyn LedgerAnchor>) -> Self {
        Self { config, ledger }
    }

    /// Build an immutable, proof-annotated record.
    ///
    /// `sensor` is the parsed measurement section; `weather` is an
    /// already-resolved auxiliary context or `None`. A missing auxiliary
    /// section is recorded as an explicit JSON `null` — omitting the key
    /// would change the canonical form on re-verification.
    ///
    /// # Errors
    ///
    /// Returns [`SealError::Encoding`] if the payload cannot be
    /// canonicalized, and [`SealError::Anchor`] if anchoring fails while
    /// `anchor_required` is set. With anchoring optional, the failure is
    /// captured into the proof's `anchorError` field instead and the
    /// build proceeds.
    #[instrument(skip(self, sensor, weather), fields(source = %source))]
    pub async fn build(
        &self,
        sensor: Map<String, Value>,
        source: &str,
        weather: Option<Value>,
    ) -> Result<Record, SealError> {
        let payload = self.assemble_payload(sensor, source, weather);

        let actual = actual_hash(&payload)?;
        let modified = modified_hash(&actual, &self.config.tweak_secret);
        debug!(actual_hash = %actual, "payload hashed");

        let (anchor_reference, anchor_error) = match self.ledger.submit(actual.as_bytes()).await {
            Ok(reference) => (Some(reference), None),
            Err(e) if self.config.anchor_required => {
                warn!(error = %e, "required anchor failed, aborting build");
                return Err(SealError::Anchor(e));
            },
            Err(e) => {
                warn!(error = %e, "optional anchor failed, recording as unanchored");
                (None, Some(e.to_string()))
            },
        };

        let proof = Proof {
            actual_hash: actual,
            modified_hash: modified,
            hash_algorithm: HASH_ALGORITHM.to_string(),
            modified_hash_algorithm: MODIFIED_HASH_ALGORITHM.to_string(),
            anchor: AnchorProof {
                ledger_endpoint: self.ledger.endpoint().to_string(),
                anchor_reference,
                anchor_error,
            },
        };

        info!(
            device = %self.config.device_id,
            anchored = proof.anchor.anchor_reference.is_some(),
            "record built"
        );
        Ok(Record::new(payload, proof))
    }

    /// Assemble the payload sections in their fixed shape.
    fn assemble_payload(
        &self,
        sensor: Map<String, Value>,
        source: &str,
        weather: Option<Value>,
    ) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("deviceId".into(), Value::String(self.config.device_id.clone()));
        payload.insert("sensor".into(), Value::Object(sensor));
        payload.insert("weather".into(), weather.unwrap_or(Value::Null));
        payload.insert("ts".into(), Value::from(unix_now()));
        payload.insert("board".into(), Value::String(BOARD.into()));
        payload.insert("transport".into(), Value::String(TRANSPORT.into()));
        payload.insert("source".into(), Value::String(source.to_string()));
        payload
    }
}

/// Seconds since the Unix epoch.
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
