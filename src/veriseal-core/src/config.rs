//! Configuration for the record pipeline.

use std::time::Duration;

use veriseal_ledger::{DEFAULT_RPC_URL, MEMO_PROGRAM_ID};

/// Read-only configuration injected into each component at construction.
///
/// There is no process-wide mutable state anywhere in the pipeline; a
/// `SealConfig` is built once by the host (CLI flags, environment) and
/// cloned into the components that need it.
#[derive(Debug, Clone)]
pub struct SealConfig {
    /// Document store Data API base URL (up to and including `/data/v1`).
    pub store_endpoint: String,
    /// Document store API key.
    pub store_api_key: String,
    /// Named cluster / data source inside the store.
    pub store_data_source: String,
    /// Database name.
    pub store_database: String,
    /// Collection name.
    pub store_collection: String,
    /// Identity of the reporting device, recorded in every payload.
    pub device_id: String,
    /// Ledger JSON-RPC endpoint.
    pub ledger_rpc_url: String,
    /// Memo program identity anchors are published under.
    pub memo_program_id: String,
    /// Base58 anchoring identity material; `None` leaves anchoring
    /// unconfigured.
    pub anchor_identity: Option<String>,
    /// Whether a failed anchor aborts the record build.
    pub anchor_required: bool,
    /// Secret for deriving the modified hash from the actual hash.
    pub tweak_secret: String,
    /// Latitude for the auxiliary weather context.
    pub weather_latitude: f64,
    /// Longitude for the auxiliary weather context.
    pub weather_longitude: f64,
    /// How long a fetched weather observation stays fresh.
    pub weather_refresh: Duration,
    /// Per-call timeout for store and ledger requests.
    pub timeout: Duration,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            store_endpoint: "https://data.mongodb-api.com/app/data-veriseal/endpoint/data/v1"
                .into(),
            store_api_key: String::new(),
            store_data_source: "Cluster0".into(),
            store_database: "iot".into(),
            store_collection: "telemetry".into(),
            device_id: "pico-w-01".into(),
            ledger_rpc_url: DEFAULT_RPC_URL.into(),
            memo_program_id: MEMO_PROGRAM_ID.into(),
            anchor_identity: None,
            anchor_required: true,
            tweak_secret: "change-this-secret".into(),
            weather_latitude: 28.6139,
            weather_longitude: 77.2090,
            weather_refresh: Duration::from_secs(300),
            timeout: Duration::from_secs(10),
        }
    }
}
