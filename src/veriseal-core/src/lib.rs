//! # veriseal-core
//!
//! Tamper-evident record pipeline for periodic sensor readings.
//!
//! ## Architecture
//!
//! ```text
//!  sensor line ──▶ RecordBuilder ──▶ [canonicalize ▶ actual hash
//!       │                            ▶ modified hash]
//!  weather ───────┘                          │
//!                                            ▼
//!                                      LedgerAnchor ──▶ proof block
//!                                            │
//!                                            ▼
//!                                      RecordStore (indexed by
//!                                      modified hash)
//!
//!  claimed hash ──▶ Verifier ──▶ derive lookup hash ▶ fetch document
//!                               ▶ re-derive actual hash ▶ cross-check
//!                               ▶ ledger confirmation (on demand)
//! ```
//!
//! A built record carries a proof block binding its payload to a ledger
//! anchor; the verifier later re-derives both hashes from first
//! principles and reports a closed verdict — pass, or one of four
//! distinct failure kinds (not found, linkage, integrity, chain) — so
//! "never stored", "forged proof" and "tampered payload" stay
//! distinguishable end to end.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod config;
pub mod error;
pub mod record;
pub mod sensor;
pub mod store;
pub mod trend;
pub mod verifier;
pub mod weather;

pub use builder::RecordBuilder;
pub use config::SealConfig;
pub use error::SealError;
pub use record::{AnchorProof, Proof, Record, HASH_ALGORITHM, MODIFIED_HASH_ALGORITHM};
pub use sensor::{parse_sensor_line, ProbeCommand, SensorReading};
pub use store::{AtlasStore, MemoryStore, RecordStore};
pub use trend::{analyze_metric_history, KalmanConfig, SeriesAnalysis, TrendDirection, TrendResult};
pub use verifier::{FailureKind, LinkageCause, Verification, Verifier};
pub use weather::WeatherService;
