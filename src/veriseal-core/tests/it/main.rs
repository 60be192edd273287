//! Consolidated integration tests for veriseal-core.
//!
//! A single integration binary keeps link time down and lets the flow
//! tests share one set of ledger/store stand-ins.

mod anchor_policy;
mod round_trip;
mod support;
