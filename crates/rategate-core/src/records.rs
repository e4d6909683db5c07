// crates/rategate-core/src/records.rs
// ============================================================================
// Module: Rategate Records
// Description: Typed records served by the rate and request endpoints.
// Purpose: Define the immutable wire-compatible record model.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Records are deserialized once from the static data files and never mutated
//! afterwards. Wire names are camelCase to match the stored documents and the
//! JSON responses. Records carry no identity; uniqueness is not enforced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Rate Records
// ============================================================================

/// A single lane rate quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    /// Origin location code.
    pub origin: String,
    /// Destination location code.
    pub destination: String,
    /// Transport mode (for example `OCEAN` or `AIR`).
    pub mode: String,
    /// Equipment type code (for example `40HC`).
    pub equipment_type: String,
    /// Service level label.
    pub service_level: String,
    /// Total quoted rate in USD.
    pub total_rate: f64,
    /// Door-to-door transit time in days.
    pub transit_days: u32,
    /// Carrier name.
    pub carrier: String,
}

// ============================================================================
// SECTION: Request Records
// ============================================================================

/// A logged rate request (team or escalation log).
///
/// Only the three filterable fields are typed; every other field in the
/// stored document is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// Request identifier.
    pub request_id: String,
    /// Origin location code.
    pub origin: String,
    /// Destination location code.
    pub destination: String,
    /// Remaining opaque fields, preserved as stored.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Scenario Records
// ============================================================================

/// An opaque scenario document, served without filtering.
pub type ScenarioRecord = Value;
