// crates/rategate-core/src/dataset.rs
// ============================================================================
// Module: Rategate Dataset Store
// Description: Startup loading of the static rate/request datasets.
// Purpose: Provide immutable, read-only dataset handles with fail-fast load.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The dataset store owns the five named collections for the lifetime of the
//! process. [`DatasetStore::load`] runs once at startup and fails fast on any
//! missing or malformed source; there is no partial-startup mode and no
//! mutation API. After load the store is shared read-only, so request
//! handlers never need locking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::records::RateRecord;
use crate::records::RequestRecord;
use crate::records::ScenarioRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Source file for the primary (CW1) rate table.
pub const CW1_RATES_FILE: &str = "cw1-rates.json";
/// Source file for the spot rate table.
pub const SPOT_RATES_FILE: &str = "spot-rates.json";
/// Source file for the team request log.
pub const TEAM_RATES_FILE: &str = "team-rates.json";
/// Source file for the escalation request log.
pub const ESCALATION_RATES_FILE: &str = "escalation-rates.json";
/// Source file for the scenario table.
pub const SCENARIOS_FILE: &str = "scenarios.json";

/// Maximum accepted size of a single dataset file in bytes.
const MAX_DATASET_FILE_SIZE: u64 = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dataset load errors. All variants abort startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The source file could not be read.
    #[error("dataset {name} unreadable: {reason}")]
    Unreadable {
        /// Source filename.
        name: &'static str,
        /// Underlying I/O failure text.
        reason: String,
    },
    /// The source file exceeds the size limit.
    #[error("dataset {name} exceeds {MAX_DATASET_FILE_SIZE} bytes")]
    TooLarge {
        /// Source filename.
        name: &'static str,
    },
    /// The source file is not the expected JSON document.
    #[error("dataset {name} malformed: {reason}")]
    Malformed {
        /// Source filename.
        name: &'static str,
        /// Parser failure text.
        reason: String,
    },
}

// ============================================================================
// SECTION: Source Envelopes
// ============================================================================

/// Envelope of the rate table documents.
#[derive(Debug, Deserialize)]
struct RatesDoc {
    /// Ordered rate records.
    rates: Vec<RateRecord>,
}

/// Envelope of the request log documents.
#[derive(Debug, Deserialize)]
struct RequestsDoc {
    /// Ordered request records.
    requests: Vec<RequestRecord>,
}

/// Envelope of the scenario document.
#[derive(Debug, Deserialize)]
struct ScenariosDoc {
    /// Ordered scenario records.
    scenarios: Vec<ScenarioRecord>,
}

// ============================================================================
// SECTION: Dataset Store
// ============================================================================

/// Immutable in-memory datasets, loaded once at process start.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    /// Primary (CW1) rate table.
    cw1_rates: Vec<RateRecord>,
    /// Spot rate table.
    spot_rates: Vec<RateRecord>,
    /// Team request log.
    team_requests: Vec<RequestRecord>,
    /// Escalation request log.
    escalation_requests: Vec<RequestRecord>,
    /// Scenario table.
    scenarios: Vec<ScenarioRecord>,
}

impl DatasetStore {
    /// Loads all five datasets from `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when any source is missing, oversized, or
    /// malformed. Callers must treat this as fatal to startup.
    pub fn load(data_dir: &Path) -> Result<Self, DatasetError> {
        let rates: RatesDoc = read_doc(data_dir, CW1_RATES_FILE)?;
        let spot: RatesDoc = read_doc(data_dir, SPOT_RATES_FILE)?;
        let team: RequestsDoc = read_doc(data_dir, TEAM_RATES_FILE)?;
        let escalation: RequestsDoc = read_doc(data_dir, ESCALATION_RATES_FILE)?;
        let scenarios: ScenariosDoc = read_doc(data_dir, SCENARIOS_FILE)?;
        Ok(Self {
            cw1_rates: rates.rates,
            spot_rates: spot.rates,
            team_requests: team.requests,
            escalation_requests: escalation.requests,
            scenarios: scenarios.scenarios,
        })
    }

    /// Builds a store from already-loaded collections.
    #[must_use]
    pub const fn from_parts(
        cw1_rates: Vec<RateRecord>,
        spot_rates: Vec<RateRecord>,
        team_requests: Vec<RequestRecord>,
        escalation_requests: Vec<RequestRecord>,
        scenarios: Vec<ScenarioRecord>,
    ) -> Self {
        Self {
            cw1_rates,
            spot_rates,
            team_requests,
            escalation_requests,
            scenarios,
        }
    }

    /// Returns the primary (CW1) rate table.
    #[must_use]
    pub fn cw1_rates(&self) -> &[RateRecord] {
        &self.cw1_rates
    }

    /// Returns the spot rate table.
    #[must_use]
    pub fn spot_rates(&self) -> &[RateRecord] {
        &self.spot_rates
    }

    /// Returns the team request log.
    #[must_use]
    pub fn team_requests(&self) -> &[RequestRecord] {
        &self.team_requests
    }

    /// Returns the escalation request log.
    #[must_use]
    pub fn escalation_requests(&self) -> &[RequestRecord] {
        &self.escalation_requests
    }

    /// Returns the scenario table.
    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioRecord] {
        &self.scenarios
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and parses one dataset document.
fn read_doc<T: DeserializeOwned>(data_dir: &Path, name: &'static str) -> Result<T, DatasetError> {
    let path = data_dir.join(name);
    let metadata = fs::metadata(&path).map_err(|err| DatasetError::Unreadable {
        name,
        reason: err.to_string(),
    })?;
    if metadata.len() > MAX_DATASET_FILE_SIZE {
        return Err(DatasetError::TooLarge {
            name,
        });
    }
    let text = fs::read_to_string(&path).map_err(|err| DatasetError::Unreadable {
        name,
        reason: err.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|err| DatasetError::Malformed {
        name,
        reason: err.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
