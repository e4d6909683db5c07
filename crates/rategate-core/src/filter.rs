// crates/rategate-core/src/filter.rs
// ============================================================================
// Module: Rategate Filter Engine
// Description: Optional equality predicates over in-memory datasets.
// Purpose: Apply normalized filter criteria while preserving record order.
// Dependencies: crate::normalize, crate::records
// ============================================================================

//! ## Overview
//! Filter criteria map a fixed set of field names to optional normalized
//! tokens. A `None` token imposes no constraint; all present constraints are
//! AND-combined as exact equalities. Filtering is stable: matches keep the
//! original relative order, and all-`None` criteria are the identity filter.
//! Unknown query parameters are ignored when criteria are built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::normalize::normalize;
use crate::records::RateRecord;
use crate::records::RequestRecord;

// ============================================================================
// SECTION: Query Map
// ============================================================================

/// Decoded query parameters, keyed by parameter name.
///
/// Repeated parameters keep the last value, matching the transport decoder.
pub type QueryMap = BTreeMap<String, String>;

/// Returns the normalized token for a query parameter, if constrained.
fn token(query: &QueryMap, name: &str) -> Option<String> {
    normalize(query.get(name).map(String::as_str))
}

// ============================================================================
// SECTION: Rate Filter
// ============================================================================

/// Filter criteria recognized by the rate datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateFilter {
    /// Origin constraint.
    pub origin: Option<String>,
    /// Destination constraint.
    pub destination: Option<String>,
    /// Transport mode constraint.
    pub mode: Option<String>,
    /// Equipment type constraint.
    pub equipment_type: Option<String>,
    /// Service level constraint.
    pub service_level: Option<String>,
}

impl RateFilter {
    /// Builds rate criteria from decoded query parameters.
    #[must_use]
    pub fn from_query(query: &QueryMap) -> Self {
        Self {
            origin: token(query, "origin"),
            destination: token(query, "destination"),
            mode: token(query, "mode"),
            equipment_type: token(query, "equipmentType"),
            service_level: token(query, "serviceLevel"),
        }
    }

    /// Returns true when the record satisfies every present constraint.
    #[must_use]
    pub fn matches(&self, record: &RateRecord) -> bool {
        field_matches(self.origin.as_deref(), &record.origin)
            && field_matches(self.destination.as_deref(), &record.destination)
            && field_matches(self.mode.as_deref(), &record.mode)
            && field_matches(self.equipment_type.as_deref(), &record.equipment_type)
            && field_matches(self.service_level.as_deref(), &record.service_level)
    }

    /// Returns the matching subset in original order.
    #[must_use]
    pub fn apply(&self, records: &[RateRecord]) -> Vec<RateRecord> {
        records.iter().filter(|record| self.matches(record)).cloned().collect()
    }
}

// ============================================================================
// SECTION: Request Filter
// ============================================================================

/// Filter criteria recognized by the request-log datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Request identifier constraint.
    pub request_id: Option<String>,
    /// Origin constraint.
    pub origin: Option<String>,
    /// Destination constraint.
    pub destination: Option<String>,
}

impl RequestFilter {
    /// Builds request criteria from decoded query parameters.
    #[must_use]
    pub fn from_query(query: &QueryMap) -> Self {
        Self {
            request_id: token(query, "requestId"),
            origin: token(query, "origin"),
            destination: token(query, "destination"),
        }
    }

    /// Returns true when the record satisfies every present constraint.
    #[must_use]
    pub fn matches(&self, record: &RequestRecord) -> bool {
        field_matches(self.request_id.as_deref(), &record.request_id)
            && field_matches(self.origin.as_deref(), &record.origin)
            && field_matches(self.destination.as_deref(), &record.destination)
    }

    /// Returns the matching subset in original order.
    #[must_use]
    pub fn apply(&self, records: &[RequestRecord]) -> Vec<RequestRecord> {
        records.iter().filter(|record| self.matches(record)).cloned().collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Exact-equality check for one optional constraint.
fn field_matches(constraint: Option<&str>, value: &str) -> bool {
    constraint.is_none_or(|token| token == value)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
