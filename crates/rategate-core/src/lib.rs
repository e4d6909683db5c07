// crates/rategate-core/src/lib.rs
// ============================================================================
// Module: Rategate Core Library
// Description: Data model, dataset store, and filtering engine for Rategate.
// Purpose: Expose the record types and query pipeline shared by all crates.
// Dependencies: crate::{dataset, filter, normalize, records}
// ============================================================================

//! ## Overview
//! Rategate Core holds everything the HTTP surface filters and serves: the
//! typed rate/request records, the immutable [`dataset::DatasetStore`] loaded
//! once at startup, the query-token normalizer, and the attribute filter
//! engine. Nothing in this crate performs I/O after startup load and nothing
//! here is async.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod dataset;
pub mod filter;
pub mod normalize;
pub mod records;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )]
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dataset::DatasetError;
pub use dataset::DatasetStore;
pub use filter::QueryMap;
pub use filter::RateFilter;
pub use filter::RequestFilter;
pub use normalize::normalize;
pub use normalize::sanitize_token;
pub use records::RateRecord;
pub use records::RequestRecord;
pub use records::ScenarioRecord;
