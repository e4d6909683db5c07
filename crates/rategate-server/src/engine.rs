// crates/rategate-server/src/engine.rs
// ============================================================================
// Module: Rategate Query Engine
// Description: Dynamic query construction and out-of-process execution.
// Purpose: Serve the engine-backed rate lookup with the in-memory contract.
// Dependencies: rategate-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The engine path builds a `SELECT` statement from sanitized filter tokens
//! and executes it by invoking the configured `sqlite3` binary with JSON
//! output. Clause construction is string concatenation, not parameter
//! binding — an inherited contract of this subsystem, preserved as a
//! documented risk. [`rategate_core::sanitize_token`] is the only defense
//! between user input and the statement text. Engine failures are isolated
//! to the single request; there is no retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::Command;

use rategate_core::QueryMap;
use rategate_core::RateRecord;
use rategate_core::sanitize_token;
use thiserror::Error;

use crate::config::EngineConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Table queried by the engine-backed rate lookup.
pub const RATE_TABLE: &str = "cw1_rates";

/// Columns eligible for equality clauses, in clause order.
///
/// Column names double as the query parameter names.
const RATE_QUERY_COLUMNS: [&str; 5] =
    ["origin", "destination", "mode", "equipmentType", "serviceLevel"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine invocation errors. Each maps to a structured 500 response.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be launched.
    #[error("engine launch failed: {reason}")]
    Launch {
        /// Spawn failure text.
        reason: String,
    },
    /// The engine exited with a failure status.
    #[error("{details}")]
    Failed {
        /// Engine diagnostic text (stderr, or the exit status when silent).
        details: String,
    },
    /// The engine produced output this service cannot parse.
    #[error("engine output malformed: {reason}")]
    Output {
        /// Parser failure text.
        reason: String,
    },
}

// ============================================================================
// SECTION: Query Construction
// ============================================================================

/// Builds the rate lookup statement from raw query parameters.
///
/// Each parameter is sanitized; surviving non-empty tokens become equality
/// clauses joined with `AND`. With no surviving token the statement has no
/// `WHERE` clause at all.
#[must_use]
pub fn build_rate_query(query: &QueryMap) -> String {
    let clauses: Vec<String> = RATE_QUERY_COLUMNS
        .iter()
        .filter_map(|column| {
            let token = sanitize_token(query.get(*column).map(String::as_str));
            if token.is_empty() {
                None
            } else {
                Some(format!("{column} = '{token}'"))
            }
        })
        .collect();
    if clauses.is_empty() {
        format!("SELECT * FROM {RATE_TABLE};")
    } else {
        format!("SELECT * FROM {RATE_TABLE} WHERE {};", clauses.join(" AND "))
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs a statement through the external engine and parses the result rows.
///
/// Empty engine output means an empty result set. Rows must decode to
/// [`RateRecord`] so the engine path honors the same response contract as
/// the in-memory path.
///
/// # Errors
///
/// Returns [`EngineError`] when the engine cannot be launched, exits with a
/// failure status, or produces unparseable output.
pub fn run_rate_query(engine: &EngineConfig, sql: &str) -> Result<Vec<RateRecord>, EngineError> {
    let output = Command::new(&engine.binary)
        .arg("-json")
        .arg(&engine.database)
        .arg(sql)
        .output()
        .map_err(|err| EngineError::Launch {
            reason: err.to_string(),
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let details = if stderr.is_empty() {
            format!("engine exited with {}", output.status)
        } else {
            stderr
        };
        return Err(EngineError::Failed {
            details,
        });
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|err| EngineError::Output {
        reason: err.to_string(),
    })
}

/// Builds and runs the rate lookup for one request's query parameters.
///
/// # Errors
///
/// Returns [`EngineError`] as described for [`run_rate_query`].
pub fn lookup_rates(engine: &EngineConfig, query: &QueryMap) -> Result<Vec<RateRecord>, EngineError> {
    run_rate_query(engine, &build_rate_query(query))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use rategate_core::QueryMap;

    use super::EngineError;
    use super::build_rate_query;
    use super::run_rate_query;
    use crate::config::EngineConfig;

    fn query(pairs: &[(&str, &str)]) -> QueryMap {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn engine(binary: &str) -> EngineConfig {
        EngineConfig {
            binary: binary.to_string(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn no_surviving_token_means_no_where_clause() {
        assert_eq!(build_rate_query(&QueryMap::new()), "SELECT * FROM cw1_rates;");
        assert_eq!(
            build_rate_query(&query(&[("origin", "';;'"), ("page", "2")])),
            "SELECT * FROM cw1_rates;"
        );
    }

    #[test]
    fn surviving_tokens_become_and_joined_clauses() {
        let sql = build_rate_query(&query(&[("origin", "lax"), ("mode", "ocean")]));
        assert_eq!(sql, "SELECT * FROM cw1_rates WHERE origin = 'LAX' AND mode = 'OCEAN';");
    }

    #[test]
    fn clause_order_follows_the_column_table() {
        let sql = build_rate_query(&query(&[
            ("serviceLevel", "standard"),
            ("origin", "lax"),
            ("equipmentType", "40hc"),
        ]));
        assert_eq!(
            sql,
            "SELECT * FROM cw1_rates WHERE origin = 'LAX' AND equipmentType = '40HC' AND \
             serviceLevel = 'STANDARD';"
        );
    }

    #[test]
    fn injection_payload_never_appears_verbatim() {
        let payload = "LAX'; DROP TABLE x;--";
        let sql = build_rate_query(&query(&[("origin", payload)]));
        assert!(!sql.contains(payload));
        assert_eq!(sql, "SELECT * FROM cw1_rates WHERE origin = 'LAX DROP TABLE X--';");
    }

    #[test]
    fn failing_engine_yields_query_failed_with_status_detail() {
        let err = run_rate_query(&engine("false"), "SELECT 1;").expect_err("must fail");
        match err {
            EngineError::Failed { details } => assert!(details.contains("exited with")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_engine_binary_is_a_launch_failure() {
        let err = run_rate_query(&engine("rategate-no-such-binary"), "SELECT 1;")
            .expect_err("must fail");
        assert!(matches!(err, EngineError::Launch { .. }));
    }

    #[test]
    fn unparseable_output_is_an_output_failure() {
        // `echo` succeeds and prints its arguments, which is not JSON rows.
        let err = run_rate_query(&engine("echo"), "SELECT 1;").expect_err("must fail");
        assert!(matches!(err, EngineError::Output { .. }));
    }

    #[test]
    fn silent_success_is_an_empty_result_set() {
        let rates = run_rate_query(&engine("true"), "SELECT 1;").expect("empty ok");
        assert!(rates.is_empty());
    }
}
