// crates/rategate-server/src/session.rs
// ============================================================================
// Module: Rategate Session Gate
// Description: Demo session derivation, login/logout transitions, gating.
// Purpose: Decide allow/redirect for portal routes from per-request evidence.
// Dependencies: rategate-core, subtle, thiserror
// ============================================================================

//! ## Overview
//! The session gate holds no server-side state. Every request re-derives
//! `Anonymous` or `Authenticated` from the evidence the client presents: the
//! session cookie first, then (legacy) a `session` query parameter. The token
//! value is never validated against a store; presence of a non-empty token is
//! sufficient. This is a demo-only trust model, and the query-string path is
//! retained solely for existing callers — it bypasses the cookie attributes
//! and leaks the token into request logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use rategate_core::QueryMap;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::PortalConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Shared session token issued to every authenticated client.
pub const SESSION_TOKEN: &str = "demo";
/// Query parameter accepted as fallback session evidence.
pub const SESSION_QUERY_PARAM: &str = "session";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication failure surfaced on the login page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthFailure {
    /// The submitted credential pair does not match the demo pair.
    #[error("Invalid credentials.")]
    InvalidCredentials,
}

// ============================================================================
// SECTION: Gate Decision
// ============================================================================

/// Outcome of gating a portal route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session evidence is present; serve the route with the resolved token.
    Allow {
        /// The token the client presented.
        token: String,
    },
    /// No session evidence; redirect to the login entry point.
    RedirectToLogin,
}

/// Gates a portal route on the request's session evidence.
#[must_use]
pub fn gate(cookie_header: Option<&str>, query: &QueryMap, portal: &PortalConfig) -> GateDecision {
    match session_evidence(cookie_header, query, &portal.cookie_name) {
        Some(token) => GateDecision::Allow {
            token,
        },
        None => GateDecision::RedirectToLogin,
    }
}

/// Extracts session evidence from an ordered list of sources.
///
/// The cookie is consulted first, then the legacy `session` query parameter.
/// Empty tokens count as absent.
#[must_use]
pub fn session_evidence(
    cookie_header: Option<&str>,
    query: &QueryMap,
    cookie_name: &str,
) -> Option<String> {
    let cookies = cookie_header.map(parse_cookies).unwrap_or_default();
    if let Some(token) = cookies.get(cookie_name)
        && !token.is_empty()
    {
        return Some(token.clone());
    }
    query.get(SESSION_QUERY_PARAM).filter(|token| !token.is_empty()).cloned()
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

/// Checks a submitted credential pair against the configured demo pair.
///
/// Both fields are compared in constant time; the gate stays `Anonymous` on
/// any mismatch.
///
/// # Errors
///
/// Returns [`AuthFailure::InvalidCredentials`] on mismatch.
pub fn login(portal: &PortalConfig, username: &str, password: &str) -> Result<(), AuthFailure> {
    let user_ok = username.as_bytes().ct_eq(portal.username.as_bytes());
    let pass_ok = password.as_bytes().ct_eq(portal.password.as_bytes());
    if bool::from(user_ok & pass_ok) {
        Ok(())
    } else {
        Err(AuthFailure::InvalidCredentials)
    }
}

/// Builds the `Set-Cookie` value issued on successful login.
#[must_use]
pub fn issue_cookie(portal: &PortalConfig) -> String {
    format!("{}={SESSION_TOKEN}; Path=/; HttpOnly; SameSite=Lax", portal.cookie_name)
}

/// Builds the `Set-Cookie` value that clears the session unconditionally.
#[must_use]
pub fn clear_cookie(portal: &PortalConfig) -> String {
    format!("{}=; Path=/; Max-Age=0", portal.cookie_name)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a `Cookie` header into name/value pairs.
fn parse_cookies(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
