// crates/rategate-server/src/audit.rs
// ============================================================================
// Module: Rategate Request Audit
// Description: Structured audit events for HTTP request handling.
// Purpose: Emit one JSON line per request without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the request audit payload and sinks. It is
//! intentionally lightweight so deployments can route events to their
//! preferred logging pipeline without redesign. The transport records one
//! event per completed request and one for each degraded body read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// HTTP method.
    pub method: String,
    /// Raw request path as received (before prefix stripping).
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Normalized outcome label.
    pub outcome: &'static str,
    /// Failure detail when present.
    pub detail: Option<String>,
}

impl RequestAuditEvent {
    /// Builds a completed-request event.
    #[must_use]
    pub fn completed(method: &str, path: &str, status: u16, outcome: &'static str) -> Self {
        Self {
            event: "http_request",
            method: method.to_string(),
            path: path.to_string(),
            status,
            outcome,
            detail: None,
        }
    }

    /// Builds a degraded body-read event; the request still proceeds.
    #[must_use]
    pub fn body_read_degraded(method: &str, path: &str, detail: impl Into<String>) -> Self {
        Self {
            event: "body_read_degraded",
            method: method.to_string(),
            path: path.to_string(),
            status: 0,
            outcome: "empty_body_fallback",
            detail: Some(detail.into()),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for request events.
pub trait AuditSink: Send + Sync {
    /// Record a request audit event.
    fn record(&self, event: &RequestAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &RequestAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
