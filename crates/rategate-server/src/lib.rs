// crates/rategate-server/src/lib.rs
// ============================================================================
// Module: Rategate Server Library
// Description: HTTP dispatch, session gating, and engine-backed lookup.
// Purpose: Expose the request pipeline over the core dataset store.
// Dependencies: rategate-core, axum, tokio
// ============================================================================

//! ## Overview
//! Rategate Server turns HTTP requests into filtered dataset views. The
//! [`dispatch`] module owns the route table and response envelopes, the
//! [`session`] module gates the carrier portal, the [`engine`] module builds
//! and runs the subprocess-backed rate lookup, and the [`http`] module is the
//! axum transport shell. Security posture: query and form inputs are
//! untrusted; the engine path sanitizes tokens before clause construction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod http;
pub mod render;
pub mod session;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::StderrAuditSink;
pub use config::ConfigError;
pub use config::RategateConfig;
pub use dispatch::ParsedRequest;
pub use dispatch::RouteReply;
pub use dispatch::ServiceState;
pub use dispatch::dispatch;
pub use engine::EngineError;
pub use http::ServeError;
pub use http::serve;
