// crates/rategate-server/src/dispatch.rs
// ============================================================================
// Module: Rategate Dispatcher
// Description: Route table, response envelopes, and request dispatch.
// Purpose: Map (method, normalized path) pairs onto the query pipeline.
// Dependencies: rategate-core, axum, serde, url
// ============================================================================

//! ## Overview
//! The dispatcher owns the fixed route table. It answers cross-origin
//! preflight without touching any other component, strips the `/api` routing
//! prefix so one table serves prefixed and unprefixed deployments, delegates
//! gated routes to the session gate before touching data, and hands data
//! routes to the filter engine or the external query engine. Every JSON
//! response carries the wildcard cross-origin allow header; anything
//! unmatched is a plain-text 404.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::http::Method;
use axum::http::StatusCode;
use rategate_core::DatasetStore;
use rategate_core::QueryMap;
use rategate_core::RateFilter;
use rategate_core::RateRecord;
use rategate_core::RequestFilter;
use rategate_core::RequestRecord;
use rategate_core::ScenarioRecord;
use serde::Serialize;
use serde_json::Value;

use crate::audit::AuditSink;
use crate::config::RategateConfig;
use crate::engine;
use crate::render;
use crate::session;
use crate::session::GateDecision;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Routing prefix stripped before route matching.
const ROUTE_PREFIX: &str = "/api";

// ============================================================================
// SECTION: Service State
// ============================================================================

/// Shared per-process state handed to every request.
pub struct ServiceState {
    /// Service configuration.
    pub config: RategateConfig,
    /// Immutable datasets loaded at startup.
    pub datasets: DatasetStore,
    /// Request audit sink.
    pub audit: Arc<dyn AuditSink>,
}

// ============================================================================
// SECTION: Request Model
// ============================================================================

/// A transport-decoded request, ready for dispatch.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// HTTP method.
    pub method: Method,
    /// Raw request path, before prefix stripping.
    pub path: String,
    /// Decoded query parameters.
    pub query: QueryMap,
    /// Raw `Cookie` header, when present.
    pub cookie_header: Option<String>,
    /// Collected request body (empty after a degraded read).
    pub body: String,
}

// ============================================================================
// SECTION: Response Model
// ============================================================================

/// Dispatcher response, encoded by the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteReply {
    /// JSON payload with the wildcard cross-origin allow header.
    Json {
        /// Response status.
        status: StatusCode,
        /// Encoded payload.
        body: Value,
    },
    /// Rendered HTML page.
    Html {
        /// Response status.
        status: StatusCode,
        /// Finished markup.
        body: String,
    },
    /// Redirect, optionally carrying a session cookie mutation.
    Redirect {
        /// Redirect target.
        location: String,
        /// `Set-Cookie` value to attach, when the session changes.
        set_cookie: Option<String>,
    },
    /// Cross-origin preflight answer.
    Preflight,
    /// Unmatched route.
    NotFound,
}

impl RouteReply {
    /// Returns the response status for this reply.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Json {
                status, ..
            }
            | Self::Html {
                status, ..
            } => *status,
            Self::Redirect {
                ..
            } => StatusCode::FOUND,
            Self::Preflight => StatusCode::NO_CONTENT,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Returns the audit outcome label for this reply.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Json {
                status, ..
            } => {
                if status.is_server_error() {
                    "engine_error"
                } else {
                    "ok"
                }
            }
            Self::Html {
                status, ..
            } => {
                if *status == StatusCode::UNAUTHORIZED {
                    "unauthorized"
                } else {
                    "ok"
                }
            }
            Self::Redirect {
                ..
            } => "redirect",
            Self::Preflight => "preflight",
            Self::NotFound => "not_found",
        }
    }
}

// ============================================================================
// SECTION: Response Payloads
// ============================================================================

/// Rate lookup response payload.
#[derive(Debug, Serialize)]
struct RatesReply {
    /// Matching rate records.
    rates: Vec<RateRecord>,
    /// Data source tag.
    source: &'static str,
}

/// Request-log lookup response payload.
#[derive(Debug, Serialize)]
struct RequestsReply {
    /// Matching request records.
    requests: Vec<RequestRecord>,
    /// Data source tag.
    source: &'static str,
}

/// Scenario listing response payload.
#[derive(Debug, Serialize)]
struct ScenariosReply {
    /// All scenario records, unfiltered.
    scenarios: Vec<ScenarioRecord>,
}

/// Engine failure response payload.
#[derive(Debug, Serialize)]
struct EngineFailureReply {
    /// Stable error code.
    error: &'static str,
    /// Engine diagnostic text.
    details: String,
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Dispatches one request against the fixed route table.
#[must_use]
pub fn dispatch(state: &ServiceState, request: &ParsedRequest) -> RouteReply {
    if request.method == Method::OPTIONS {
        return RouteReply::Preflight;
    }
    let path = normalize_path(&request.path);
    match (request.method.as_str(), path.as_str()) {
        ("GET", "/cw1/json") => rates_reply(state.datasets.cw1_rates(), &request.query, "json"),
        ("GET", "/cw1/sqlite") => engine_reply(state, &request.query),
        ("GET", "/spot") => rates_reply(state.datasets.spot_rates(), &request.query, "spot"),
        ("GET", "/team-rates") => {
            requests_reply(state.datasets.team_requests(), &request.query, "team")
        }
        ("GET", "/escalation-rates") => {
            requests_reply(state.datasets.escalation_requests(), &request.query, "escalation")
        }
        ("GET", "/scenarios") => json_reply(StatusCode::OK, &ScenariosReply {
            scenarios: state.datasets.scenarios().to_vec(),
        }),
        ("GET", "/carrier/login") => RouteReply::Html {
            status: StatusCode::OK,
            body: render::login_page(&state.config.server.route_prefix, None),
        },
        ("POST", "/carrier/login") => login_reply(state, &request.body),
        ("GET", "/carrier/logout") => RouteReply::Redirect {
            location: portal_location(state, "/carrier/login"),
            set_cookie: Some(session::clear_cookie(&state.config.portal)),
        },
        ("GET", "/carrier/search") => search_reply(state, request),
        ("GET", "/carrier/results") => results_reply(state, request),
        _ => RouteReply::NotFound,
    }
}

/// Strips the routing prefix and ensures a single leading separator.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let stripped = raw.strip_prefix(ROUTE_PREFIX).unwrap_or(raw);
    if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{stripped}")
    }
}

// ============================================================================
// SECTION: Data Routes
// ============================================================================

/// Filters a rate table and wraps it in the response envelope.
fn rates_reply(records: &[RateRecord], query: &QueryMap, source: &'static str) -> RouteReply {
    let filter = RateFilter::from_query(query);
    json_reply(StatusCode::OK, &RatesReply {
        rates: filter.apply(records),
        source,
    })
}

/// Filters a request log and wraps it in the response envelope.
fn requests_reply(records: &[RequestRecord], query: &QueryMap, source: &'static str) -> RouteReply {
    let filter = RequestFilter::from_query(query);
    json_reply(StatusCode::OK, &RequestsReply {
        requests: filter.apply(records),
        source,
    })
}

/// Runs the engine-backed rate lookup, isolating failures to this request.
fn engine_reply(state: &ServiceState, query: &QueryMap) -> RouteReply {
    match engine::lookup_rates(&state.config.engine, query) {
        Ok(rates) => json_reply(StatusCode::OK, &RatesReply {
            rates,
            source: "sqlite",
        }),
        Err(err) => json_reply(StatusCode::INTERNAL_SERVER_ERROR, &EngineFailureReply {
            error: "sqlite_query_failed",
            details: err.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Portal Routes
// ============================================================================

/// Handles a login form submission.
fn login_reply(state: &ServiceState, body: &str) -> RouteReply {
    let form = parse_form(body);
    let username = form.get("username").map(String::as_str).unwrap_or_default();
    let password = form.get("password").map(String::as_str).unwrap_or_default();
    match session::login(&state.config.portal, username, password) {
        Ok(()) => RouteReply::Redirect {
            location: format!(
                "{}?session={}",
                portal_location(state, "/carrier/search"),
                session::SESSION_TOKEN
            ),
            set_cookie: Some(session::issue_cookie(&state.config.portal)),
        },
        Err(failure) => RouteReply::Html {
            status: StatusCode::UNAUTHORIZED,
            body: render::login_page(&state.config.server.route_prefix, Some(&failure.to_string())),
        },
    }
}

/// Serves the gated search form.
fn search_reply(state: &ServiceState, request: &ParsedRequest) -> RouteReply {
    match session::gate(request.cookie_header.as_deref(), &request.query, &state.config.portal) {
        GateDecision::Allow {
            token,
        } => RouteReply::Html {
            status: StatusCode::OK,
            body: render::search_page(&state.config.server.route_prefix, &token),
        },
        GateDecision::RedirectToLogin => RouteReply::Redirect {
            location: portal_location(state, "/carrier/login"),
            set_cookie: None,
        },
    }
}

/// Serves the gated results page over the spot rate table.
fn results_reply(state: &ServiceState, request: &ParsedRequest) -> RouteReply {
    match session::gate(request.cookie_header.as_deref(), &request.query, &state.config.portal) {
        GateDecision::Allow {
            ..
        } => {
            let filter = RateFilter::from_query(&request.query);
            let results = filter.apply(state.datasets.spot_rates());
            RouteReply::Html {
                status: StatusCode::OK,
                body: render::results_page(
                    &state.config.server.route_prefix,
                    request.query.get("origin").map(String::as_str),
                    request.query.get("destination").map(String::as_str),
                    &results,
                ),
            }
        }
        GateDecision::RedirectToLogin => RouteReply::Redirect {
            location: portal_location(state, "/carrier/login"),
            set_cookie: None,
        },
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a portal location under the configured public prefix.
fn portal_location(state: &ServiceState, path: &str) -> String {
    format!("{}{path}", state.config.server.route_prefix)
}

/// Parses a form-encoded body into key/value pairs (last value wins).
fn parse_form(body: &str) -> QueryMap {
    url::form_urlencoded::parse(body.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Encodes a payload as a JSON reply, never panicking on serialization.
fn json_reply<T: Serialize>(status: StatusCode, payload: &T) -> RouteReply {
    match serde_json::to_value(payload) {
        Ok(body) => RouteReply::Json {
            status,
            body,
        },
        Err(_) => RouteReply::Json {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Value::String("serialization failed".to_string()),
        },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
