// crates/rategate-server/src/http.rs
// ============================================================================
// Module: Rategate HTTP Transport
// Description: axum shell around the dispatcher.
// Purpose: Decode requests, bound body reads, and encode dispatcher replies.
// Dependencies: axum, tokio, url
// ============================================================================

//! ## Overview
//! The transport is deliberately thin: it decodes the query string and the
//! (timeout-bounded) POST body, hands a [`ParsedRequest`] to the dispatcher,
//! records one audit event per request, and encodes the [`RouteReply`]. A
//! body read that times out or errors degrades to an empty body rather than
//! failing the request. The engine-backed route performs a blocking
//! subprocess call, so dispatch shifts to a blocking context when the
//! runtime allows it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use rategate_core::QueryMap;
use thiserror::Error;

use crate::audit::RequestAuditEvent;
use crate::dispatch::ParsedRequest;
use crate::dispatch::RouteReply;
use crate::dispatch::ServiceState;
use crate::dispatch::dispatch;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// HTTP serve errors.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Configuration errors surfaced at bind time.
    #[error("config error: {0}")]
    Config(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Serves the dispatcher over HTTP until the process exits.
///
/// # Errors
///
/// Returns [`ServeError`] when the bind address is invalid, the listener
/// cannot bind, or the server fails.
pub async fn serve(state: ServiceState) -> Result<(), ServeError> {
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()
        .map_err(|_| ServeError::Config("invalid bind address".to_string()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| ServeError::Transport("http bind failed".to_string()))?;
    if let Ok(local) = listener.local_addr() {
        let _ = writeln!(std::io::stderr(), "rategate listening on http://{local}");
    }
    let app = router(Arc::new(state));
    axum::serve(listener, app)
        .await
        .map_err(|_| ServeError::Transport("http server failed".to_string()))
}

/// Builds the axum application around the shared state.
///
/// Every path funnels through the dispatcher's own route table, so the
/// router carries a single fallback handler.
#[must_use]
pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new().fallback(handle_http).with_state(state)
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Handles one HTTP request end to end.
async fn handle_http(State(state): State<Arc<ServiceState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let raw_path = parts.uri.path().to_string();
    let query = parts.uri.query().map(decode_query).unwrap_or_default();
    let cookie_header = parts
        .headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body_text = if method == Method::POST {
        read_body_bounded(&state, &method, &raw_path, body).await
    } else {
        String::new()
    };
    let parsed = ParsedRequest {
        method: method.clone(),
        path: raw_path.clone(),
        query,
        cookie_header,
        body: body_text,
    };
    let reply = dispatch_blocking(&state, &parsed);
    state.audit.record(&RequestAuditEvent::completed(
        method.as_str(),
        &raw_path,
        reply.status().as_u16(),
        reply.outcome(),
    ));
    encode_reply(reply)
}

/// Collects the request body, degrading to empty on timeout or error.
async fn read_body_bounded(
    state: &ServiceState,
    method: &Method,
    path: &str,
    body: Body,
) -> String {
    let limit = state.config.server.max_body_bytes;
    let timeout = Duration::from_millis(state.config.server.body_timeout_ms);
    match tokio::time::timeout(timeout, axum::body::to_bytes(body, limit)).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(err)) => {
            state.audit.record(&RequestAuditEvent::body_read_degraded(
                method.as_str(),
                path,
                err.to_string(),
            ));
            String::new()
        }
        Err(_) => {
            state.audit.record(&RequestAuditEvent::body_read_degraded(
                method.as_str(),
                path,
                "body read timed out",
            ));
            String::new()
        }
    }
}

/// Dispatches a request, shifting to a blocking context when available.
fn dispatch_blocking(state: &ServiceState, request: &ParsedRequest) -> RouteReply {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| dispatch(state, request))
        }
        _ => dispatch(state, request),
    }
}

// ============================================================================
// SECTION: Response Encoding
// ============================================================================

/// Cross-origin metadata attached to preflight and JSON responses.
fn cors_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ]
}

/// Encodes a dispatcher reply as an HTTP response.
fn encode_reply(reply: RouteReply) -> Response {
    match reply {
        RouteReply::Json {
            status,
            body,
        } => (status, cors_headers(), axum::Json(body)).into_response(),
        RouteReply::Html {
            status,
            body,
        } => (status, Html(body)).into_response(),
        RouteReply::Redirect {
            location,
            set_cookie,
        } => {
            let mut builder =
                Response::builder().status(StatusCode::FOUND).header(header::LOCATION, location);
            if let Some(cookie) = set_cookie {
                builder = builder.header(header::SET_COOKIE, cookie);
            }
            builder
                .body(Body::empty())
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        RouteReply::Preflight => (StatusCode::NO_CONTENT, cors_headers()).into_response(),
        RouteReply::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Decodes a raw query string into parameters (last value wins).
fn decode_query(raw: &str) -> QueryMap {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use axum::http::StatusCode;
    use axum::http::header;

    use super::RouteReply;
    use super::decode_query;
    use super::encode_reply;

    #[test]
    fn decode_query_url_decodes_and_keeps_last_value() {
        let query = decode_query("origin=l%20ax&origin=LAX&destination=SHA");
        assert_eq!(query.get("origin").map(String::as_str), Some("LAX"));
        assert_eq!(query.get("destination").map(String::as_str), Some("SHA"));
    }

    #[test]
    fn json_replies_carry_the_wildcard_cors_header() {
        let response = encode_reply(RouteReply::Json {
            status: StatusCode::OK,
            body: serde_json::json!({"rates": []}),
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()),
            Some(b"*".as_slice())
        );
    }

    #[test]
    fn preflight_is_204_with_cors_metadata() {
        let response = encode_reply(RouteReply::Preflight);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).map(|v| v.as_bytes()),
            Some(b"GET, POST, OPTIONS".as_slice())
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_HEADERS).map(|v| v.as_bytes()),
            Some(b"Content-Type".as_slice())
        );
    }

    #[test]
    fn redirects_attach_the_session_cookie_when_present() {
        let response = encode_reply(RouteReply::Redirect {
            location: "/carrier/search?session=demo".to_string(),
            set_cookie: Some("carrier_session=demo; Path=/; HttpOnly; SameSite=Lax".to_string()),
        });
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/carrier/search?session=demo")
        );
        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }

    #[test]
    fn not_found_is_plain_text() {
        let response = encode_reply(RouteReply::NotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/plain; charset=utf-8")
        );
    }
}
