//! Carrier portal session flow tests for rategate-server.
// rategate-server/tests/portal_flow.rs
// =============================================================================
// Module: Portal Flow Tests
// Description: Exercise the login, gating, and logout flow through dispatch.
// Purpose: Ensure the session state machine holds across a full round trip.
// =============================================================================

use std::sync::Arc;

use axum::http::Method;
use axum::http::StatusCode;
use rategate_core::DatasetStore;
use rategate_core::QueryMap;
use rategate_core::RateRecord;
use rategate_server::NoopAuditSink;
use rategate_server::ParsedRequest;
use rategate_server::RategateConfig;
use rategate_server::RouteReply;
use rategate_server::ServiceState;
use rategate_server::dispatch;

type TestResult = Result<(), String>;

fn spot_rate() -> RateRecord {
    RateRecord {
        origin: "LAX".to_string(),
        destination: "SHA".to_string(),
        mode: "OCEAN".to_string(),
        equipment_type: "40HC".to_string(),
        service_level: "STANDARD".to_string(),
        total_rate: 1450.0,
        transit_days: 18,
        carrier: "EVERLINE".to_string(),
    }
}

fn state() -> ServiceState {
    ServiceState {
        config: RategateConfig::default(),
        datasets: DatasetStore::from_parts(
            vec![spot_rate()],
            vec![spot_rate()],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ),
        audit: Arc::new(NoopAuditSink),
    }
}

fn get(path: &str, query: &[(&str, &str)], cookie: Option<&str>) -> ParsedRequest {
    ParsedRequest {
        method: Method::GET,
        path: path.to_string(),
        query: query.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect::<QueryMap>(),
        cookie_header: cookie.map(str::to_string),
        body: String::new(),
    }
}

fn post_login(body: &str) -> ParsedRequest {
    ParsedRequest {
        method: Method::POST,
        path: "/carrier/login".to_string(),
        query: QueryMap::new(),
        cookie_header: None,
        body: body.to_string(),
    }
}

fn session_cookie(reply: &RouteReply) -> Result<String, String> {
    match reply {
        RouteReply::Redirect {
            set_cookie: Some(cookie),
            ..
        } => {
            let pair = cookie.split(';').next().unwrap_or_default();
            Ok(pair.to_string())
        }
        other => Err(format!("expected cookie-carrying redirect, got {other:?}")),
    }
}

#[test]
fn full_session_round_trip() -> TestResult {
    let state = state();

    // Anonymous read of a gated route redirects to login.
    let denied = dispatch(&state, &get("/carrier/search", &[], None));
    if denied.status() != StatusCode::FOUND {
        return Err(format!("expected redirect, got {denied:?}"));
    }

    // Login with the demo pair issues the session cookie.
    let logged_in = dispatch(&state, &post_login("username=demo&password=demo123"));
    let cookie = session_cookie(&logged_in)?;

    // The cookie passes the gate on both gated reads.
    let search = dispatch(&state, &get("/carrier/search", &[], Some(&cookie)));
    if search.status() != StatusCode::OK {
        return Err(format!("search denied with cookie: {search:?}"));
    }
    let results = dispatch(
        &state,
        &get("/carrier/results", &[("origin", "lax"), ("destination", "sha")], Some(&cookie)),
    );
    match &results {
        RouteReply::Html {
            status,
            body,
        } if *status == StatusCode::OK => {
            if !body.contains("data-rate-row") {
                return Err("results page missing matched row".to_string());
            }
        }
        other => return Err(format!("unexpected results reply: {other:?}")),
    }

    // Logout clears the session regardless of prior state.
    let logged_out = dispatch(&state, &get("/carrier/logout", &[], Some(&cookie)));
    match &logged_out {
        RouteReply::Redirect {
            set_cookie: Some(cookie),
            ..
        } if cookie.contains("Max-Age=0") => {}
        other => return Err(format!("logout did not clear session: {other:?}")),
    }

    // A cleared client is anonymous again.
    let denied_again = dispatch(&state, &get("/carrier/results", &[], None));
    if denied_again.status() != StatusCode::FOUND {
        return Err(format!("expected redirect after logout, got {denied_again:?}"));
    }
    Ok(())
}

#[test]
fn wrong_credentials_never_issue_a_cookie() -> TestResult {
    let state = state();
    for body in ["username=demo&password=demo", "username=admin&password=demo123", ""] {
        let reply = dispatch(&state, &post_login(body));
        match reply {
            RouteReply::Html {
                status, ..
            } if status == StatusCode::UNAUTHORIZED => {}
            other => return Err(format!("expected 401 for {body:?}, got {other:?}")),
        }
    }
    Ok(())
}

#[test]
fn legacy_query_token_substitutes_for_the_cookie() -> TestResult {
    let state = state();
    let reply = dispatch(&state, &get("/carrier/search", &[("session", "demo")], None));
    match reply {
        RouteReply::Html {
            status,
            body,
        } if status == StatusCode::OK => {
            // The search form re-embeds the presented token.
            if !body.contains("name=\"session\" value=\"demo\"") {
                return Err("search page did not re-embed the session token".to_string());
            }
            Ok(())
        }
        other => Err(format!("expected gated page, got {other:?}")),
    }
}

#[test]
fn prefixed_and_unprefixed_paths_share_the_route_table() -> TestResult {
    let state = state();
    for path in ["/cw1/json", "/api/cw1/json"] {
        let reply = dispatch(&state, &get(path, &[("origin", "lax")], None));
        match reply {
            RouteReply::Json {
                status,
                body,
            } if status == StatusCode::OK => {
                if body["rates"].as_array().map(Vec::len) != Some(1) {
                    return Err(format!("unexpected rates for {path}: {body}"));
                }
            }
            other => return Err(format!("unexpected reply for {path}: {other:?}")),
        }
    }
    Ok(())
}
