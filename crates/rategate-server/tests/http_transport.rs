//! HTTP transport tests for rategate-server.
// rategate-server/tests/http_transport.rs
// =============================================================================
// Module: HTTP Transport Tests
// Description: Drive the axum shell over a real listener.
// Purpose: Ensure decoding, CORS metadata, and portal redirects on the wire.
// =============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use rategate_core::DatasetStore;
use rategate_core::RateRecord;
use rategate_server::NoopAuditSink;
use rategate_server::RategateConfig;
use rategate_server::ServiceState;
use rategate_server::http::router;

type TestResult = Result<(), String>;

fn rate(origin: &str, destination: &str) -> RateRecord {
    RateRecord {
        origin: origin.to_string(),
        destination: destination.to_string(),
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
            vec![rate("LAX", "SHA"), rate("JFK", "LHR")],
            vec![rate("LAX", "SHA")],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ),
        audit: Arc::new(NoopAuditSink),
    }
}

async fn spawn_server() -> Result<SocketAddr, String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("local addr: {err}"))?;
    let app = router(Arc::new(state()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

fn client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|err| format!("client build failed: {err}"))
}

#[tokio::test(flavor = "multi_thread")]
async fn filtered_rate_lookup_over_the_wire() -> TestResult {
    let addr = spawn_server().await?;
    let client = client()?;
    let response = client
        .get(format!("http://{addr}/api/cw1/json?origin=lax&destination=sha"))
        .send()
        .await
        .map_err(|err| format!("request failed: {err}"))?;
    if response.status().as_u16() != 200 {
        return Err(format!("unexpected status: {}", response.status()));
    }
    if response.headers().get("access-control-allow-origin").map(|v| v.as_bytes())
        != Some(b"*".as_slice())
    {
        return Err("missing wildcard CORS header".to_string());
    }
    let text = response.text().await.map_err(|err| format!("body read: {err}"))?;
    let payload: serde_json::Value =
        serde_json::from_str(&text).map_err(|err| format!("bad json: {err}"))?;
    if payload["source"] != "json" || payload["rates"].as_array().map(Vec::len) != Some(1) {
        return Err(format!("unexpected payload: {payload}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn preflight_and_not_found_on_the_wire() -> TestResult {
    let addr = spawn_server().await?;
    let client = client()?;

    let preflight = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/api/spot"))
        .send()
        .await
        .map_err(|err| format!("preflight failed: {err}"))?;
    if preflight.status().as_u16() != 204 {
        return Err(format!("unexpected preflight status: {}", preflight.status()));
    }

    let missing = client
        .get(format!("http://{addr}/definitely/missing"))
        .send()
        .await
        .map_err(|err| format!("request failed: {err}"))?;
    if missing.status().as_u16() != 404 {
        return Err(format!("unexpected status: {}", missing.status()));
    }
    let text = missing.text().await.map_err(|err| format!("body read: {err}"))?;
    if text != "Not Found" {
        return Err(format!("unexpected body: {text}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn login_redirect_carries_the_session_cookie() -> TestResult {
    let addr = spawn_server().await?;
    let client = client()?;
    let response = client
        .post(format!("http://{addr}/carrier/login"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("username=demo&password=demo123")
        .send()
        .await
        .map_err(|err| format!("login failed: {err}"))?;
    if response.status().as_u16() != 302 {
        return Err(format!("unexpected status: {}", response.status()));
    }
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| "missing set-cookie".to_string())?;
    if !cookie.starts_with("carrier_session=demo") {
        return Err(format!("unexpected cookie: {cookie}"));
    }
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| "missing location".to_string())?;
    if location != "/carrier/search?session=demo" {
        return Err(format!("unexpected location: {location}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn gated_route_redirects_anonymous_clients() -> TestResult {
    let addr = spawn_server().await?;
    let client = client()?;
    let response = client
        .get(format!("http://{addr}/carrier/results?origin=lax"))
        .send()
        .await
        .map_err(|err| format!("request failed: {err}"))?;
    if response.status().as_u16() != 302 {
        return Err(format!("unexpected status: {}", response.status()));
    }
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| "missing location".to_string())?;
    if location != "/carrier/login" {
        return Err(format!("unexpected location: {location}"));
    }
    Ok(())
}
