// crates/rategate-server/src/render.rs
// ============================================================================
// Module: Rategate Portal Rendering
// Description: HTML pages for the carrier portal flow.
// Purpose: Render login, search, and results markup from typed data.
// Dependencies: rategate-core
// ============================================================================

//! ## Overview
//! The portal pages are plain string templates. The dispatcher hands this
//! module typed data and receives finished markup; no routing or session
//! logic lives here. All interpolated text is escaped, including record
//! fields, since the datasets are external inputs too.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use rategate_core::RateRecord;

// ============================================================================
// SECTION: Pages
// ============================================================================

/// Renders the login form, with an optional error banner.
#[must_use]
pub fn login_page(prefix: &str, error: Option<&str>) -> String {
    let error_block = error
        .map(|message| format!("<div id=\"error\">{}</div>\n      ", escape_html(message)))
        .unwrap_or_default();
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Carrier Portal - Demo</title>
  <link rel="stylesheet" href="{prefix}/carrier/style.css">
</head>
<body>
  <main>
    <section class="card">
      <span class="badge">Carrier Portal</span>
      <h1>Sign in to view spot rates</h1>
      <p>Demo login required to access the quote search.</p>
      {error_block}<form method="POST" action="{prefix}/carrier/login">
        <label>
          Username
          <input type="text" name="username" placeholder="demo">
        </label>
        <label>
          Password
          <input type="password" name="password" placeholder="demo123">
        </label>
        <button type="submit">Sign in</button>
      </form>
      <p class="hint">Use demo / demo123</p>
    </section>
  </main>
</body>
</html>"#
    )
}

/// Renders the gated search form.
///
/// The hidden `session` field re-embeds the resolved evidence token so the
/// results request stays authenticated even when the cookie is stripped.
#[must_use]
pub fn search_page(prefix: &str, session_token: &str) -> String {
    let token = escape_html(session_token);
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Carrier Portal - Search</title>
  <link rel="stylesheet" href="{prefix}/carrier/style.css">
</head>
<body>
  <main>
    <section class="card">
      <span class="badge">Rate Search</span>
      <h1>Get spot rates</h1>
      <p>Search carrier availability by lane and equipment.</p>
      <form method="GET" action="{prefix}/carrier/results">
        <input type="hidden" name="session" value="{token}">
        <label>
          Origin
          <input type="text" name="origin" placeholder="LAX" required>
        </label>
        <label>
          Destination
          <input type="text" name="destination" placeholder="SHA" required>
        </label>
        <label>
          Mode
          <select name="mode">
            <option value="OCEAN">OCEAN</option>
            <option value="AIR">AIR</option>
          </select>
        </label>
        <label>
          Equipment Type
          <input type="text" name="equipmentType" placeholder="40HC">
        </label>
        <button type="submit">Search rates</button>
      </form>
      <div class="actions">
        <a href="{prefix}/carrier/logout">Sign out</a>
      </div>
    </section>
  </main>
</body>
</html>"#
    )
}

/// Renders the gated results table, or the empty-state message.
#[must_use]
pub fn results_page(
    prefix: &str,
    origin: Option<&str>,
    destination: Option<&str>,
    results: &[RateRecord],
) -> String {
    let lane_from = escape_html(origin.unwrap_or("Any"));
    let lane_to = escape_html(destination.unwrap_or("Any"));
    let body = if results.is_empty() {
        "<div id=\"no-rates\">No rates found for that lane.</div>".to_string()
    } else {
        let mut rows = String::new();
        for rate in results {
            let _ = write!(
                rows,
                r#"
          <tr data-rate-row>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
          </tr>"#,
                escape_html(&rate.origin),
                escape_html(&rate.destination),
                escape_html(&rate.mode),
                escape_html(&rate.equipment_type),
                rate.total_rate,
                rate.transit_days,
                escape_html(&rate.carrier),
            );
        }
        format!(
            r#"<table id="rate-table">
        <thead>
          <tr>
            <th>Origin</th>
            <th>Destination</th>
            <th>Mode</th>
            <th>Equipment</th>
            <th>Total (USD)</th>
            <th>Transit Days</th>
            <th>Carrier</th>
          </tr>
        </thead>
        <tbody>{rows}
        </tbody>
      </table>"#
        )
    };
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Carrier Portal - Results</title>
  <link rel="stylesheet" href="{prefix}/carrier/style.css">
</head>
<body>
  <main>
    <section class="card">
      <span class="badge">Results</span>
      <h1>Spot rates</h1>
      <p>Lane: {lane_from} &rarr; {lane_to}</p>
      {body}
      <div class="actions">
        <a href="{prefix}/carrier/search">New search</a>
        <a href="{prefix}/carrier/logout">Sign out</a>
      </div>
    </section>
  </main>
</body>
</html>"#
    )
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Escapes text for interpolation into HTML content or attribute values.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
