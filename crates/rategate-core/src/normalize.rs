// crates/rategate-core/src/normalize.rs
// ============================================================================
// Module: Rategate Query Normalization
// Description: Canonical comparison tokens and the SQL token sanitizer.
// Purpose: Make filtering case- and whitespace-insensitive on both sides.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Two distinct transforms live here. [`normalize`] produces the canonical
//! comparison token used by the in-memory filter engine: absent or blank
//! input means "unconstrained". [`sanitize_token`] is the stricter transform
//! for the engine-backed path: it is the only defense between user input and
//! the concatenated query string, so it keeps nothing outside `[A-Z0-9 _-]`.

// ============================================================================
// SECTION: Normalizer
// ============================================================================

/// Converts a raw query parameter into a canonical comparison token.
///
/// Absent, empty, or whitespace-only input yields `None`, meaning "no
/// constraint on this field". Otherwise the value is trimmed and upper-cased.
/// Stored records are assumed pre-normalized to upper case.
#[must_use]
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_uppercase())
}

// ============================================================================
// SECTION: Sanitizer
// ============================================================================

/// Reduces a raw value to the characters allowed inside an equality clause.
///
/// Upper-cases, removes every character outside `[A-Z0-9 _-]`, then trims.
/// Returns an empty string for absent input; an empty result means the field
/// contributes no clause.
#[must_use]
pub fn sanitize_token(raw: Option<&str>) -> String {
    let upper = raw.unwrap_or_default().to_uppercase();
    let kept: String = upper
        .chars()
        .filter(|ch| matches!(ch, 'A'..='Z' | '0'..='9' | ' ' | '_' | '-'))
        .collect();
    kept.trim().to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
