//! WASM bindings for event-engine.
//!
//! Inputs and outputs are JSON strings so the browser form layer can pass its
//! state through unchanged. The caller supplies "now" as RFC 3339; the engine
//! never reads a clock.

use event_engine::error::Result;
use event_engine::{
    parse_instant, validate, AnchoredPoint, CandidateEvent, ValidateOptions, ValidationOutcome,
};
use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

fn run(candidate_json: &str, now: &str, is_creation: bool) -> Result<ValidationOutcome> {
    let candidate = CandidateEvent::from_json(candidate_json)?;
    let now = parse_instant(now)?;
    Ok(validate(&candidate, &ValidateOptions { now, is_creation }))
}

fn preview(candidate_json: &str, now: &str, timezone: &str) -> Result<Vec<AnchoredPoint>> {
    let outcome = run(candidate_json, now, true)?;
    outcome
        .timeline
        .localize(outcome.normalized.start_at, timezone)
}

/// Validate a candidate event. Returns the `ValidationOutcome` as JSON.
#[wasm_bindgen(js_name = validateEvent)]
pub fn validate_event(
    candidate_json: &str,
    now: &str,
    is_creation: bool,
) -> std::result::Result<String, JsError> {
    let outcome = run(candidate_json, now, is_creation).map_err(to_js_error)?;
    serde_json::to_string(&outcome).map_err(to_js_error)
}

/// Render a candidate's timeline in `timezone`. Returns a JSON array.
#[wasm_bindgen(js_name = previewTimeline)]
pub fn preview_timeline(
    candidate_json: &str,
    now: &str,
    timezone: &str,
) -> std::result::Result<String, JsError> {
    let points = preview(candidate_json, now, timezone).map_err(to_js_error)?;
    serde_json::to_string(&points).map_err(to_js_error)
}

// ── Tests ───────────────────────────────────────────────────────────────────
//
// `JsError` can only be built on a wasm target, so native tests cover the
// error paths through `run` and `preview` and the exports on success only.
