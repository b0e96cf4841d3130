//! Start/end checks against "now", minimum lead time, and maximum duration.
//!
//! All functions take explicit inputs (no system clock access). The caller
//! provides the "now" anchor, keeping these checks deterministic and
//! WASM-compatible.

use chrono::{DateTime, Duration, Utc};

use crate::candidate::{FieldErrors, FieldPath};
use crate::policy::EnginePolicy;

/// Options for [`validate_temporal`].
#[derive(Debug, Clone, Copy)]
pub struct TemporalOptions {
    /// The reference instant, typically `Utc::now()` at the call site.
    pub now: DateTime<Utc>,
    /// Whether the event is being created. Edits of a persisted event skip the
    /// lead-time check: its start may already be close to or past "now".
    pub is_creation: bool,
}

/// Validate an event's start and end instants with the default policy.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use event_engine::candidate::FieldPath;
/// use event_engine::temporal::{validate_temporal, TemporalOptions};
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();
/// let options = TemporalOptions { now, is_creation: true };
/// let errors = validate_temporal(now, now + Duration::hours(1), &options);
/// assert!(errors.contains(FieldPath::StartAt));
/// ```
pub fn validate_temporal(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    options: &TemporalOptions,
) -> FieldErrors {
    validate_temporal_with_policy(start_at, end_at, options, &EnginePolicy::default())
}

/// Validate an event's start and end instants against `policy`.
///
/// Every failure is reported as a field error; this never panics or errors.
pub fn validate_temporal_with_policy(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    options: &TemporalOptions,
    policy: &EnginePolicy,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if options.is_creation && starts_too_soon(start_at, options.now, policy.min_lead()) {
        errors.insert(
            FieldPath::StartAt,
            format!(
                "must be in the future, with a {}-minute buffer",
                policy.min_lead_minutes
            ),
        );
    }

    if end_at <= start_at {
        errors.insert(FieldPath::EndAt, "end must be after start");
    } else if end_at - start_at > policy.max_duration() {
        errors.insert(
            FieldPath::EndAt,
            format!("max duration exceeded ({} days)", policy.max_duration_days),
        );
    }

    errors
}

/// Whether `start_at` falls before `now + lead`. A lead that pushes past the
/// representable range counts as unreachable.
fn starts_too_soon(start_at: DateTime<Utc>, now: DateTime<Utc>, lead: Duration) -> bool {
    match now.checked_add_signed(lead) {
        Some(earliest) => start_at < earliest,
        None => lead > Duration::zero(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
