//! The composite validator.
//!
//! Runs the temporal, capacity, modality, and join-window checks over one
//! candidate and merges their results into a single [`ValidationOutcome`].
//! The components share no state; the only ordering that matters is the
//! order messages are concatenated when two of them report on the same
//! field (temporal, capacity, modality, join-window).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::advisory::Advisory;
use crate::candidate::{CandidateEvent, FieldErrors, FieldPath};
use crate::capacity::resolve_capacity_with_policy;
use crate::join_window::{analyze_join_window_with_policy, JoinWindowInput, Timeline};
use crate::modality::validate_modality;
use crate::policy::EnginePolicy;
use crate::temporal::{validate_temporal_with_policy, TemporalOptions};

/// Options for [`validate`].
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    /// The reference instant for lead-time checks.
    pub now: DateTime<Utc>,
    /// `false` when editing an already-persisted event.
    pub is_creation: bool,
}

/// The result of one validation pass. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub field_errors: FieldErrors,
    pub advisories: Vec<Advisory>,
    /// The candidate with its capacity replaced by the canonical pair.
    pub normalized: CandidateEvent,
    pub is_valid: bool,
    pub timeline: Timeline,
}

/// Validate a candidate with the default policy.
pub fn validate(candidate: &CandidateEvent, options: &ValidateOptions) -> ValidationOutcome {
    validate_with_policy(candidate, options, &EnginePolicy::default())
}

/// Validate a candidate against `policy`.
pub fn validate_with_policy(
    candidate: &CandidateEvent,
    options: &ValidateOptions,
    policy: &EnginePolicy,
) -> ValidationOutcome {
    let temporal = validate_temporal_with_policy(
        candidate.start_at,
        candidate.end_at,
        &TemporalOptions {
            now: options.now,
            is_creation: options.is_creation,
        },
        policy,
    );

    let capacity =
        resolve_capacity_with_policy(candidate.mode, candidate.min, candidate.max, policy);

    let modality = validate_modality(
        candidate.meeting_kind,
        candidate.online_url.as_deref(),
        candidate.location.as_ref(),
    );

    let join_window = analyze_join_window_with_policy(
        &JoinWindowInput {
            opens_before_min: candidate.join_opens_before_start_min,
            cutoff_before_min: candidate.join_cutoff_before_start_min,
            allow_late_join: candidate.allow_late_join,
            late_cutoff_after_min: candidate.late_join_cutoff_after_min,
            duration_min: candidate.duration_minutes(),
            mode: candidate.mode,
        },
        policy,
    );

    let mut field_errors = temporal;
    field_errors.merge(capacity.errors);
    field_errors.merge(modality);
    field_errors.merge(join_window.errors);

    let normalized = CandidateEvent {
        min: capacity.canonical.min,
        max: capacity.canonical.max,
        ..candidate.clone()
    };

    let is_valid = field_errors.is_empty();
    tracing::debug!(
        is_creation = options.is_creation,
        errors = field_errors.len(),
        advisories = join_window.advisories.len(),
        is_valid,
        "validated candidate event"
    );

    ValidationOutcome {
        field_errors,
        advisories: join_window.advisories,
        normalized,
        is_valid,
        timeline: join_window.timeline,
    }
}

// ── Consumer helpers ────────────────────────────────────────────────────────

/// The steps of the event creation wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    BasicsAndCapacity,
    ScheduleAndPlace,
    Privacy,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::BasicsAndCapacity,
        WizardStep::ScheduleAndPlace,
        WizardStep::Privacy,
    ];

    /// The fields edited on this step.
    pub fn fields(&self) -> &'static [FieldPath] {
        match self {
            Self::BasicsAndCapacity => &[FieldPath::Mode, FieldPath::Min, FieldPath::Max],
            Self::ScheduleAndPlace => &[
                FieldPath::StartAt,
                FieldPath::EndAt,
                FieldPath::MeetingKind,
                FieldPath::OnlineUrl,
                FieldPath::Location,
                FieldPath::JoinOpensBeforeStartMin,
                FieldPath::JoinCutoffBeforeStartMin,
                FieldPath::AllowLateJoin,
                FieldPath::LateJoinCutoffAfterMin,
            ],
            Self::Privacy => &[FieldPath::LocationPrivacyRadiusKm],
        }
    }

    /// The step a field is edited on.
    pub fn of(field: FieldPath) -> WizardStep {
        match field {
            FieldPath::Mode | FieldPath::Min | FieldPath::Max => Self::BasicsAndCapacity,
            FieldPath::StartAt
            | FieldPath::EndAt
            | FieldPath::MeetingKind
            | FieldPath::OnlineUrl
            | FieldPath::Location
            | FieldPath::JoinOpensBeforeStartMin
            | FieldPath::JoinCutoffBeforeStartMin
            | FieldPath::AllowLateJoin
            | FieldPath::LateJoinCutoffAfterMin => Self::ScheduleAndPlace,
            FieldPath::LocationPrivacyRadiusKm => Self::Privacy,
        }
    }
}

impl ValidationOutcome {
    /// The blocking errors that belong to `step`.
    pub fn errors_for_step(&self, step: WizardStep) -> FieldErrors {
        self.field_errors.retain_fields(step.fields())
    }

    /// Whether leaving `step` should be prevented.
    pub fn blocks_step(&self, step: WizardStep) -> bool {
        self.field_errors.fields().any(|f| step.fields().contains(&f))
    }

    /// Submission is allowed only for a valid candidate that differs from the
    /// persisted baseline. Dirtiness is tracked by the caller.
    pub fn can_submit(&self, is_dirty: bool) -> bool {
        self.is_valid && is_dirty
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
