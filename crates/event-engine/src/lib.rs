//! # event-engine
//!
//! Deterministic scheduling and capacity rules for group and pair events.
//!
//! The engine takes a candidate event definition and produces blocking field
//! errors, non-blocking advisories, a canonical capacity pair, and an ordered
//! timeline of join-window offsets for preview. Every function is pure: the
//! caller supplies "now", and the same input always yields the same output.
//!
//! ## Modules
//!
//! - [`candidate`]: The candidate event, field paths, and the field-error map
//! - [`temporal`]: Start/end checks: lead time, ordering, maximum duration
//! - [`capacity`]: Mode-based capacity canonicalization and the mode toggle
//! - [`modality`]: On-site / online / hybrid location and link requirements
//! - [`join_window`]: Join-window consistency rules and the preview timeline
//! - [`validate`]: The composite validator and step-gating helpers
//! - [`advisory`]: Non-blocking diagnostics
//! - [`policy`]: Tunable limits
//! - [`error`]: Error types for parsing and lookups at the edges

pub mod advisory;
pub mod candidate;
pub mod capacity;
pub mod error;
pub mod join_window;
pub mod modality;
pub mod policy;
pub mod temporal;
pub mod validate;

pub use advisory::{Advisory, Severity};
pub use candidate::{
    parse_instant, CandidateEvent, FieldErrors, FieldPath, Location, MeetingKind,
    ParticipationMode,
};
pub use capacity::{
    resolve_capacity, resolve_capacity_with_policy, CapacityResolution, ModeToggle,
};
pub use error::EngineError;
pub use join_window::{
    analyze_join_window, analyze_join_window_with_policy, AnchoredPoint, JoinWindowAnalysis,
    JoinWindowInput, Marker, Timeline, TimelinePoint,
};
pub use modality::{is_http_url, validate_modality};
pub use policy::{CapacityPair, EnginePolicy};
pub use temporal::{validate_temporal, validate_temporal_with_policy, TemporalOptions};
pub use validate::{
    validate, validate_with_policy, ValidateOptions, ValidationOutcome, WizardStep,
};
