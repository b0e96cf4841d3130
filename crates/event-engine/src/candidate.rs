//! The candidate event definition and the field-keyed error map.
//!
//! A [`CandidateEvent`] is the in-progress, not-yet-persisted event the form
//! is editing. Its serialized shape uses the camelCase field paths that
//! errors and advisories refer to (see [`FieldPath`]).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Separator used when two rules report against the same field.
const MESSAGE_SEPARATOR: &str = "; ";

// ── Enums ───────────────────────────────────────────────────────────────────

/// How many people an event is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationMode {
    /// Exactly two participants. Capacity is always `(2, 2)`.
    Pair,
    /// A bounded group with organizer-chosen capacity.
    Group,
}

/// The meeting format, which decides whether coordinates or a link are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingKind {
    OnSite,
    Online,
    Hybrid,
}

// ── Field paths ─────────────────────────────────────────────────────────────

/// Every field path a blocking error or an advisory can point at.
///
/// Declaration order is the iteration order of [`FieldErrors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldPath {
    #[serde(rename = "startAt")]
    StartAt,
    #[serde(rename = "endAt")]
    EndAt,
    #[serde(rename = "mode")]
    Mode,
    #[serde(rename = "min")]
    Min,
    #[serde(rename = "max")]
    Max,
    #[serde(rename = "meetingKind")]
    MeetingKind,
    #[serde(rename = "onlineUrl")]
    OnlineUrl,
    #[serde(rename = "location")]
    Location,
    #[serde(rename = "location.privacyRadiusKm")]
    LocationPrivacyRadiusKm,
    #[serde(rename = "joinOpensBeforeStartMin")]
    JoinOpensBeforeStartMin,
    #[serde(rename = "joinCutoffBeforeStartMin")]
    JoinCutoffBeforeStartMin,
    #[serde(rename = "allowLateJoin")]
    AllowLateJoin,
    #[serde(rename = "lateJoinCutoffAfterMin")]
    LateJoinCutoffAfterMin,
}

impl FieldPath {
    /// The serialized path, as the form layer names the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartAt => "startAt",
            Self::EndAt => "endAt",
            Self::Mode => "mode",
            Self::Min => "min",
            Self::Max => "max",
            Self::MeetingKind => "meetingKind",
            Self::OnlineUrl => "onlineUrl",
            Self::Location => "location",
            Self::LocationPrivacyRadiusKm => "location.privacyRadiusKm",
            Self::JoinOpensBeforeStartMin => "joinOpensBeforeStartMin",
            Self::JoinCutoffBeforeStartMin => "joinCutoffBeforeStartMin",
            Self::AllowLateJoin => "allowLateJoin",
            Self::LateJoinCutoffAfterMin => "lateJoinCutoffAfterMin",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FieldErrors ─────────────────────────────────────────────────────────────

/// Blocking errors keyed by field path.
///
/// A second message for an occupied key is appended to the first rather than
/// replacing it, so rules that target the same field all stay visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldPath, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`, concatenating onto any existing message.
    pub fn insert(&mut self, field: FieldPath, message: impl Into<String>) {
        let message = message.into();
        self.0
            .entry(field)
            .and_modify(|existing| {
                existing.push_str(MESSAGE_SEPARATOR);
                existing.push_str(&message);
            })
            .or_insert(message);
    }

    /// Fold `other` into `self`. Entries of `self` always come first.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: FieldPath) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FieldPath) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldPath> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Keep only the entries whose field is in `fields`.
    pub fn retain_fields(&self, fields: &[FieldPath]) -> FieldErrors {
        FieldErrors(
            self.0
                .iter()
                .filter(|(field, _)| fields.contains(*field))
                .map(|(field, message)| (*field, message.clone()))
                .collect(),
        )
    }
}

// ── CandidateEvent ──────────────────────────────────────────────────────────

/// Where an on-site or hybrid event takes place.
///
/// Coordinates are optional at the type level; whether they are required
/// depends on the [`MeetingKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub privacy_radius_km: Option<f64>,
}

impl Location {
    /// A location with coordinates only.
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            ..Default::default()
        }
    }
}

/// The event definition being created or edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvent {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub mode: ParticipationMode,
    pub min: u32,
    pub max: u32,
    pub meeting_kind: MeetingKind,
    #[serde(default)]
    pub online_url: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub join_opens_before_start_min: Option<u32>,
    #[serde(default)]
    pub join_cutoff_before_start_min: Option<u32>,
    #[serde(default)]
    pub allow_late_join: bool,
    #[serde(default)]
    pub late_join_cutoff_after_min: Option<u32>,
}

impl CandidateEvent {
    /// Parse a candidate from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCandidate`] when the JSON is malformed or
    /// a field has the wrong type. Well-typed but out-of-range values parse
    /// fine and are reported later by validation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::InvalidCandidate(e.to_string()))
    }

    /// Whole minutes from start to end. Negative when end precedes start.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_at - self.start_at).num_minutes()
    }
}

/// Parse an RFC 3339 instant into `DateTime<Utc>`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDatetime`] if the string cannot be parsed.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EngineError::InvalidDatetime(format!("'{}': {}", s, e)))
}

// ── Tests ───────────────────────────────────────────────────────────────────
