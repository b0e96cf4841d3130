//! Join-window consistency rules and the preview timeline.
//!
//! Offsets are whole minutes relative to the event start. The pre-start
//! offsets (`opens`, `cutoff`) count backwards; the late-join cutoff counts
//! forwards. An unset offset means "unrestricted" and is always valid.
//!
//! # Rules
//!
//! | Condition                                          | Result                   |
//! |----------------------------------------------------|--------------------------|
//! | both pre-start offsets set and `opens <= cutoff`   | error on `opens`         |
//! | late join with a cutoff past the event end         | WARNING                  |
//! | group event with a pre-start cutoff under 60 min   | WARNING                  |
//! | late join with no late cutoff                      | INFO                     |

use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::advisory::Advisory;
use crate::candidate::{FieldErrors, FieldPath, ParticipationMode};
use crate::error::{EngineError, Result};
use crate::policy::EnginePolicy;

/// Everything the analyzer looks at, already extracted from a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinWindowInput {
    pub opens_before_min: Option<u32>,
    pub cutoff_before_min: Option<u32>,
    pub allow_late_join: bool,
    pub late_cutoff_after_min: Option<u32>,
    /// Event length in minutes. May be zero or negative for a malformed
    /// schedule; the temporal validator reports that separately.
    pub duration_min: i64,
    pub mode: ParticipationMode,
}

/// The analyzer's three outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinWindowAnalysis {
    pub errors: FieldErrors,
    pub advisories: Vec<Advisory>,
    pub timeline: Timeline,
}

/// Check the join window with the default policy.
pub fn analyze_join_window(input: &JoinWindowInput) -> JoinWindowAnalysis {
    analyze_join_window_with_policy(input, &EnginePolicy::default())
}

/// Check the join window against `policy` and build the preview timeline.
pub fn analyze_join_window_with_policy(
    input: &JoinWindowInput,
    policy: &EnginePolicy,
) -> JoinWindowAnalysis {
    let mut errors = FieldErrors::new();
    let mut advisories = Vec::new();

    if let (Some(opens), Some(cutoff)) = (input.opens_before_min, input.cutoff_before_min) {
        if opens <= cutoff {
            errors.insert(
                FieldPath::JoinOpensBeforeStartMin,
                "opening offset must represent an earlier instant than the cutoff offset",
            );
        }
    }

    // The late cutoff only means something when late joining is on.
    let late_cutoff = input
        .late_cutoff_after_min
        .filter(|_| input.allow_late_join);

    if let Some(late) = late_cutoff {
        if i64::from(late) > input.duration_min {
            advisories.push(Advisory::warning(
                "late-join cutoff falls after the event ends",
                vec![FieldPath::LateJoinCutoffAfterMin, FieldPath::EndAt],
            ));
        }
    }

    if let Some(cutoff) = input.cutoff_before_min {
        if input.mode == ParticipationMode::Group && cutoff < policy.short_join_window_minutes {
            advisories.push(Advisory::warning(
                "short join window for a group event",
                vec![FieldPath::JoinCutoffBeforeStartMin, FieldPath::Mode],
            ));
        }
    }

    if input.allow_late_join && input.late_cutoff_after_min.is_none() {
        advisories.push(Advisory::info(
            "late join stays open until the event ends",
            vec![FieldPath::AllowLateJoin, FieldPath::LateJoinCutoffAfterMin],
        ));
    }

    JoinWindowAnalysis {
        errors,
        advisories,
        timeline: build_timeline(input),
    }
}

// ── Timeline ────────────────────────────────────────────────────────────────

/// A named point on the preview timeline.
///
/// Declaration order is the tie-break when two points share an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Marker {
    Opens,
    Cutoff,
    Start,
    LateCutoff,
    End,
}

/// A marker and its offset in minutes from the start (negative = before).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub marker: Marker,
    pub offset_min: i64,
}

/// Ordered preview of the event's join window. Presentation data only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline(Vec<TimelinePoint>);

/// A timeline point pinned to an absolute instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchoredPoint {
    pub marker: Marker,
    pub offset_min: i64,
    /// The instant in UTC (RFC 3339).
    pub utc: String,
    /// The instant in the requested timezone (RFC 3339 with offset).
    pub local: String,
    /// The UTC offset at this instant (e.g., "-05:00").
    pub utc_offset: String,
}

fn build_timeline(input: &JoinWindowInput) -> Timeline {
    let mut points = Vec::with_capacity(5);
    if let Some(opens) = input.opens_before_min {
        points.push(TimelinePoint {
            marker: Marker::Opens,
            offset_min: -i64::from(opens),
        });
    }
    if let Some(cutoff) = input.cutoff_before_min {
        points.push(TimelinePoint {
            marker: Marker::Cutoff,
            offset_min: -i64::from(cutoff),
        });
    }
    points.push(TimelinePoint {
        marker: Marker::Start,
        offset_min: 0,
    });
    if let (true, Some(late)) = (input.allow_late_join, input.late_cutoff_after_min) {
        points.push(TimelinePoint {
            marker: Marker::LateCutoff,
            offset_min: i64::from(late),
        });
    }
    points.push(TimelinePoint {
        marker: Marker::End,
        offset_min: input.duration_min,
    });

    points.sort_by_key(|p| (p.offset_min, p.marker));
    Timeline(points)
}

impl Timeline {
    pub fn points(&self) -> &[TimelinePoint] {
        &self.0
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.0.iter().map(|p| p.marker).collect()
    }

    pub fn offset_of(&self, marker: Marker) -> Option<i64> {
        self.0.iter().find(|p| p.marker == marker).map(|p| p.offset_min)
    }

    /// Pin every point to an absolute UTC instant.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDatetime`] if a point falls outside the
    /// representable date range.
    pub fn anchor(&self, start_at: DateTime<Utc>) -> Result<Vec<(Marker, DateTime<Utc>)>> {
        self.0
            .iter()
            .map(|p| Ok((p.marker, shift(start_at, p.offset_min)?)))
            .collect()
    }

    /// Pin every point to an absolute instant and render it in `timezone`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTimezone`] if `timezone` is not a valid
    /// IANA timezone name, or [`EngineError::InvalidDatetime`] if a point
    /// falls outside the representable date range.
    pub fn localize(
        &self,
        start_at: DateTime<Utc>,
        timezone: &str,
    ) -> Result<Vec<AnchoredPoint>> {
        let tz = parse_timezone(timezone)?;
        self.0
            .iter()
            .map(|p| {
                let utc = shift(start_at, p.offset_min)?;
                let local = utc.with_timezone(&tz);
                Ok(AnchoredPoint {
                    marker: p.marker,
                    offset_min: p.offset_min,
                    utc: utc.to_rfc3339(),
                    local: local.to_rfc3339(),
                    utc_offset: format_utc_offset(local.offset().fix().local_minus_utc()),
                })
            })
            .collect()
    }
}

/// `start_at` moved by `offset_min` minutes, or an error past chrono's range.
fn shift(start_at: DateTime<Utc>, offset_min: i64) -> Result<DateTime<Utc>> {
    chrono::Duration::try_minutes(offset_min)
        .and_then(|d| start_at.checked_add_signed(d))
        .ok_or_else(|| {
            EngineError::InvalidDatetime(format!(
                "{} shifted by {offset_min} minutes is out of range",
                start_at.to_rfc3339()
            ))
        })
}

/// Parse an IANA timezone string into `Tz`.
fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone(format!("'{}'", s)))
}

/// Format a UTC offset in seconds as "+HH:MM" / "-HH:MM".
fn format_utc_offset(offset_secs: i32) -> String {
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    format!("{sign}{hours:02}:{minutes:02}")
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::Severity;
    use chrono::TimeZone;

    fn input() -> JoinWindowInput {
        JoinWindowInput {
            opens_before_min: None,
            cutoff_before_min: None,
            allow_late_join: false,
            late_cutoff_after_min: None,
            duration_min: 90,
            mode: ParticipationMode::Pair,
        }
    }

    // ── Rules ───────────────────────────────────────────────────────────

    #[test]
    fn test_unrestricted_window_is_clean() {
        let analysis = analyze_join_window(&input());
        assert!(analysis.errors.is_empty());
        assert!(analysis.advisories.is_empty());
    }

    #[test]
    fn test_opens_after_cutoff_is_blocking() {
        let analysis = analyze_join_window(&JoinWindowInput {
            opens_before_min: Some(30),
            cutoff_before_min: Some(60),
            ..input()
        });
        assert!(analysis.errors.contains(FieldPath::JoinOpensBeforeStartMin));
        assert_eq!(analysis.errors.len(), 1);
    }

    #[test]
    fn test_opens_equal_to_cutoff_is_blocking() {
        let analysis = analyze_join_window(&JoinWindowInput {
            opens_before_min: Some(60),
            cutoff_before_min: Some(60),
            ..input()
        });
        assert!(analysis.errors.contains(FieldPath::JoinOpensBeforeStartMin));
    }

    #[test]
    fn test_opens_before_cutoff_is_fine() {
        let analysis = analyze_join_window(&JoinWindowInput {
            opens_before_min: Some(120),
            cutoff_before_min: Some(60),
            ..input()
        });
        assert!(analysis.errors.is_empty());
    }

    #[test]
    fn test_single_offset_is_fine() {
        let analysis = analyze_join_window(&JoinWindowInput {
            opens_before_min: Some(0),
            ..input()
        });
        assert!(analysis.errors.is_empty());
    }

    #[test]
    fn test_late_cutoff_past_end_warns_once() {
        let analysis = analyze_join_window(&JoinWindowInput {
            allow_late_join: true,
            late_cutoff_after_min: Some(90),
            duration_min: 60,
            ..input()
        });
        assert!(analysis.errors.is_empty());
        assert_eq!(analysis.advisories.len(), 1);
        let advisory = &analysis.advisories[0];
        assert_eq!(advisory.severity, Severity::Warning);
        assert!(advisory.concerns(FieldPath::LateJoinCutoffAfterMin));
    }

    #[test]
    fn test_late_cutoff_at_end_does_not_warn() {
        let analysis = analyze_join_window(&JoinWindowInput {
            allow_late_join: true,
            late_cutoff_after_min: Some(60),
            duration_min: 60,
            ..input()
        });
        assert!(analysis.advisories.is_empty());
    }

    #[test]
    fn test_late_cutoff_ignored_without_late_join() {
        let analysis = analyze_join_window(&JoinWindowInput {
            allow_late_join: false,
            late_cutoff_after_min: Some(500),
            duration_min: 60,
            ..input()
        });
        assert!(analysis.advisories.is_empty());
        assert_eq!(analysis.timeline.offset_of(Marker::LateCutoff), None);
    }

    #[test]
    fn test_short_group_window_warns() {
        let analysis = analyze_join_window(&JoinWindowInput {
            cutoff_before_min: Some(30),
            mode: ParticipationMode::Group,
            ..input()
        });
        assert_eq!(analysis.advisories.len(), 1);
        assert_eq!(analysis.advisories[0].severity, Severity::Warning);
        assert!(analysis.advisories[0].concerns(FieldPath::JoinCutoffBeforeStartMin));
    }

    #[test]
    fn test_short_window_for_pair_is_silent() {
        let analysis = analyze_join_window(&JoinWindowInput {
            cutoff_before_min: Some(30),
            ..input()
        });
        assert!(analysis.advisories.is_empty());
    }

    #[test]
    fn test_group_cutoff_at_threshold_is_silent() {
        let analysis = analyze_join_window(&JoinWindowInput {
            cutoff_before_min: Some(60),
            mode: ParticipationMode::Group,
            ..input()
        });
        assert!(analysis.advisories.is_empty());
    }

    #[test]
    fn test_open_ended_late_join_is_info() {
        let analysis = analyze_join_window(&JoinWindowInput {
            allow_late_join: true,
            ..input()
        });
        assert_eq!(analysis.advisories.len(), 1);
        assert_eq!(analysis.advisories[0].severity, Severity::Info);
    }

    #[test]
    fn test_short_window_threshold_from_policy() {
        let policy = EnginePolicy {
            short_join_window_minutes: 15,
            ..EnginePolicy::default()
        };
        let analysis = analyze_join_window_with_policy(
            &JoinWindowInput {
                cutoff_before_min: Some(30),
                mode: ParticipationMode::Group,
                ..input()
            },
            &policy,
        );
        assert!(analysis.advisories.is_empty());
    }

    // ── Timeline ────────────────────────────────────────────────────────

    #[test]
    fn test_timeline_full_ordering() {
        let analysis = analyze_join_window(&JoinWindowInput {
            opens_before_min: Some(60),
            cutoff_before_min: Some(15),
            allow_late_join: true,
            late_cutoff_after_min: Some(10),
            duration_min: 90,
            ..input()
        });
        let points: Vec<(Marker, i64)> = analysis
            .timeline
            .points()
            .iter()
            .map(|p| (p.marker, p.offset_min))
            .collect();
        assert_eq!(
            points,
            vec![
                (Marker::Opens, -60),
                (Marker::Cutoff, -15),
                (Marker::Start, 0),
                (Marker::LateCutoff, 10),
                (Marker::End, 90),
            ]
        );
    }

    #[test]
    fn test_timeline_minimal_has_start_and_end() {
        let analysis = analyze_join_window(&input());
        assert_eq!(analysis.timeline.markers(), vec![Marker::Start, Marker::End]);
    }

    #[test]
    fn test_timeline_ties_use_category_order() {
        let analysis = analyze_join_window(&JoinWindowInput {
            opens_before_min: Some(0),
            cutoff_before_min: Some(0),
            allow_late_join: true,
            late_cutoff_after_min: Some(0),
            duration_min: 0,
            ..input()
        });
        assert_eq!(
            analysis.timeline.markers(),
            vec![
                Marker::Opens,
                Marker::Cutoff,
                Marker::Start,
                Marker::LateCutoff,
                Marker::End
            ]
        );
    }

    #[test]
    fn test_timeline_sorts_late_cutoff_after_end() {
        let analysis = analyze_join_window(&JoinWindowInput {
            allow_late_join: true,
            late_cutoff_after_min: Some(120),
            duration_min: 60,
            ..input()
        });
        assert_eq!(
            analysis.timeline.markers(),
            vec![Marker::Start, Marker::End, Marker::LateCutoff]
        );
    }

    #[test]
    fn test_timeline_inverted_window_still_sorted() {
        // opens=30, cutoff=60 is an error, but the preview stays ordered.
        let analysis = analyze_join_window(&JoinWindowInput {
            opens_before_min: Some(30),
            cutoff_before_min: Some(60),
            ..input()
        });
        assert_eq!(
            analysis.timeline.markers(),
            vec![Marker::Cutoff, Marker::Opens, Marker::Start, Marker::End]
        );
    }

    #[test]
    fn test_timeline_serializes_camel_case() {
        let analysis = analyze_join_window(&JoinWindowInput {
            allow_late_join: true,
            late_cutoff_after_min: Some(5),
            ..input()
        });
        let json = serde_json::to_value(&analysis.timeline).unwrap();
        assert_eq!(json[1]["marker"], "lateCutoff");
        assert_eq!(json[1]["offsetMin"], 5);
    }

    #[test]
    fn test_timeline_anchor() {
        let start = Utc.with_ymd_and_hms(2026, 3, 16, 18, 0, 0).unwrap();
        let analysis = analyze_join_window(&JoinWindowInput {
            cutoff_before_min: Some(30),
            ..input()
        });
        let anchored = analysis.timeline.anchor(start).unwrap();
        assert_eq!(
            anchored[0],
            (Marker::Cutoff, Utc.with_ymd_and_hms(2026, 3, 16, 17, 30, 0).unwrap())
        );
        assert_eq!(
            anchored[2],
            (Marker::End, Utc.with_ymd_and_hms(2026, 3, 16, 19, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_timeline_localize_new_york() {
        // March 16 2026 is EDT (UTC-4).
        let start = Utc.with_ymd_and_hms(2026, 3, 16, 18, 0, 0).unwrap();
        let analysis = analyze_join_window(&input());
        let points = analysis
            .timeline
            .localize(start, "America/New_York")
            .unwrap();
        assert_eq!(points[0].marker, Marker::Start);
        assert_eq!(points[0].utc_offset, "-04:00");
        assert!(points[0].local.contains("14:00:00"));
        assert_eq!(points[0].utc, "2026-03-16T18:00:00+00:00");
    }

    #[test]
    fn test_timeline_localize_invalid_timezone() {
        let start = Utc.with_ymd_and_hms(2026, 3, 16, 18, 0, 0).unwrap();
        let err = analyze_join_window(&input())
            .timeline
            .localize(start, "Mars/Olympus")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_timeline_out_of_range_is_an_error() {
        let start = Utc.with_ymd_and_hms(262_000, 1, 1, 0, 0, 0).unwrap();
        let timeline = analyze_join_window(&JoinWindowInput {
            allow_late_join: true,
            late_cutoff_after_min: Some(u32::MAX),
            ..input()
        })
        .timeline;

        let err = timeline.localize(start, "UTC").unwrap_err().to_string();
        assert!(err.contains("Invalid datetime"), "got: {err}");
        assert!(timeline.anchor(start).is_err());
    }

    #[test]
    fn test_timeline_near_range_edge_still_anchors() {
        let start = Utc.with_ymd_and_hms(262_000, 1, 1, 0, 0, 0).unwrap();
        let points = analyze_join_window(&input())
            .timeline
            .localize(start, "UTC")
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].marker, Marker::End);
    }
}
