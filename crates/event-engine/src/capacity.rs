//! Participation-mode capacity rules.
//!
//! [`resolve_capacity`] maps a mode and a requested `(min, max)` to the pair
//! that is actually enforced. [`ModeToggle`] is the form-side state machine
//! that keeps the capacity inputs in step with mode selection.

use serde::Serialize;

use crate::candidate::{FieldErrors, FieldPath, ParticipationMode};
use crate::policy::{CapacityPair, EnginePolicy};

/// The enforced capacity plus any group-bound violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityResolution {
    pub canonical: CapacityPair,
    pub errors: FieldErrors,
}

/// Resolve the canonical capacity with the default policy.
///
/// # Examples
///
/// ```
/// use event_engine::candidate::ParticipationMode;
/// use event_engine::capacity::resolve_capacity;
/// use event_engine::policy::CapacityPair;
///
/// let resolved = resolve_capacity(ParticipationMode::Pair, 4, 9);
/// assert_eq!(resolved.canonical, CapacityPair::PAIR);
/// assert!(resolved.errors.is_empty());
/// ```
pub fn resolve_capacity(
    mode: ParticipationMode,
    requested_min: u32,
    requested_max: u32,
) -> CapacityResolution {
    resolve_capacity_with_policy(mode, requested_min, requested_max, &EnginePolicy::default())
}

/// Resolve the canonical capacity against `policy`.
///
/// Pair mode always yields `(2, 2)` without an error: the override is a
/// normalization, not a rejection. Group mode keeps the requested pair and
/// reports each bound violation on the offending field.
pub fn resolve_capacity_with_policy(
    mode: ParticipationMode,
    requested_min: u32,
    requested_max: u32,
    policy: &EnginePolicy,
) -> CapacityResolution {
    match mode {
        ParticipationMode::Pair => CapacityResolution {
            canonical: CapacityPair::PAIR,
            errors: FieldErrors::new(),
        },
        ParticipationMode::Group => {
            let mut errors = FieldErrors::new();
            if requested_min < policy.group_min {
                errors.insert(
                    FieldPath::Min,
                    format!("group events need at least {} participants", policy.group_min),
                );
            }
            if requested_max > policy.group_max {
                errors.insert(
                    FieldPath::Max,
                    format!("group events allow at most {} participants", policy.group_max),
                );
            }
            if requested_min > requested_max {
                errors.insert(FieldPath::Max, "max must be at least min");
            }
            CapacityResolution {
                canonical: CapacityPair::new(requested_min, requested_max),
                errors,
            }
        }
    }
}

// ── Mode toggle ─────────────────────────────────────────────────────────────

/// Keeps the form's capacity inputs consistent with the selected mode.
///
/// Entering pair mode forces `(2, 2)` and forgets the previous values.
/// Entering group mode while the pair is exactly `(2, 2)` restores the
/// capacity the form was initialized with; any other pair is left alone.
/// `(2, 2)` is the only signal that the values were machine-set, so a user
/// who really wants a 2–2 group will see the defaults come back on every
/// group selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeToggle {
    mode: ParticipationMode,
    capacity: CapacityPair,
    initial: CapacityPair,
}

impl ModeToggle {
    /// Start a toggle from the form's initial values. `capacity` becomes the
    /// pair restored on later group selections.
    pub fn new(mode: ParticipationMode, capacity: CapacityPair) -> Self {
        Self {
            mode,
            capacity,
            initial: capacity,
        }
    }

    pub fn mode(&self) -> ParticipationMode {
        self.mode
    }

    pub fn capacity(&self) -> CapacityPair {
        self.capacity
    }

    /// The pair restored when leaving pair mode.
    pub fn initial_capacity(&self) -> CapacityPair {
        self.initial
    }

    /// Apply a user mode selection. Re-selecting the current mode runs the
    /// same rule as switching to it.
    pub fn select(&mut self, mode: ParticipationMode) -> CapacityPair {
        let before = self.capacity;
        match mode {
            ParticipationMode::Pair => {
                self.capacity = CapacityPair::PAIR;
            }
            ParticipationMode::Group => {
                if self.capacity == CapacityPair::PAIR {
                    self.capacity = self.initial;
                }
            }
        }
        tracing::trace!(
            from = ?self.mode,
            to = ?mode,
            before_min = before.min,
            before_max = before.max,
            after_min = self.capacity.min,
            after_max = self.capacity.max,
            "mode toggled"
        );
        self.mode = mode;
        self.capacity
    }

    /// Record a capacity typed by the user. The mode does not change.
    pub fn set_capacity(&mut self, capacity: CapacityPair) {
        self.capacity = capacity;
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
