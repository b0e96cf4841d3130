//! Tunable limits for event validation.
//!
//! [`EnginePolicy::default`] carries the production constants. Callers that
//! need different limits load a policy from JSON and pass it to the
//! `*_with_policy` functions.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Minimum lead time between "now" and a newly created event's start.
pub const MIN_LEAD_MINUTES: i64 = 5;
/// Longest allowed event.
pub const MAX_DURATION_DAYS: i64 = 30;
/// Smallest group capacity. Pairs are fixed at this value.
pub const GROUP_MIN: u32 = 2;
/// Largest group capacity.
pub const GROUP_MAX: u32 = 50;
/// Join cutoffs shorter than this trigger an advisory for group events.
pub const SHORT_JOIN_WINDOW_MINUTES: u32 = 60;

/// A `(min, max)` participant pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapacityPair {
    pub min: u32,
    pub max: u32,
}

impl CapacityPair {
    /// The only capacity a pair event can have.
    pub const PAIR: CapacityPair = CapacityPair { min: 2, max: 2 };

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Limits applied by the validators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePolicy {
    pub min_lead_minutes: i64,
    pub max_duration_days: i64,
    pub group_min: u32,
    pub group_max: u32,
    pub short_join_window_minutes: u32,
    /// The capacity a new form starts with; restored when leaving pair mode.
    pub default_capacity: CapacityPair,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            min_lead_minutes: MIN_LEAD_MINUTES,
            max_duration_days: MAX_DURATION_DAYS,
            group_min: GROUP_MIN,
            group_max: GROUP_MAX,
            short_join_window_minutes: SHORT_JOIN_WINDOW_MINUTES,
            default_capacity: CapacityPair::new(GROUP_MIN, 10),
        }
    }
}

impl EnginePolicy {
    /// Load a policy from JSON. Missing keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPolicy`] if the JSON cannot be parsed or
    /// the limits contradict each other.
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: EnginePolicy =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidPolicy(e.to_string()))?;
        policy.check()?;
        Ok(policy)
    }

    /// Reject limits no candidate could satisfy or that cannot be represented
    /// as a time span.
    pub fn check(&self) -> Result<()> {
        if self.min_lead_minutes < 0 {
            return Err(EngineError::InvalidPolicy(format!(
                "min_lead_minutes must be non-negative, got {}",
                self.min_lead_minutes
            )));
        }
        if self.max_duration_days <= 0 {
            return Err(EngineError::InvalidPolicy(format!(
                "max_duration_days must be positive, got {}",
                self.max_duration_days
            )));
        }
        if chrono::Duration::try_minutes(self.min_lead_minutes).is_none() {
            return Err(EngineError::InvalidPolicy(format!(
                "min_lead_minutes is out of range, got {}",
                self.min_lead_minutes
            )));
        }
        if chrono::Duration::try_days(self.max_duration_days).is_none() {
            return Err(EngineError::InvalidPolicy(format!(
                "max_duration_days is out of range, got {}",
                self.max_duration_days
            )));
        }
        if self.group_min < GROUP_MIN {
            return Err(EngineError::InvalidPolicy(format!(
                "group_min must be at least {GROUP_MIN}, got {}",
                self.group_min
            )));
        }
        if self.group_min > self.group_max {
            return Err(EngineError::InvalidPolicy(format!(
                "group_min ({}) exceeds group_max ({})",
                self.group_min, self.group_max
            )));
        }
        let d = self.default_capacity;
        if d.min < self.group_min || d.max > self.group_max || d.min > d.max {
            return Err(EngineError::InvalidPolicy(format!(
                "default_capacity ({}, {}) is outside group bounds ({}, {})",
                d.min, d.max, self.group_min, self.group_max
            )));
        }
        Ok(())
    }

    /// The lead time as a span. Saturates for limits `check` would reject.
    pub fn min_lead(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.min_lead_minutes)
            .unwrap_or_else(|| saturated(self.min_lead_minutes))
    }

    /// The maximum event length as a span. Saturates for limits `check` would reject.
    pub fn max_duration(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.max_duration_days)
            .unwrap_or_else(|| saturated(self.max_duration_days))
    }
}

fn saturated(value: i64) -> chrono::Duration {
    if value < 0 {
        chrono::Duration::MIN
    } else {
        chrono::Duration::MAX
    }
}
