//! Error types for event-engine boundary operations.
//!
//! Validation itself never fails: rule violations are returned as data in
//! [`crate::ValidationOutcome`]. These errors cover parsing and lookup at the
//! edges (candidate JSON, policy files, timezones, instants).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid candidate: {0}")]
    InvalidCandidate(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
