//! Non-blocking diagnostics.

use serde::Serialize;

use crate::candidate::FieldPath;

/// How loudly an advisory should be surfaced. None of them block submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    /// Reserved. No current rule emits it.
    Error,
}

/// A diagnostic about an ambiguous or risky configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub severity: Severity,
    pub message: String,
    pub related_fields: Vec<FieldPath>,
}

impl Advisory {
    pub fn info(message: impl Into<String>, related_fields: Vec<FieldPath>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            related_fields,
        }
    }

    pub fn warning(message: impl Into<String>, related_fields: Vec<FieldPath>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            related_fields,
        }
    }

    pub fn concerns(&self, field: FieldPath) -> bool {
        self.related_fields.contains(&field)
    }
}
