//! Enumerated task lifecycle and classification values.

use super::{ParsePriorityError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// Permitted transitions:
///
/// - `todo → doing → done`
/// - `todo | doing → pending`, `pending → todo | doing`
/// - `todo | doing | pending → cancel`
/// - `done | cancel → todo` (re-open)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    Doing,
    /// Finished.
    Done,
    /// Blocked or deferred.
    Pending,
    /// Will not be done; carries a cancellation reason.
    Cancel,
}

impl TaskStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Todo,
        Self::Doing,
        Self::Done,
        Self::Pending,
        Self::Cancel,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Pending => "pending",
            Self::Cancel => "cancel",
        }
    }

    /// Returns `true` when the transition `self → target` is permitted.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Todo, Self::Doing | Self::Pending | Self::Cancel)
                | (Self::Doing, Self::Done | Self::Pending | Self::Cancel)
                | (Self::Pending, Self::Todo | Self::Doing | Self::Cancel)
                | (Self::Done | Self::Cancel, Self::Todo)
        )
    }

    /// Returns `true` for `done` and `cancel`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancel)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            "pending" => Ok(Self::Pending),
            "cancel" | "cancelled" | "canceled" => Ok(Self::Cancel),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority assigned by the analysis capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must be fixed before merge.
    Critical,
    /// Should be fixed before merge.
    High,
    /// Default priority.
    #[default]
    Medium,
    /// Nice to have.
    Low,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Maps an untrusted label onto a priority, falling back to
    /// [`Priority::Medium`] for anything unrecognised.
    #[must_use]
    pub fn from_label_or_default(label: &str) -> Self {
        Self::try_from(label).unwrap_or_default()
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the change requested by a task has been implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationStatus {
    /// No implementation recorded yet.
    #[default]
    NotImplemented,
    /// Implementation recorded.
    Implemented,
}

/// Outcome of the most recent verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Never verified.
    #[default]
    NotVerified,
    /// Last verification passed.
    Verified,
    /// Last verification failed.
    Failed,
}
