//! Verification results recorded by an external verification runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One verification run against a task's implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether every check passed.
    pub success: bool,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Names of the checks that ran, e.g. `build`, `test`, `lint`.
    #[serde(default)]
    pub checks_run: Vec<String>,
    /// Why the run failed, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl VerificationResult {
    /// Creates a passing result.
    #[must_use]
    pub fn passed(timestamp: DateTime<Utc>, checks_run: impl IntoIterator<Item = String>) -> Self {
        Self {
            success: true,
            timestamp,
            checks_run: checks_run.into_iter().collect(),
            failure_reason: None,
        }
    }

    /// Creates a failing result.
    #[must_use]
    pub fn failed(
        timestamp: DateTime<Utc>,
        checks_run: impl IntoIterator<Item = String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            timestamp,
            checks_run: checks_run.into_iter().collect(),
            failure_reason: Some(reason.into()),
        }
    }
}
