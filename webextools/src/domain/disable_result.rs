use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStatus {
    Success,
    Failed,
}

/// Outcome of disabling the user on one CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableResult {
    /// The email as it appeared in the CSV.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub status: UpdateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl DisableResult {
    pub fn failed(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            person_id: None,
            display_name: None,
            status: UpdateStatus::Failed,
            error: Some(error.into()),
            dry_run: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UpdateStatus::Success
    }
}

impl fmt::Display for DisableResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.display_name.as_deref().unwrap_or("unknown user");
        match (&self.status, &self.error) {
            (UpdateStatus::Success, _) if self.dry_run => {
                write!(f, "[Success] Would disable user: {} ({})", name, self.email)
            }
            (UpdateStatus::Success, _) => {
                write!(f, "[Success] Disabled user: {} ({})", name, self.email)
            }
            (UpdateStatus::Failed, Some(error)) => write!(
                f,
                "[Failed] Unable to disable user: {} ({}): {}",
                name, self.email, error
            ),
            (UpdateStatus::Failed, None) => {
                write!(f, "[Failed] Unable to disable user: {} ({})", name, self.email)
            }
        }
    }
}

/// Success and failure counts of a disable-users run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisableSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl DisableSummary {
    pub fn new(results: &[DisableResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

impl fmt::Display for DisableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}
