use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ExitStatus;

/// Lifecycle state of a remote build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStatus {
    /// Build is created but not scheduled yet.
    Pending,
    /// Build is running.
    Started,
    /// The task ran and exited zero.
    Succeeded,
    /// The task ran and exited non-zero.
    Failed,
    /// The build could not run the task (infrastructure or config problem).
    Errored,
    /// The build was aborted on request.
    Aborted,
}

impl BuildStatus {
    /// Returns `true` if the build won't transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildStatus::Succeeded
                | BuildStatus::Failed
                | BuildStatus::Errored
                | BuildStatus::Aborted
        )
    }

    /// Exit status used when the build ends without reporting one from the task itself.
    pub fn fallback_exit_status(&self) -> Option<ExitStatus> {
        match self {
            BuildStatus::Succeeded => Some(0),
            BuildStatus::Failed => Some(1),
            BuildStatus::Errored => Some(2),
            BuildStatus::Aborted => Some(3),
            BuildStatus::Pending | BuildStatus::Started => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Started => "started",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Failed => "failed",
            BuildStatus::Errored => "errored",
            BuildStatus::Aborted => "aborted",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
