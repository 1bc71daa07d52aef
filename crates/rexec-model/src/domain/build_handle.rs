use serde::{Deserialize, Serialize};

use crate::{BuildId, BuildStatus};

/// Handle to a build created for one orchestration run.
///
/// Immutable once returned by the remote service; shared read-only by everything that addresses the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildHandle {
    pub id: BuildId,
    /// Status reported at creation time.
    #[serde(default = "initial_status")]
    pub status: BuildStatus,
}

fn initial_status() -> BuildStatus {
    BuildStatus::Pending
}

impl BuildHandle {
    pub fn new(id: impl Into<BuildId>) -> Self {
        Self {
            id: id.into(),
            status: BuildStatus::Pending,
        }
    }
}
