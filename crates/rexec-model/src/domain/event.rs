use crate::{BuildStatus, ExitStatus};

/// Event observed on a build's live event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The task container is being prepared.
    InitializeTask,
    /// The task process started with this command line.
    StartTask { path: String, args: Vec<String> },
    /// Output produced by the task.
    Log {
        origin: Option<String>,
        payload: String,
    },
    /// The task process exited.
    FinishTask { exit_status: ExitStatus },
    /// The build hit an error outside the task process.
    Error { message: String },
    /// The build changed state.
    Status { status: BuildStatus },
}

impl BuildEvent {
    /// Returns the status if this event ends the build.
    pub fn terminal_status(&self) -> Option<BuildStatus> {
        match self {
            BuildEvent::Status { status } if status.is_terminal() => Some(*status),
            _ => None,
        }
    }
}
