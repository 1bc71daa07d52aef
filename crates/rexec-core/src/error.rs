use thiserror::Error;

use crate::client::ClientError;

/// Errors surfaced by an orchestration run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The task config could not be read, parsed or validated.
    #[error("failed to load task config: {0}")]
    ConfigLoad(String),

    #[error("failed to resolve inputs: {0}")]
    InputResolution(String),

    #[error("failed to resolve outputs: {0}")]
    OutputResolution(String),

    /// No build exists after this error.
    #[error("failed to create build: {0}")]
    BuildCreation(String),

    /// Reported only; never aborts a run.
    #[error("failed to abort build: {0}")]
    AbortRequest(#[source] ClientError),

    #[error("failed to read build events: {0}")]
    EventStream(String),
}

impl From<rexec_model::ModelError> for CoreError {
    fn from(e: rexec_model::ModelError) -> Self {
        CoreError::ConfigLoad(e.to_string())
    }
}
