//! Seam to the remote build service.
//!
//! The orchestration core only depends on these traits; `rexec-api` provides the HTTP implementation.
use async_trait::async_trait;
use rexec_model::{BuildEvent, BuildHandle, BuildId, BuildRequest, JobInput, JobRef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Remote calls issued against the build service.
///
/// Implementations must be shareable: the launcher, the signal watcher and the event consumer all call into the same client concurrently.
#[async_trait]
pub trait BuildClient: Send + Sync + 'static {
    /// Create a build for `request`.
    async fn create_build(&self, request: &BuildRequest) -> Result<BuildHandle, ClientError>;

    /// Ask the service to abort a running build.
    async fn abort_build(&self, id: BuildId) -> Result<(), ClientError>;

    /// Open the live event feed of a build.
    async fn build_events(&self, id: BuildId) -> Result<Box<dyn EventFeed>, ClientError>;

    /// Inputs of the latest build of `job`.
    async fn job_inputs(&self, job: &JobRef) -> Result<Vec<JobInput>, ClientError>;
}

/// Open handle to a build's live event feed.
#[async_trait]
pub trait EventFeed: Send {
    /// Next event, or `None` once the feed is exhausted.
    async fn next_event(&mut self) -> Result<Option<BuildEvent>, ClientError>;

    /// Release the underlying connection. Safe to call more than once.
    async fn close(&mut self);
}
