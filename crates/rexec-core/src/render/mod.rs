//! Consumers of a build's event feed.
use std::io::{self, Stdout, Write};

use async_trait::async_trait;
use rexec_model::{BuildEvent, BuildHandle, BuildStatus, ExitStatus};
use tracing::{debug, trace};

use crate::{client::EventFeed, error::CoreError};

/// Reads a build's event feed until the build ends and yields its exit status.
#[async_trait]
pub trait StreamConsumer: Send {
    /// Called once the build exists, before any transfer starts.
    fn on_build_started(&mut self, _build: &BuildHandle) {}

    async fn consume(&mut self, feed: &mut dyn EventFeed) -> Result<ExitStatus, CoreError>;
}

/// Writes task output to a terminal-like sink.
///
/// The exit status is the task's own exit code when it reported one, otherwise derived from the
/// final build status.
pub struct EventRenderer<W> {
    out: W,
    at_line_start: bool,
}

impl EventRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> EventRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            at_line_start: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            debug!(error = %e, "failed to write build output");
        }
        self.at_line_start = text.ends_with('\n');
    }

    fn line(&mut self, text: &str) {
        if !self.at_line_start {
            self.write("\n");
        }
        self.write(text);
        self.write("\n");
    }
}

#[async_trait]
impl<W: Write + Send> StreamConsumer for EventRenderer<W> {
    fn on_build_started(&mut self, build: &BuildHandle) {
        self.line(&format!("executing build {}", build.id));
    }

    async fn consume(&mut self, feed: &mut dyn EventFeed) -> Result<ExitStatus, CoreError> {
        let mut reported: Option<ExitStatus> = None;

        loop {
            let event = feed
                .next_event()
                .await
                .map_err(|e| CoreError::EventStream(e.to_string()))?;

            let Some(event) = event else {
                return reported.ok_or_else(|| {
                    CoreError::EventStream("event feed ended before the build finished".into())
                });
            };

            if let Some(status) = event.terminal_status() {
                self.line(status.as_str());
                return Ok(exit_status(status, reported));
            }

            match event {
                BuildEvent::InitializeTask => self.line("initializing"),
                BuildEvent::StartTask { path, args } => {
                    let mut command = format!("running {path}");
                    for arg in &args {
                        command.push(' ');
                        command.push_str(arg);
                    }
                    self.line(&command);
                }
                BuildEvent::Log { payload, .. } => self.write(&payload),
                BuildEvent::FinishTask { exit_status } => {
                    debug!(exit_status, "task finished");
                    reported = Some(exit_status);
                }
                BuildEvent::Error { message } => self.line(&message),
                BuildEvent::Status { status } => trace!(%status, "build status"),
            }
        }
    }
}

fn exit_status(status: BuildStatus, reported: Option<ExitStatus>) -> ExitStatus {
    let fallback = status.fallback_exit_status().unwrap_or(1);
    match status {
        BuildStatus::Succeeded | BuildStatus::Failed => reported.unwrap_or(fallback),
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFeed;

    fn status(status: BuildStatus) -> BuildEvent {
        BuildEvent::Status { status }
    }

    fn log(payload: &str) -> BuildEvent {
        BuildEvent::Log {
            origin: None,
            payload: payload.into(),
        }
    }

    async fn render(events: Vec<BuildEvent>) -> (Result<ExitStatus, CoreError>, String) {
        let mut renderer = EventRenderer::new(Vec::new());
        let mut feed = FakeFeed::new(events);
        let result = renderer.consume(&mut feed).await;
        (result, String::from_utf8(renderer.into_inner()).unwrap())
    }

    #[tokio::test]
    async fn succeeded_build_prints_output() {
        let (code, out) = render(vec![
            BuildEvent::InitializeTask,
            BuildEvent::StartTask {
                path: "make".into(),
                args: vec!["test".into(), "-j4".into()],
            },
            log("hello\n"),
            log("world"),
            BuildEvent::FinishTask { exit_status: 0 },
            status(BuildStatus::Succeeded),
        ])
        .await;

        assert_eq!(code.unwrap(), 0);
        assert_eq!(
            out,
            "initializing\nrunning make test -j4\nhello\nworld\nsucceeded\n"
        );
    }

    #[tokio::test]
    async fn failed_build_keeps_task_exit_code() {
        let (code, _) = render(vec![
            BuildEvent::FinishTask { exit_status: 42 },
            status(BuildStatus::Failed),
        ])
        .await;
        assert_eq!(code.unwrap(), 42);
    }

    #[tokio::test]
    async fn errored_and_aborted_builds_map_to_fixed_codes() {
        let (code, out) = render(vec![
            BuildEvent::Error {
                message: "no workers".into(),
            },
            status(BuildStatus::Errored),
        ])
        .await;
        assert_eq!(code.unwrap(), 2);
        assert_eq!(out, "no workers\nerrored\n");

        let (code, _) = render(vec![
            BuildEvent::FinishTask { exit_status: 0 },
            status(BuildStatus::Aborted),
        ])
        .await;
        assert_eq!(code.unwrap(), 3);
    }

    #[tokio::test]
    async fn non_terminal_status_does_not_end_rendering() {
        let (code, _) = render(vec![
            status(BuildStatus::Started),
            status(BuildStatus::Failed),
        ])
        .await;
        assert_eq!(code.unwrap(), 1);
    }

    #[tokio::test]
    async fn feed_ending_after_finish_uses_reported_code() {
        let (code, _) = render(vec![BuildEvent::FinishTask { exit_status: 5 }]).await;
        assert_eq!(code.unwrap(), 5);
    }

    #[tokio::test]
    async fn feed_ending_early_is_an_error() {
        let (code, _) = render(vec![log("partial")]).await;
        assert!(matches!(code, Err(CoreError::EventStream(_))));
    }

    #[tokio::test]
    async fn read_failure_is_an_error() {
        let mut renderer = EventRenderer::new(Vec::new());
        let mut feed = FakeFeed::failing_after(vec![log("x")], "connection reset");
        let err = renderer.consume(&mut feed).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn announces_build() {
        let mut renderer = EventRenderer::new(Vec::new());
        renderer.on_build_started(&BuildHandle::new(12u64));
        assert_eq!(
            String::from_utf8(renderer.into_inner()).unwrap(),
            "executing build 12\n"
        );
    }
}
