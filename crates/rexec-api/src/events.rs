use async_trait::async_trait;
use futures::StreamExt;
use reqwest::RequestBuilder;
use reqwest_eventsource::{Event, EventSource, retry};
use rexec_core::{ClientError, EventFeed};
use rexec_model::{BuildEvent, BuildId, BuildStatus, ExitStatus};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::errors::ApiError;

/// One decoded server-sent message.
#[derive(Debug, PartialEq)]
pub(crate) enum Frame {
    Event(BuildEvent),
    /// The server has no more events for this build.
    End,
    /// Event kind this client does not know about.
    Unknown(String),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct LogData {
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    payload: String,
}

#[derive(Default, Deserialize)]
struct StartData {
    #[serde(default)]
    path: String,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Deserialize)]
struct FinishData {
    exit_status: ExitStatus,
}

#[derive(Deserialize)]
struct ErrorData {
    message: String,
}

#[derive(Deserialize)]
struct StatusData {
    status: BuildStatus,
}

pub(crate) fn parse_frame(raw: &str) -> Result<Frame, ApiError> {
    let envelope: Envelope = serde_json::from_str(raw)
        .map_err(|e| ApiError::InvalidResponse(format!("malformed event: {e}, data: {raw}")))?;

    let event = match envelope.event.as_str() {
        "end" => return Ok(Frame::End),
        "initialize-task" => BuildEvent::InitializeTask,
        "start-task" => {
            let StartData { path, args } = if envelope.data.is_null() {
                StartData::default()
            } else {
                data(envelope.data, "start-task")?
            };
            BuildEvent::StartTask { path, args }
        }
        "log" => {
            let LogData { origin, payload } = data(envelope.data, "log")?;
            BuildEvent::Log { origin, payload }
        }
        "finish-task" => {
            let FinishData { exit_status } = data(envelope.data, "finish-task")?;
            BuildEvent::FinishTask { exit_status }
        }
        "error" => {
            let ErrorData { message } = data(envelope.data, "error")?;
            BuildEvent::Error { message }
        }
        "status" => {
            let StatusData { status } = data(envelope.data, "status")?;
            BuildEvent::Status { status }
        }
        _ => return Ok(Frame::Unknown(envelope.event)),
    };
    Ok(Frame::Event(event))
}

fn data<T: serde::de::DeserializeOwned>(value: Value, kind: &str) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("malformed `{kind}` event: {e}")))
}

/// Live event feed of a build, read from server-sent events.
///
/// The feed never reconnects: a dropped connection ends it.
pub struct SseEventFeed {
    source: EventSource,
    build: BuildId,
    done: bool,
}

impl SseEventFeed {
    pub(crate) fn open(request: RequestBuilder, build: BuildId) -> Result<Self, ApiError> {
        let mut source =
            EventSource::new(request).map_err(|e| ApiError::EventSource(e.to_string()))?;
        source.set_retry_policy(Box::new(retry::Never));
        Ok(Self {
            source,
            build,
            done: false,
        })
    }

    fn finish(&mut self) {
        if !self.done {
            self.source.close();
            self.done = true;
        }
    }
}

#[async_trait]
impl EventFeed for SseEventFeed {
    async fn next_event(&mut self) -> Result<Option<BuildEvent>, ClientError> {
        while !self.done {
            let Some(next) = self.source.next().await else {
                self.finish();
                break;
            };

            match next {
                Ok(Event::Open) => trace!(build = %self.build, "event feed opened"),
                Ok(Event::Message(message)) => match parse_frame(&message.data) {
                    Ok(Frame::Event(event)) => return Ok(Some(event)),
                    Ok(Frame::End) => {
                        debug!(build = %self.build, "event feed ended");
                        self.finish();
                    }
                    Ok(Frame::Unknown(kind)) => debug!(build = %self.build, kind = %kind, "skipping unknown event"),
                    Err(e) => {
                        self.finish();
                        return Err(e.into());
                    }
                },
                Err(reqwest_eventsource::Error::StreamEnded) => self.finish(),
                Err(e) => {
                    self.finish();
                    return Err(ApiError::from(e).into());
                }
            }
        }
        Ok(None)
    }

    async fn close(&mut self) {
        self.finish();
    }
}
