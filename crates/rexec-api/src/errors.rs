use rexec_core::{ClientError, TransferError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("remote service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event stream failed: {0}")]
    EventSource(String),
}

impl From<reqwest_eventsource::Error> for ApiError {
    fn from(e: reqwest_eventsource::Error) -> Self {
        match e {
            reqwest_eventsource::Error::InvalidStatusCode(status, _) => ApiError::Rejected {
                status: status.as_u16(),
                message: "event feed refused".into(),
            },
            other => ApiError::EventSource(other.to_string()),
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { status, message } => ClientError::Rejected { status, message },
            ApiError::InvalidResponse(msg) => ClientError::InvalidResponse(msg),
            other => ClientError::Transport(other.to_string()),
        }
    }
}

impl From<ApiError> for TransferError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { status, message } => TransferError::Rejected { status, message },
            ApiError::InvalidPath(msg) => TransferError::InvalidPath(msg),
            ApiError::Io(e) => TransferError::Io(e.to_string()),
            other => TransferError::Transport(other.to_string()),
        }
    }
}
