use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format `{0}` (expected text, json or journald)")]
    InvalidFormat(String),
    /// Journald needs linux and the `journald` feature.
    #[error("journald logging is not available in this build")]
    JournaldNotSupported,
    #[error("a global logger is already installed")]
    AlreadyInitialized,
    #[error("failed to install logger: {0}")]
    InitializationFailed(String),
    #[error("invalid log filter `{0}`")]
    InvalidLogLevel(String),
}
