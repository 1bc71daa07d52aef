use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid pair '{0}' (expected NAME=PATH)")]
    InvalidPair(String),
    #[error("invalid job '{0}' (expected PIPELINE/JOB)")]
    InvalidJob(String),
    #[error("invalid task config:\n  {}", .0.join("\n  "))]
    InvalidConfig(Vec<String>),
}
