//! Background artifact transfers for a build.
//!
//! Inputs are uploaded one after another on a single task; every mapped output is downloaded on
//! its own task. Each unit of work is observed through a [`TransferHandle`] that fires exactly once.
use std::path::Path;

use async_trait::async_trait;
use rexec_model::{BuildHandle, InputBinding, OutputBinding};
use thiserror::Error;

mod handle;
pub use handle::TransferHandle;

mod coordinator;
pub use coordinator::{TransferCoordinator, Transfers};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("io error: {0}")]
    Io(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote service rejected transfer ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Io(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    Upload,
    Download,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Upload => "upload",
            TransferKind::Download => "download",
        }
    }
}

/// Tally of finished transfer units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub transferred: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TransferReport {
    pub fn transferred() -> Self {
        Self {
            transferred: 1,
            ..Self::default()
        }
    }

    pub fn skipped() -> Self {
        Self {
            skipped: 1,
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            failed: 1,
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: TransferReport) {
        self.transferred += other.transferred;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Moves artifact contents between the local filesystem and a build.
#[async_trait]
pub trait TransferService: Send + Sync + 'static {
    /// Upload the contents of `source` as `input`. Returns the number of files sent.
    async fn upload(
        &self,
        build: &BuildHandle,
        input: &InputBinding,
        source: &Path,
        exclude_ignored: bool,
    ) -> Result<u64, TransferError>;

    /// Download `output` into `dest`. Returns the number of files written.
    async fn download(
        &self,
        build: &BuildHandle,
        output: &OutputBinding,
        dest: &Path,
    ) -> Result<u64, TransferError>;
}
