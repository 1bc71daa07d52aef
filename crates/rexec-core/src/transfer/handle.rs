use tokio::sync::oneshot;
use tracing::warn;

use super::{TransferKind, TransferReport};

/// Completion signal of one transfer unit.
#[derive(Debug)]
pub struct TransferHandle {
    kind: TransferKind,
    label: String,
    done: oneshot::Receiver<TransferReport>,
}

/// Sending half of a [`TransferHandle`]. Consumed on fire, so the signal fires at most once.
#[derive(Debug)]
pub(crate) struct Completion {
    tx: oneshot::Sender<TransferReport>,
}

impl Completion {
    pub(crate) fn fire(self, report: TransferReport) {
        let _ = self.tx.send(report);
    }
}

impl TransferHandle {
    pub(crate) fn channel(kind: TransferKind, label: impl Into<String>) -> (Completion, Self) {
        let (tx, done) = oneshot::channel();
        (
            Completion { tx },
            Self {
                kind,
                label: label.into(),
                done,
            },
        )
    }

    /// Handle whose signal has already fired.
    pub(crate) fn completed(
        kind: TransferKind,
        label: impl Into<String>,
        report: TransferReport,
    ) -> Self {
        let (completion, handle) = Self::channel(kind, label);
        completion.fire(report);
        handle
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait for the signal. A unit whose task died without firing counts as failed.
    pub async fn wait(self) -> TransferReport {
        match self.done.await {
            Ok(report) => report,
            Err(_) => {
                warn!(
                    kind = self.kind.as_str(),
                    label = %self.label,
                    "transfer ended without reporting"
                );
                TransferReport::failed()
            }
        }
    }
}
