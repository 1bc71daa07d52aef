//! One-shot execution of a task on the remote build service.
use std::sync::Arc;

use rexec_model::{BuildHandle, ExitStatus, InputBinding, OutputBinding, TaskConfig};
use tracing::{debug, instrument, warn};

use crate::{
    client::BuildClient,
    error::CoreError,
    launcher::launch,
    render::StreamConsumer,
    transfer::{TransferCoordinator, TransferReport, TransferService},
    watcher::{SignalSource, SignalWatcher},
};

/// Process exit code used when the user forces an exit with a second interrupt.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Fully resolved execution request.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub config: TaskConfig,
    pub inputs: Vec<InputBinding>,
    pub outputs: Vec<OutputBinding>,
    pub privileged: bool,
    pub exclude_ignored: bool,
    pub tags: Vec<String>,
}

#[derive(Debug)]
pub enum Outcome {
    /// The event feed reached a result and every transfer finished.
    Finished {
        build: BuildHandle,
        exit_code: ExitStatus,
        transfers: TransferReport,
    },
    /// A second interrupt cut the run short.
    ForcedExit,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Finished { exit_code, .. } => *exit_code,
            Outcome::ForcedExit => FORCED_EXIT_CODE,
        }
    }
}

/// Runs a request: launch, transfer, stream, then join transfers.
pub struct Orchestrator {
    client: Arc<dyn BuildClient>,
    transfers: Arc<dyn TransferService>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn BuildClient>, transfers: Arc<dyn TransferService>) -> Self {
        Self { client, transfers }
    }

    /// Execute `request`, reporting events to `consumer`.
    ///
    /// Interrupts from `signals` are handled from the very start; a forced exit wins over anything
    /// still in progress, including pending transfers.
    #[instrument(level = "debug", skip_all)]
    pub async fn run<S, C>(
        &self,
        request: ExecuteRequest,
        signals: S,
        consumer: &mut C,
    ) -> Result<Outcome, CoreError>
    where
        S: SignalSource,
        C: StreamConsumer + ?Sized,
    {
        let mut watcher = SignalWatcher::arm(signals, Arc::clone(&self.client));
        let forced = watcher.force_exit();

        tokio::select! {
            biased;
            _ = forced.cancelled() => {
                warn!("forced exit, pending work abandoned");
                Ok(Outcome::ForcedExit)
            }
            outcome = self.drive(request, &mut watcher, consumer) => outcome,
        }
    }

    async fn drive<C>(
        &self,
        request: ExecuteRequest,
        watcher: &mut SignalWatcher,
        consumer: &mut C,
    ) -> Result<Outcome, CoreError>
    where
        C: StreamConsumer + ?Sized,
    {
        let build = launch(self.client.as_ref(), &request).await?;
        watcher.attach(&build);
        consumer.on_build_started(&build);

        let transfers = TransferCoordinator::new(Arc::clone(&self.transfers))
            .exclude_ignored(request.exclude_ignored)
            .start(&build, request.inputs, request.outputs);

        let exit_code = self.stream(&build, consumer).await?;

        let report = transfers.join().await;
        if report.is_clean() {
            debug!(build = %build.id, transferred = report.transferred, "transfers finished");
        } else {
            warn!(build = %build.id, failed = report.failed, "some transfers failed");
        }

        Ok(Outcome::Finished {
            build,
            exit_code,
            transfers: report,
        })
    }

    async fn stream<C>(&self, build: &BuildHandle, consumer: &mut C) -> Result<ExitStatus, CoreError>
    where
        C: StreamConsumer + ?Sized,
    {
        let mut feed = self
            .client
            .build_events(build.id)
            .await
            .map_err(|e| CoreError::EventStream(e.to_string()))?;

        let result = consumer.consume(&mut *feed).await;
        feed.close().await;
        result
    }
}
