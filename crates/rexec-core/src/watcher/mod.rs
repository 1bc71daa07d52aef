//! Interrupt handling for a running build.
//!
//! The first interrupt asks the service to abort the build; a second one forces the process out
//! without waiting for anything else.
use std::sync::Arc;

use async_trait::async_trait;
use rexec_model::BuildHandle;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{client::BuildClient, error::CoreError};

/// Progress of user-requested cancellation. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationState {
    Idle,
    AbortRequested,
    ForceExit,
}

/// Stream of interrupt requests.
#[async_trait]
pub trait SignalSource: Send + 'static {
    /// Wait for the next interrupt; `None` once no more can arrive.
    async fn recv(&mut self) -> Option<()>;
}

#[async_trait]
impl SignalSource for mpsc::Receiver<()> {
    async fn recv(&mut self) -> Option<()> {
        mpsc::Receiver::recv(self).await
    }
}

#[async_trait]
impl SignalSource for mpsc::UnboundedReceiver<()> {
    async fn recv(&mut self) -> Option<()> {
        mpsc::UnboundedReceiver::recv(self).await
    }
}

/// Armed interrupt handler.
///
/// Interrupts are accepted from the moment of arming. An abort requested before the build exists
/// is issued as soon as the build is attached.
pub struct SignalWatcher {
    state: watch::Receiver<CancellationState>,
    force_exit: CancellationToken,
    target: Option<oneshot::Sender<BuildHandle>>,
    task: JoinHandle<()>,
}

impl SignalWatcher {
    pub fn arm<S: SignalSource>(source: S, client: Arc<dyn BuildClient>) -> Self {
        let (state_tx, state) = watch::channel(CancellationState::Idle);
        let (target_tx, target_rx) = oneshot::channel();
        let force_exit = CancellationToken::new();

        let task = tokio::spawn(watch_signals(
            source,
            client,
            state_tx,
            target_rx,
            force_exit.clone(),
        ));

        Self {
            state,
            force_exit,
            target: Some(target_tx),
            task,
        }
    }

    /// Bind the watcher to the created build. Only the first call has an effect.
    pub fn attach(&mut self, build: &BuildHandle) {
        if let Some(target) = self.target.take() {
            let _ = target.send(build.clone());
        }
    }

    pub fn state(&self) -> CancellationState {
        *self.state.borrow()
    }

    /// Receiver observing every state transition.
    pub fn subscribe(&self) -> watch::Receiver<CancellationState> {
        self.state.clone()
    }

    /// Token cancelled when a forced exit is requested.
    pub fn force_exit(&self) -> CancellationToken {
        self.force_exit.clone()
    }
}

impl Drop for SignalWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_signals<S: SignalSource>(
    mut source: S,
    client: Arc<dyn BuildClient>,
    state: watch::Sender<CancellationState>,
    target: oneshot::Receiver<BuildHandle>,
    force_exit: CancellationToken,
) {
    let mut target = Some(target);

    while source.recv().await.is_some() {
        let current = *state.borrow();
        match current {
            CancellationState::Idle => {
                state.send_replace(CancellationState::AbortRequested);
                warn!(target: "rexec.watcher", "interrupt received, aborting build");
                if let Some(target) = target.take() {
                    tokio::spawn(request_abort(Arc::clone(&client), target));
                }
            }
            CancellationState::AbortRequested => {
                state.send_replace(CancellationState::ForceExit);
                warn!(target: "rexec.watcher", "second interrupt received, exiting immediately");
                force_exit.cancel();
                return;
            }
            CancellationState::ForceExit => return,
        }
    }
    trace!(target: "rexec.watcher", "signal source closed");
}

async fn request_abort(client: Arc<dyn BuildClient>, target: oneshot::Receiver<BuildHandle>) {
    let Ok(build) = target.await else {
        debug!(target: "rexec.watcher", "no build was created, nothing to abort");
        return;
    };

    match client.abort_build(build.id).await {
        Ok(()) => info!(target: "rexec.watcher", build = %build.id, "abort requested"),
        Err(e) => {
            let err = CoreError::AbortRequest(e);
            error!(target: "rexec.watcher", build = %build.id, "{err}");
        }
    }
}
