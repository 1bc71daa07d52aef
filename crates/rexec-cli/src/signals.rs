use async_trait::async_trait;
use rexec_core::SignalSource;
#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::debug;

/// Interrupts delivered by the operating system: SIGINT and SIGTERM on unix, Ctrl-C elsewhere.
///
/// Handlers are registered by [`OsSignals::install`]; from then on the default
/// terminate-on-interrupt behaviour is replaced.
pub struct OsSignals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl OsSignals {
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }
}

#[async_trait]
impl SignalSource for OsSignals {
    #[cfg(unix)]
    async fn recv(&mut self) -> Option<()> {
        tokio::select! {
            received = self.interrupt.recv() => {
                debug!("received SIGINT");
                received
            }
            received = self.terminate.recv() => {
                debug!("received SIGTERM");
                received
            }
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> Option<()> {
        tokio::signal::ctrl_c().await.ok()?;
        debug!("received Ctrl-C");
        Some(())
    }
}
