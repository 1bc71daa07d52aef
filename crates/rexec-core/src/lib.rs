pub mod error;
pub use error::CoreError;

pub mod client;
pub use client::{BuildClient, ClientError, EventFeed};

pub mod config;
pub use config::load_task_config;

pub mod resolve;
pub use resolve::{determine_inputs, determine_outputs};

pub mod launcher;
pub use launcher::launch;

pub mod watcher;
pub use watcher::{CancellationState, SignalSource, SignalWatcher};

pub mod transfer;
pub use transfer::{
    TransferCoordinator, TransferError, TransferHandle, TransferKind, TransferReport,
    TransferService, Transfers,
};

pub mod render;
pub use render::{EventRenderer, StreamConsumer};

pub mod orchestrator;
pub use orchestrator::{ExecuteRequest, FORCED_EXIT_CODE, Orchestrator, Outcome};

#[cfg(test)]
pub(crate) mod testing;
