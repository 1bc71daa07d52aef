//! HTTP adapters for the remote build service.
mod config;
pub use config::ApiConfig;

mod errors;
pub use errors::ApiError;

mod endpoint;

mod client;
pub use client::HttpBuildClient;

mod events;
pub use events::SseEventFeed;

mod transfer;
pub use transfer::HttpTransfer;
