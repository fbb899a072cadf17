//! chatsync SDK
//!
//! Client side of the chatsync protocol: an HTTP client for every server
//! call, and a background polling loop that turns the request/response API
//! into a stream of events.
//!
//! # Overview
//!
//! - [`SyncClient`] - one method per server endpoint (send, command, join, leave, ...)
//! - [`PollingClient`] - background loop emitting [`PollEvent`]s over a channel
//! - [`SyncApi`] - the two calls the loop depends on, implemented by [`SyncClient`]
//!
//! # Quick Start
//!
//! ```ignore
//! use chatsync_sdk::{PollEvent, PollerConfig, PollingClient, SyncClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PollerConfig::new("http://127.0.0.1:5000");
//!
//!     // Sending never touches the polling loop
//!     let client = SyncClient::new(&config)?;
//!     client.join().await?;
//!     client.send_message("hello").await?;
//!
//!     let mut poller = PollingClient::new(config)?;
//!     let mut rx = poller.start()?;
//!
//!     while let Some(event) = rx.recv().await {
//!         if let PollEvent::NewMessage(message) = event {
//!             println!("{}: {}", message.id, message.content);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod poller;
pub mod types;

#[cfg(test)]
mod test_util;

// Re-export main types at crate root
pub use client::{SyncApi, SyncClient};
pub use error::{ClientError, Result};
pub use poller::PollingClient;
pub use types::{Message, PollEvent, PollerConfig, PollerState, StatusSnapshot};
