//! chatsync sync server
//!
//! An append-only, in-memory message log exposed over plain request/response
//! HTTP. Clients poll for "everything after cursor X"; there is no push
//! transport.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatsync_server::{server, types::ServerOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let options = ServerOptions {
//!         port: 5000,
//!         host: "127.0.0.1".to_string(),
//!     };
//!
//!     server::start_server(options).await.unwrap();
//! }
//! ```
//!
//! # Protocol
//!
//! ## Posting a message
//!
//! ```text
//! POST /message HTTP/1.1
//! Content-Type: application/x-www-form-urlencoded
//!
//! message=hello
//!
//! Response: 200 OK
//! {"id":1}
//! ```
//!
//! ## Incremental fetch
//!
//! ```text
//! GET /messages/0 HTTP/1.1
//!
//! Response: 200 OK
//! {"messages":[{"id":1,"content":"hello"}]}
//! ```
//!
//! ## Presence and counters
//!
//! ```text
//! POST /user      -> {"user_count":1}
//! DELETE /user    -> {"user_count":0}
//! GET /status     -> {"user_count":0,"message_count":1,"status":"Ok!"}
//! ```

pub mod commands;
pub mod server;
pub mod store;
pub mod tracker;
pub mod types;

// Re-export commonly used items
pub use server::{create_router, start_server, AppState, ServerError};
pub use store::MessageStore;
pub use tracker::StatusTracker;
pub use types::ServerOptions;
