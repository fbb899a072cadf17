//! In-memory message storage.
//!
//! Provides a thread-safe, append-only message log. Identifiers are assigned
//! under the write lock, so the log order is the order in which appends
//! acquired it.

use std::sync::Arc;

use chatsync_types::Message;
use parking_lot::RwLock;
use tracing::debug;

/// Append-only message log.
pub struct MessageStore {
    /// Messages in ascending id order
    messages: RwLock<Vec<Message>>,
}

impl MessageStore {
    /// Create a new empty message store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Append a message and return the identifier assigned to it.
    ///
    /// The first message gets id 1; every later one gets the previous
    /// highest id plus one.
    pub fn append(&self, content: impl Into<String>) -> u64 {
        let mut messages = self.messages.write();
        let id = messages.last().map(|m| m.id + 1).unwrap_or(1);
        messages.push(Message::new(id, content));
        drop(messages);

        debug!(id = id, "Appended message");
        id
    }

    /// Read every message with an id strictly greater than `cursor`, in
    /// ascending id order.
    pub fn fetch_since(&self, cursor: u64) -> Vec<Message> {
        let messages = self.messages.read();
        let start = messages.partition_point(|m| m.id <= cursor);
        messages[start..].to_vec()
    }

    /// Full history.
    pub fn all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    /// Number of messages appended so far.
    pub fn len(&self) -> u64 {
        self.messages.read().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Highest id assigned so far, 0 if the store is empty.
    pub fn last_id(&self) -> u64 {
        self.messages.read().last().map(|m| m.id).unwrap_or(0)
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }
}
