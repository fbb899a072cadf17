//! Shared status counters.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chatsync_types::StatusSnapshot;
use tracing::debug;

use crate::store::MessageStore;

/// Active-user counter plus a view of the message count.
///
/// The user count moves only through [`StatusTracker::join`] and
/// [`StatusTracker::leave`] and has no lower bound. The message count is not
/// stored here; it is read from the [`MessageStore`] on every snapshot.
pub struct StatusTracker {
    users: AtomicI64,
    store: Arc<MessageStore>,
}

impl StatusTracker {
    pub fn new(store: Arc<MessageStore>) -> Arc<Self> {
        Arc::new(Self {
            users: AtomicI64::new(0),
            store,
        })
    }

    /// Register one more active user and return the new count.
    pub fn join(&self) -> i64 {
        let count = self.users.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(user_count = count, "User joined");
        count
    }

    /// Remove one active user and return the new count, which may be negative.
    pub fn leave(&self) -> i64 {
        let count = self.users.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(user_count = count, "User left");
        count
    }

    pub fn user_count(&self) -> i64 {
        self.users.load(Ordering::SeqCst)
    }

    /// Current counters. The two values are read one after the other, not
    /// under a common lock.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            user_count: self.user_count(),
            message_count: self.store.len(),
        }
    }
}
