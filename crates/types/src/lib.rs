//! Wire types shared by the chatsync server and its clients.
//!
//! Every response body is a single flat JSON object. Field order is the
//! declaration order below, so serialization is deterministic.

use serde::{Deserialize, Serialize};

pub mod constants;

/// A chat message as stored and served by the sync server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier assigned by the store, starting at 1
    pub id: u64,
    /// Message text, possibly empty
    pub content: String,
}

impl Message {
    pub fn new(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

/// Point-in-time view of the shared counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Joins minus leaves; not clamped, may be negative
    pub user_count: i64,
    /// Number of messages in the store
    pub message_count: u64,
}

/// `GET /` and `POST /command`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    pub message: String,
}

/// `GET /messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
    pub message_count: u64,
    pub user_count: i64,
}

/// `GET /messages/{cursor}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

/// `POST /message`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendResponse {
    pub id: u64,
}

/// `POST /user` and `DELETE /user`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCountResponse {
    pub user_count: i64,
}

/// `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub user_count: i64,
    pub message_count: u64,
    pub status: String,
}

impl StatusResponse {
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            user_count: self.user_count,
            message_count: self.message_count,
        }
    }
}

impl From<StatusSnapshot> for StatusResponse {
    fn from(snapshot: StatusSnapshot) -> Self {
        Self {
            user_count: snapshot.user_count,
            message_count: snapshot.message_count,
            status: constants::STATUS_OK.to_string(),
        }
    }
}

/// Form body of `POST /message`. A missing field reads as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub message: String,
}

/// Form body of `POST /command`. A missing field reads as an empty command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandForm {
    #[serde(default)]
    pub command: String,
}
