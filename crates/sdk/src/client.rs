use std::future::Future;

use chatsync_types::{
    AppendResponse, CommandForm, HistoryResponse, Message, MessageForm, MessagesResponse,
    StatusResponse, StatusSnapshot, TextResponse, UserCountResponse,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::{ClientError, Result},
    types::PollerConfig,
};

/// The two calls the polling loop needs from a server.
///
/// [`SyncClient`] implements this over HTTP. The loop is generic over it so
/// that it can be driven by any transport.
pub trait SyncApi: Send + Sync + 'static {
    /// Messages with an id strictly greater than `cursor`, ascending.
    fn fetch_since(&self, cursor: u64) -> impl Future<Output = Result<Vec<Message>>> + Send;

    /// Current counters.
    fn status(&self) -> impl Future<Output = Result<StatusSnapshot>> + Send;
}

/// HTTP client for the chatsync server.
///
/// Every call is a single request with the configured timeout; nothing is
/// retried here.
#[derive(Debug, Clone)]
pub struct SyncClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl SyncClient {
    pub fn new(config: &PollerConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http_client.get(self.url(path)).send().await?;
        Self::decode(response, path).await
    }

    /// `GET /` - welcome banner
    pub async fn welcome(&self) -> Result<String> {
        let response: TextResponse = self.get("/").await?;
        Ok(response.message)
    }

    /// `GET /messages` - full history with counters
    pub async fn history(&self) -> Result<HistoryResponse> {
        self.get("/messages").await
    }

    /// `POST /message` - append a message, returning its id
    pub async fn send_message(&self, content: &str) -> Result<u64> {
        let path = "/message";
        let response = self
            .http_client
            .post(self.url(path))
            .form(&MessageForm {
                message: content.to_string(),
            })
            .send()
            .await?;
        let appended: AppendResponse = Self::decode(response, path).await?;
        debug!(id = appended.id, "Message sent");
        Ok(appended.id)
    }

    /// `POST /command` - canned response for a command token
    pub async fn send_command(&self, command: &str) -> Result<String> {
        let path = "/command";
        let response = self
            .http_client
            .post(self.url(path))
            .form(&CommandForm {
                command: command.to_string(),
            })
            .send()
            .await?;
        let reply: TextResponse = Self::decode(response, path).await?;
        Ok(reply.message)
    }

    /// `POST /user` - join, returning the new user count
    pub async fn join(&self) -> Result<i64> {
        let path = "/user";
        let response = self.http_client.post(self.url(path)).send().await?;
        let count: UserCountResponse = Self::decode(response, path).await?;
        Ok(count.user_count)
    }

    /// `DELETE /user` - leave, returning the new user count
    pub async fn leave(&self) -> Result<i64> {
        let path = "/user";
        let response = self.http_client.delete(self.url(path)).send().await?;
        let count: UserCountResponse = Self::decode(response, path).await?;
        Ok(count.user_count)
    }
}

impl SyncApi for SyncClient {
    async fn fetch_since(&self, cursor: u64) -> Result<Vec<Message>> {
        let response: MessagesResponse = self.get(&format!("/messages/{}", cursor)).await?;
        Ok(response.messages)
    }

    async fn status(&self) -> Result<StatusSnapshot> {
        let response: StatusResponse = self.get("/status").await?;
        Ok(response.snapshot())
    }
}
