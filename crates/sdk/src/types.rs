use std::time::Duration;

pub use chatsync_types::{Message, StatusSnapshot};
use chatsync_types::constants::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SERVER_URL,
};

/// Event emitted by the polling loop to its consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// A message not seen before by this client, delivered in ascending id order
    NewMessage(Message),

    /// Counters fetched at the end of a successful cycle
    StatusUpdate(StatusSnapshot),
}

/// Lifecycle of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Created, not started
    Idle,

    /// Fetch in flight
    Polling,

    /// Emitting a fetched batch and its status
    Delivering,

    /// Waiting for the next cycle
    Sleeping,

    /// Stop observed, winding down
    Stopping,

    /// Loop exited
    Stopped,
}

impl std::fmt::Display for PollerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollerState::Idle => write!(f, "idle"),
            PollerState::Polling => write!(f, "polling"),
            PollerState::Delivering => write!(f, "delivering"),
            PollerState::Sleeping => write!(f, "sleeping"),
            PollerState::Stopping => write!(f, "stopping"),
            PollerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Configuration for the HTTP client and the polling loop
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Base URL of the sync server
    pub endpoint: String,

    /// Wait between two cycles (milliseconds). Also the retry delay after a failure.
    pub poll_interval_ms: u64,

    /// Upper bound on a single HTTP call (milliseconds)
    pub request_timeout_ms: u64,

    /// Capacity of the event channel handed to the consumer
    pub event_buffer: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SERVER_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            event_buffer: 256,
        }
    }
}

impl PollerConfig {
    /// Create a new configuration with the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the polling interval
    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Set the event channel capacity
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
