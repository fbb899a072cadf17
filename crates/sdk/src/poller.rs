use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    client::{SyncApi, SyncClient},
    error::{ClientError, Result},
    types::{PollEvent, PollerConfig, PollerState},
};

/// Background loop that turns repeated `fetch_since` calls into a stream of
/// [`PollEvent`]s.
///
/// Each cycle fetches everything after the local cursor, emits the messages
/// in order, advances the cursor, fetches the counters and emits them, then
/// sleeps for the configured interval. A failed fetch emits nothing, leaves
/// the cursor where it was and waits for the next cycle. There is no retry
/// limit.
///
/// The cursor starts at 0, so a fresh poller replays the full history.
///
/// Stopping is cooperative: the stop flag is read at the top of every cycle
/// and also ends the sleep early. A stop raised while a request is in flight
/// takes effect once that request completes or hits the request timeout, so
/// the worst-case latency is one interval plus one request timeout.
///
/// # Example
///
/// ```ignore
/// use chatsync_sdk::{PollerConfig, PollingClient, PollEvent};
///
/// let config = PollerConfig::new("http://127.0.0.1:5000").with_poll_interval(1_000);
/// let mut poller = PollingClient::new(config)?;
/// let mut rx = poller.start()?;
///
/// while let Some(event) = rx.recv().await {
///     match event {
///         PollEvent::NewMessage(message) => println!("{}", message.content),
///         PollEvent::StatusUpdate(status) => println!("{} online", status.user_count),
///     }
/// }
/// ```
pub struct PollingClient<A: SyncApi = SyncClient> {
    /// Transport
    api: Arc<A>,

    /// Configuration
    config: PollerConfig,

    /// Loop state, written by the loop task only
    state: Arc<RwLock<PollerState>>,

    /// Stop flag
    stop_tx: Option<watch::Sender<bool>>,

    /// Loop task; resolves to the final cursor
    handle: Option<JoinHandle<u64>>,
}

impl PollingClient<SyncClient> {
    /// Create a poller talking HTTP to `config.endpoint`
    pub fn new(config: PollerConfig) -> Result<Self> {
        let api = SyncClient::new(&config)?;
        Ok(Self::with_api(Arc::new(api), config))
    }
}

impl<A: SyncApi> PollingClient<A> {
    /// Create a poller over an existing transport
    pub fn with_api(api: Arc<A>, config: PollerConfig) -> Self {
        Self {
            api,
            config,
            state: Arc::new(RwLock::new(PollerState::Idle)),
            stop_tx: None,
            handle: None,
        }
    }

    /// Get the current loop state
    pub fn state(&self) -> PollerState {
        *self.state.read()
    }

    /// Spawn the loop and return the receiving end of its event channel.
    ///
    /// Can be called once per poller.
    pub fn start(&mut self) -> Result<mpsc::Receiver<PollEvent>> {
        if self.handle.is_some() {
            return Err(ClientError::AlreadyStarted);
        }

        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer);
        let (stop_tx, stop_rx) = watch::channel(false);
        self.stop_tx = Some(stop_tx);

        info!(
            interval_ms = self.config.poll_interval_ms,
            timeout_ms = self.config.request_timeout_ms,
            "Starting polling loop"
        );

        self.handle = Some(tokio::spawn(Self::run_loop(
            Arc::clone(&self.api),
            self.config.poll_interval(),
            Arc::clone(&self.state),
            event_tx,
            stop_rx,
        )));

        Ok(event_rx)
    }

    /// Raise the stop flag without waiting for the loop to exit
    pub fn stop(&self) {
        if let Some(tx) = &self.stop_tx {
            let _ = tx.send(true);
        }
    }

    /// Raise the stop flag and wait for the loop to exit.
    ///
    /// Returns the cursor the loop ended with, or `None` if it was never
    /// started.
    pub async fn shutdown(&mut self) -> Option<u64> {
        self.stop();
        let handle = self.handle.take()?;
        match handle.await {
            Ok(cursor) => Some(cursor),
            Err(e) => {
                warn!(error = %e, "Polling task did not exit cleanly");
                None
            }
        }
    }

    async fn run_loop(
        api: Arc<A>,
        interval: Duration,
        state: Arc<RwLock<PollerState>>,
        event_tx: mpsc::Sender<PollEvent>,
        mut stop_rx: watch::Receiver<bool>,
    ) -> u64 {
        let set_state = |new_state: PollerState| {
            *state.write() = new_state;
        };

        let mut cursor: u64 = 0;

        'cycle: loop {
            let stop_requested = *stop_rx.borrow();
            if stop_requested {
                info!(cursor = cursor, "Stop requested");
                break;
            }

            set_state(PollerState::Polling);
            match api.fetch_since(cursor).await {
                Ok(messages) => {
                    set_state(PollerState::Delivering);
                    debug!(cursor = cursor, count = messages.len(), "Fetched messages");

                    for message in messages {
                        if message.id <= cursor {
                            debug!(
                                id = message.id,
                                cursor = cursor,
                                "Skipping delivered message"
                            );
                            continue;
                        }
                        let id = message.id;
                        if event_tx.send(PollEvent::NewMessage(message)).await.is_err() {
                            info!("Event receiver dropped");
                            break 'cycle;
                        }
                        cursor = id;
                    }

                    match api.status().await {
                        Ok(status) => {
                            if event_tx.send(PollEvent::StatusUpdate(status)).await.is_err() {
                                info!("Event receiver dropped");
                                break 'cycle;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Status request failed");
                        }
                    }
                }
                Err(e) => {
                    warn!(cursor = cursor, error = %e, "Fetch failed, retrying after interval");
                }
            }

            set_state(PollerState::Sleeping);
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = stop_rx.changed() => {
                    if changed.is_err() {
                        info!("Poller handle dropped");
                        break 'cycle;
                    }
                }
            }
        }

        set_state(PollerState::Stopping);
        drop(event_tx);
        set_state(PollerState::Stopped);
        info!(cursor = cursor, "Polling loop stopped");
        cursor
    }
}

impl<A: SyncApi> Drop for PollingClient<A> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chatsync_types::{Message, StatusSnapshot};
    use parking_lot::Mutex;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;
    use crate::{client::SyncClient, test_util::spawn_server};

    /// In-process transport that records the cursors it was asked for.
    #[derive(Default)]
    struct FakeApi {
        messages: Mutex<Vec<Message>>,
        users: Mutex<i64>,
        requested: Mutex<Vec<u64>>,
        fetch_attempts: AtomicUsize,
        fail_fetch: AtomicBool,
        fail_status: AtomicBool,
    }

    impl FakeApi {
        fn push(&self, content: &str) {
            let mut messages = self.messages.lock();
            let id = messages.len() as u64 + 1;
            messages.push(Message::new(id, content));
        }
    }

    impl SyncApi for FakeApi {
        async fn fetch_since(&self, cursor: u64) -> Result<Vec<Message>> {
            self.fetch_attempts.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().push(cursor);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(ClientError::Status {
                    status: 503,
                    path: format!("/messages/{}", cursor),
                });
            }
            Ok(self
                .messages
                .lock()
                .iter()
                .filter(|m| m.id > cursor)
                .cloned()
                .collect())
        }

        async fn status(&self) -> Result<StatusSnapshot> {
            if self.fail_status.load(Ordering::SeqCst) {
                return Err(ClientError::Status {
                    status: 503,
                    path: "/status".to_string(),
                });
            }
            Ok(StatusSnapshot {
                user_count: *self.users.lock(),
                message_count: self.messages.lock().len() as u64,
            })
        }
    }

    fn poller(api: &Arc<FakeApi>, interval_ms: u64) -> PollingClient<FakeApi> {
        PollingClient::with_api(
            Arc::clone(api),
            PollerConfig::new("http://fake").with_poll_interval(interval_ms),
        )
    }

    #[tokio::test]
    async fn test_delivers_history_then_status_in_order() {
        let api = Arc::new(FakeApi::default());
        api.push("one");
        api.push("two");
        *api.users.lock() = 3;

        let mut poller = poller(&api, 3_600_000);
        assert_eq!(poller.state(), PollerState::Idle);
        let mut rx = poller.start().unwrap();

        assert_eq!(rx.recv().await, Some(PollEvent::NewMessage(Message::new(1, "one"))));
        assert_eq!(rx.recv().await, Some(PollEvent::NewMessage(Message::new(2, "two"))));
        assert_eq!(
            rx.recv().await,
            Some(PollEvent::StatusUpdate(StatusSnapshot {
                user_count: 3,
                message_count: 2
            }))
        );

        assert_eq!(poller.shutdown().await, Some(2));
        assert_eq!(poller.state(), PollerState::Stopped);
        assert_eq!(*api.requested.lock(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_advances_between_cycles() {
        let api = Arc::new(FakeApi::default());
        api.push("one");

        let mut poller = poller(&api, 1_000);
        let mut rx = poller.start().unwrap();

        assert_eq!(rx.recv().await, Some(PollEvent::NewMessage(Message::new(1, "one"))));
        assert!(matches!(rx.recv().await, Some(PollEvent::StatusUpdate(_))));

        api.push("two");

        // Next cycle only sees the new message
        assert_eq!(rx.recv().await, Some(PollEvent::NewMessage(Message::new(2, "two"))));
        assert!(matches!(rx.recv().await, Some(PollEvent::StatusUpdate(_))));

        // Idle cycle: status only
        assert!(matches!(rx.recv().await, Some(PollEvent::StatusUpdate(_))));

        assert_eq!(poller.shutdown().await, Some(2));
        assert_eq!(&api.requested.lock()[..3], &[0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_retry_forever_without_emitting() {
        let api = Arc::new(FakeApi::default());
        api.push("unseen");
        api.fail_fetch.store(true, Ordering::SeqCst);

        let mut poller = poller(&api, 5_000);
        let mut rx = poller.start().unwrap();

        tokio::time::sleep(Duration::from_millis(5_000 * 3 + 500)).await;

        // Attempts at t = 0, 5, 10 and 15 s
        assert_eq!(api.fetch_attempts.load(Ordering::SeqCst), 4);
        assert!(api.requested.lock().iter().all(|&c| c == 0));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_ne!(poller.state(), PollerState::Stopped);

        assert_eq!(poller.shutdown().await, Some(0));
        let attempts = api.fetch_attempts.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(5_000 * 2)).await;
        assert_eq!(api.fetch_attempts.load(Ordering::SeqCst), attempts);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_failures() {
        let api = Arc::new(FakeApi::default());
        api.push("late");
        api.fail_fetch.store(true, Ordering::SeqCst);

        let mut poller = poller(&api, 1_000);
        let mut rx = poller.start().unwrap();

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        api.fail_fetch.store(false, Ordering::SeqCst);

        assert_eq!(rx.recv().await, Some(PollEvent::NewMessage(Message::new(1, "late"))));
        assert_eq!(poller.shutdown().await, Some(1));
    }

    #[tokio::test]
    async fn test_status_failure_skips_status_event() {
        let api = Arc::new(FakeApi::default());
        api.push("one");
        api.fail_status.store(true, Ordering::SeqCst);

        let mut poller = poller(&api, 3_600_000);
        let mut rx = poller.start().unwrap();

        assert_eq!(rx.recv().await, Some(PollEvent::NewMessage(Message::new(1, "one"))));
        assert_eq!(poller.shutdown().await, Some(1));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_stop_cuts_sleep_short() {
        let api = Arc::new(FakeApi::default());
        let mut poller = poller(&api, 3_600_000);
        let mut rx = poller.start().unwrap();

        assert!(matches!(rx.recv().await, Some(PollEvent::StatusUpdate(_))));

        let cursor = tokio::time::timeout(Duration::from_secs(5), poller.shutdown())
            .await
            .unwrap();
        assert_eq!(cursor, Some(0));
        assert_eq!(api.fetch_attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_loop() {
        let api = Arc::new(FakeApi::default());
        api.push("one");
        api.push("two");

        let mut poller = poller(&api, 10);
        let rx = poller.start().unwrap();
        drop(rx);

        let cursor = tokio::time::timeout(Duration::from_secs(5), async {
            let handle = poller.handle.take().unwrap();
            handle.await.unwrap()
        })
        .await
        .unwrap();
        assert_eq!(cursor, 0);
        assert_eq!(poller.state(), PollerState::Stopped);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let api = Arc::new(FakeApi::default());
        let mut poller = poller(&api, 3_600_000);
        let _rx = poller.start().unwrap();
        assert!(matches!(poller.start(), Err(ClientError::AlreadyStarted)));
        poller.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_before_start() {
        let api = Arc::new(FakeApi::default());
        let mut poller = poller(&api, 1_000);
        assert_eq!(poller.shutdown().await, None);
        assert_eq!(poller.state(), PollerState::Idle);
    }

    #[tokio::test]
    async fn test_polls_real_server() {
        let endpoint = spawn_server().await;
        let sender = SyncClient::new(&PollerConfig::new(endpoint.clone())).unwrap();
        sender.send_message("hello").await.unwrap();
        sender.join().await.unwrap();

        let mut poller =
            PollingClient::new(PollerConfig::new(endpoint).with_poll_interval(50)).unwrap();
        let mut rx = poller.start().unwrap();

        assert_eq!(rx.recv().await, Some(PollEvent::NewMessage(Message::new(1, "hello"))));
        assert_eq!(
            rx.recv().await,
            Some(PollEvent::StatusUpdate(StatusSnapshot {
                user_count: 1,
                message_count: 1
            }))
        );

        sender.send_message("world").await.unwrap();
        loop {
            match rx.recv().await {
                Some(PollEvent::NewMessage(message)) => {
                    assert_eq!(message, Message::new(2, "world"));
                    break;
                }
                Some(PollEvent::StatusUpdate(_)) => continue,
                None => panic!("poller stopped early"),
            }
        }

        assert_eq!(poller.shutdown().await, Some(2));
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_polling() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = PollerConfig::new(format!("http://{}", addr))
            .with_poll_interval(20)
            .with_request_timeout(200);
        let mut poller = PollingClient::new(config).unwrap();
        let mut rx = poller.start().unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_ne!(poller.state(), PollerState::Stopped);

        assert_eq!(poller.shutdown().await, Some(0));
        assert_eq!(poller.state(), PollerState::Stopped);
    }
}
