use std::io::BufRead;

use chatsync_sdk::{
    ClientError, PollEvent, PollerConfig, PollingClient, StatusSnapshot, SyncClient,
};
use chatsync_types::constants::{
    COMMAND_PREFIX, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SERVER_URL,
};
use console::style;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Failed to read stdin: {0}")]
    Stdin(#[from] std::io::Error),
}

/// Connection settings shared by the client commands
#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct ClientArgs {
    /// Base URL of the sync server
    #[arg(long, env = "CHATSYNC_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Wait between two polls, in milliseconds
    #[arg(long, env = "CHATSYNC_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Timeout for each HTTP call, in milliseconds
    #[arg(long, env = "CHATSYNC_REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,
}

impl ClientArgs {
    pub fn config(&self) -> PollerConfig {
        PollerConfig::new(self.server.clone())
            .with_poll_interval(self.poll_interval_ms)
            .with_request_timeout(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct ChatCommand {
    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct WatchCommand {
    #[command(flatten)]
    pub client: ClientArgs,
}

/// What a line typed by the user turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Sent to `POST /command`
    Command(&'a str),
    /// Sent to `POST /message`
    Message(&'a str),
    /// Blank line, ignored
    Blank,
}

impl<'a> Input<'a> {
    pub fn classify(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            Input::Blank
        } else if line.starts_with(COMMAND_PREFIX) {
            Input::Command(line.trim())
        } else {
            Input::Message(line)
        }
    }
}

fn status_line(status: &StatusSnapshot) -> String {
    format!(
        "Users Online: {} | Messages Sent: {}",
        status.user_count, status.message_count
    )
}

/// Print events until the poller closes the channel. Status lines are only
/// printed when the counters change.
fn spawn_printer(mut rx: mpsc::Receiver<PollEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_status: Option<StatusSnapshot> = None;
        while let Some(event) = rx.recv().await {
            match event {
                PollEvent::NewMessage(message) => println!("{}", message.content),
                PollEvent::StatusUpdate(status) => {
                    if last_status != Some(status) {
                        println!("{}", style(status_line(&status)).dim());
                        last_status = Some(status);
                    }
                }
            }
        }
    })
}

/// Forward stdin lines from a detached thread. The thread is never joined, so
/// a read still pending at exit does not hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

async fn forward(client: &SyncClient, line: &str) {
    match Input::classify(line) {
        Input::Blank => {}
        Input::Command(command) => match client.send_command(command).await {
            Ok(reply) => println!("{}", style(reply).cyan()),
            Err(e) => eprintln!("{} {}", style("Command failed:").red(), e),
        },
        Input::Message(text) => {
            if let Err(e) = client.send_message(text).await {
                eprintln!("{} {}", style("Message not sent:").red(), e);
            }
        }
    }
}

async fn print_banner(client: &SyncClient) {
    match client.welcome().await {
        Ok(banner) => println!("{}", style(banner).green()),
        Err(e) => warn!(endpoint = %client.endpoint(), error = %e, "Server not reachable yet"),
    }
}

impl ChatCommand {
    pub async fn execute(&self) -> Result<(), ChatError> {
        let config = self.client.config();
        let client = SyncClient::new(&config)?;

        print_banner(&client).await;
        println!(
            "{}",
            style("Type a message and press Enter. Lines starting with \\ are commands (\\help).")
                .dim()
        );

        match client.join().await {
            Ok(count) => debug!(user_count = count, "Joined"),
            Err(e) => warn!(error = %e, "Failed to join"),
        }

        let mut poller = PollingClient::new(config)?;
        let printer = spawn_printer(poller.start()?);

        let result = self.read_input(&client).await;

        poller.shutdown().await;
        let _ = printer.await;

        match client.leave().await {
            Ok(count) => debug!(user_count = count, "Left"),
            Err(e) => warn!(error = %e, "Failed to leave"),
        }

        result
    }

    /// Forward stdin lines until EOF or Ctrl-C
    async fn read_input(&self, client: &SyncClient) -> Result<(), ChatError> {
        let mut lines = spawn_stdin_reader();

        // One listener for the whole session, so a Ctrl-C during a send is kept
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let line = tokio::select! {
                line = lines.recv() => line.transpose()?,
                _ = &mut ctrl_c => None,
            };
            let Some(line) = line else {
                return Ok(());
            };

            tokio::select! {
                _ = forward(client, &line) => {}
                _ = &mut ctrl_c => return Ok(()),
            }
        }
    }
}

impl WatchCommand {
    pub async fn execute(&self) -> Result<(), ChatError> {
        let config = self.client.config();
        let client = SyncClient::new(&config)?;
        print_banner(&client).await;

        let mut poller = PollingClient::new(config)?;
        let printer = spawn_printer(poller.start()?);

        let _ = tokio::signal::ctrl_c().await;

        poller.shutdown().await;
        let _ = printer.await;
        Ok(())
    }
}
