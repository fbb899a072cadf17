use std::{path::Path, process};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod chat;
mod serve;

#[derive(Parser, Debug)]
#[clap(author, version, about = "chatsync - polling chat server and terminal client", long_about = None)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Start the sync server
    Serve(serve::ServeCommand),
    /// Join the chat: print incoming messages and send lines typed on stdin
    Chat(chat::ChatCommand),
    /// Print incoming messages without joining or sending
    Watch(chat::WatchCommand),
}

impl Command {
    /// Log level used when RUST_LOG is not set. Client commands stay quiet so
    /// that logs do not bury the transcript.
    fn default_log_level(&self) -> &'static str {
        match self {
            Command::Serve(_) => "info",
            Command::Chat(_) | Command::Watch(_) => "warn",
        }
    }
}

#[tokio::main]
async fn main() {
    // Environment first so that clap's `env` fallbacks can see .env values
    load_env_file(Path::new("."));

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            process::exit(e.exit_code());
        }
    };

    init_tracing(opts.command.default_log_level());

    if let Err(e) = handle_command(opts).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the fmt subscriber, writing to stderr
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load environment variables from a .env file in the given directory
fn load_env_file(dir: &Path) {
    let env_file_path = dir.join(".env");

    match dotenvy::from_path(&env_file_path) {
        Ok(_) => {}
        Err(e) if e.not_found() => {
            // .env file not found is fine, just continue silently
        }
        Err(e) => {
            eprintln!(
                "Warning: Failed to load .env file at {}: {}",
                env_file_path.display(),
                e
            );
        }
    }
}

async fn handle_command(opts: Opts) -> Result<(), String> {
    match opts.command {
        Command::Serve(cmd) => cmd.execute().await.map_err(|e| e.to_string()),
        Command::Chat(cmd) => cmd.execute().await.map_err(|e| e.to_string()),
        Command::Watch(cmd) => cmd.execute().await.map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let opts = Opts::try_parse_from(["chatsync", "serve"]).unwrap();
        match opts.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.port, 5000);
                assert_eq!(cmd.host, "0.0.0.0");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_chat_flags() {
        let opts = Opts::try_parse_from([
            "chatsync",
            "chat",
            "--server",
            "http://10.0.0.2:5000",
            "--poll-interval-ms",
            "250",
        ])
        .unwrap();
        match opts.command {
            Command::Chat(cmd) => {
                let config = cmd.client.config();
                assert_eq!(config.endpoint, "http://10.0.0.2:5000");
                assert_eq!(config.poll_interval_ms, 250);
                assert_eq!(config.request_timeout_ms, 10_000);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_default_log_levels() {
        let serve = Opts::try_parse_from(["chatsync", "serve"]).unwrap();
        assert_eq!(serve.command.default_log_level(), "info");
        let watch = Opts::try_parse_from(["chatsync", "watch"]).unwrap();
        assert_eq!(watch.command.default_log_level(), "warn");
    }
}
