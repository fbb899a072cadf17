//! Text commands answered with canned responses instead of being stored.

use chatsync_types::StatusSnapshot;
use chrono::Local;

pub const HELP_TEXT: &str = "Welcome to the messenger! Here are the available commands:\n\
\\help - Show this help message.\n\
\\anonymous - Send an anonymous message.\n\
\\stats - Show user and message statistics.\n\
\\time - Show the server time.";

pub const ANONYMOUS_TEXT: &str =
    "You are sending an anonymous message. Enter your message after the command.";

pub const UNKNOWN_TEXT: &str = "Unknown command. Type \\help for a list of available commands.";

/// Recognized command tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Anonymous,
    Stats,
    Time,
    Unknown,
}

impl Command {
    /// Match an exact command token. Anything else is [`Command::Unknown`].
    pub fn parse(token: &str) -> Self {
        match token {
            "\\help" => Command::Help,
            "\\anonymous" => Command::Anonymous,
            "\\stats" => Command::Stats,
            "\\time" => Command::Time,
            _ => Command::Unknown,
        }
    }
}

/// Answer a command. Never fails; unrecognized input gets the fallback text.
pub fn process(token: &str, status: StatusSnapshot) -> String {
    match Command::parse(token) {
        Command::Help => HELP_TEXT.to_string(),
        Command::Anonymous => ANONYMOUS_TEXT.to_string(),
        Command::Stats => format!(
            "Number of users: {}\nNumber of messages: {}",
            status.user_count, status.message_count
        ),
        Command::Time => format!("Current time: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
        Command::Unknown => UNKNOWN_TEXT.to_string(),
    }
}
