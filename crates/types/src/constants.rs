/// Default binding address for the sync server
pub const DEFAULT_BINDING_ADDRESS: &str = "0.0.0.0";

/// Default port for the sync server
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default server URL used by clients
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Default wait between two polling cycles (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Default upper bound on a single HTTP call made by a client (milliseconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Value of the `status` field returned by `GET /status`
pub const STATUS_OK: &str = "Ok!";

/// Banner returned by `GET /`
pub const WELCOME_BANNER: &str = "Welcome to the chatsync messenger!";

/// Prefix marking a line of user input as a command rather than chat text
pub const COMMAND_PREFIX: char = '\\';
