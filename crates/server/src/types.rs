//! Server configuration.

use chatsync_types::constants::{DEFAULT_BINDING_ADDRESS, DEFAULT_SERVER_PORT};

/// Server configuration options.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Port to listen on (0 for auto-assign)
    pub port: u16,
    /// Host to bind to
    pub host: String,
}

impl ServerOptions {
    /// Socket address string in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
            host: DEFAULT_BINDING_ADDRESS.to_string(),
        }
    }
}
