use chatsync_server::{start_server, ServerError, ServerOptions};
use chatsync_types::constants::{DEFAULT_BINDING_ADDRESS, DEFAULT_SERVER_PORT};
use console::style;

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, env = "CHATSYNC_HOST", default_value = DEFAULT_BINDING_ADDRESS)]
    pub host: String,

    /// Port to run the server on
    #[arg(long, env = "CHATSYNC_PORT", default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,
}

impl ServeCommand {
    pub async fn execute(&self) -> Result<(), ServerError> {
        println!();
        println!("{}{}", style("chat").white(), style("sync").green());
        println!(
            "{}",
            style(format!("Listening on http://{}:{}", self.host, self.port)).dim()
        );
        println!("{}", style("Press Ctrl+C to stop").dim());
        println!();

        start_server(ServerOptions {
            host: self.host.clone(),
            port: self.port,
        })
        .await
    }
}
