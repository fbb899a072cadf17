use chatsync_server::{server::serve, AppState, ServerOptions};
use tokio::net::TcpListener;

/// Bind a server on an ephemeral port and return its base URL.
pub async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(ServerOptions::default());
    tokio::spawn(serve(listener, state, std::future::pending()));
    format!("http://{}", addr)
}
