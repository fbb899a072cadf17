//! HTTP server exposing the message store and status counters.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::Method,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use chatsync_types::{
    constants::WELCOME_BANNER, AppendResponse, CommandForm, HistoryResponse, MessageForm,
    MessagesResponse, StatusResponse, TextResponse, UserCountResponse,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::{commands, store::MessageStore, tracker::StatusTracker, types::ServerOptions};

/// Error types for server start-up.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MessageStore>,
    pub tracker: Arc<StatusTracker>,
    pub options: ServerOptions,
}

impl AppState {
    /// Fresh, empty state.
    pub fn new(options: ServerOptions) -> Self {
        let store = MessageStore::new();
        let tracker = StatusTracker::new(store.clone());
        Self {
            store,
            tracker,
            options,
        }
    }
}

/// Create the router with all chat endpoints.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_welcome))
        .route("/messages", get(handle_history))
        .route("/messages/{cursor}", get(handle_fetch_since))
        .route("/message", post(handle_append))
        .route("/user", post(handle_join).delete(handle_leave))
        .route("/status", get(handle_status))
        .route("/command", post(handle_command))
        .layer(cors)
        .with_state(state)
}

/// GET / - Welcome banner
async fn handle_welcome() -> Json<TextResponse> {
    Json(TextResponse {
        message: WELCOME_BANNER.to_string(),
    })
}

/// GET /messages - Full history with counters
async fn handle_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let messages = state.store.all();
    Json(HistoryResponse {
        message_count: messages.len() as u64,
        user_count: state.tracker.user_count(),
        messages,
    })
}

/// GET /messages/{cursor} - Messages with id > cursor
async fn handle_fetch_since(
    State(state): State<AppState>,
    Path(cursor): Path<u64>,
) -> Json<MessagesResponse> {
    let messages = state.store.fetch_since(cursor);
    debug!(cursor = cursor, count = messages.len(), "Fetched messages");
    Json(MessagesResponse { messages })
}

/// POST /message - Append a message
///
/// A missing field or an unreadable form body is stored as an empty message.
async fn handle_append(
    State(state): State<AppState>,
    form: Result<Form<MessageForm>, FormRejection>,
) -> Json<AppendResponse> {
    let content = form.map(|Form(f)| f.message).unwrap_or_default();
    let id = state.store.append(content);
    Json(AppendResponse { id })
}

/// POST /user - Join
async fn handle_join(State(state): State<AppState>) -> Json<UserCountResponse> {
    Json(UserCountResponse {
        user_count: state.tracker.join(),
    })
}

/// DELETE /user - Leave
async fn handle_leave(State(state): State<AppState>) -> Json<UserCountResponse> {
    Json(UserCountResponse {
        user_count: state.tracker.leave(),
    })
}

/// GET /status - Counters
async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::from(state.tracker.status()))
}

/// POST /command - Canned command responses
async fn handle_command(
    State(state): State<AppState>,
    form: Result<Form<CommandForm>, FormRejection>,
) -> Json<TextResponse> {
    let command = form.map(|Form(f)| f.command).unwrap_or_default();
    debug!(command = %command, "Processing command");
    Json(TextResponse {
        message: commands::process(&command, state.tracker.status()),
    })
}

/// Serve `state` on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Start the server and run until Ctrl-C.
pub async fn start_server(options: ServerOptions) -> Result<(), ServerError> {
    let addr = options.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("Starting chatsync server on {}", addr);

    let state = AppState::new(options);
    serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await
}
