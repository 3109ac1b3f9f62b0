use std::path::Path;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod rooms;
pub mod state;
pub mod stroke_log;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handlers::{ping_handler, ws_handler};
use crate::state::AppState;
use crate::stroke_log::StrokeLog;

pub fn app(state: AppState, public_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/ping", get(ping_handler));
    let router = match public_dir {
        Some(dir) => {
            router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => router,
    };
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn serve(
    listener: TcpListener,
    state: AppState,
    public_dir: Option<&Path>,
) -> Result<(), ServerError> {
    axum::serve(listener, app(state, public_dir))
        .await
        .map_err(ServerError::Serve)
}

pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.addr,
            source,
        })?;
    info!(addr = %config.addr, public_dir = ?config.public_dir, "whiteboard listening");
    let state = AppState::new(StrokeLog::new());
    serve(listener, state, config.public_dir.as_deref()).await
}
