use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

mod handlers;
mod logic;
mod persistence;
mod state;
mod storage;

use crate::handlers::{archive_handler, canvas_handler, ping_handler, ws_handler};
use crate::persistence::{restore_latest, spawn_autosave};
use crate::state::{AppState, Relay};
use crate::storage::FileStorage;

const AUTOSAVE_PERIOD: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Where the latest canvas and archived snapshots are written.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let data_dir = args
        .data_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data"));
    if let Err(error) = tokio::fs::create_dir_all(&data_dir).await {
        tracing::warn!(%error, dir = %data_dir.display(), "failed to create data dir");
    }
    let storage = Arc::new(FileStorage::new(data_dir));
    let latest = restore_latest(storage.as_ref()).await;
    let state = AppState {
        relay: Arc::new(tokio::sync::RwLock::new(Relay::new(latest))),
        storage,
    };
    let _autosave = spawn_autosave(state.clone(), AUTOSAVE_PERIOD);

    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));

    let app = Router::new()
        .route("/ping", get(ping_handler))
        .route("/ws/listener", get(ws_handler))
        .route("/api/canvas", get(canvas_handler))
        .route("/api/canvas/archive", post(archive_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%port, "guessboard relay listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    axum::serve(listener, app).await.expect("Server crashed");
}
