//! API Server for Recon Board
//!
//! REST backend for the bug-bounty engagement tracker: project,
//! subdomain and vulnerability CRUD, plus the polling and trigger
//! endpoints of the background task engine.

mod routes;
mod state;

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,task_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine data directory
    let data_dir = std::env::var("RB_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".rb-data"));

    tracing::info!("Using data directory: {:?}", data_dir);

    let app_state = AppState::new(data_dir)
        .await
        .expect("Failed to initialize application state");

    if app_state.trigger_token().is_none() {
        tracing::warn!("RB_TRIGGER_TOKEN is not set; the task trigger endpoint will refuse all requests");
    }

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::project::router())
        .merge(routes::subdomain::router())
        .merge(routes::vulnerability::router())
        .merge(routes::task::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("RB_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8081);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("REST API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
