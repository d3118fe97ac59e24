//! Farcaster frame server for curating casts.
//!
//! Users open the Curate cast action on a cast, leave a short commentary, and
//! the curation is stored in Redis alongside the cast author's profile.
//!
//!
//!
//! # Routes
//! - `GET|POST /api/curate-frame`: prompt for commentary, then store the curation
//! - `GET|POST /api/install-curate`: frame offering to install the cast action
//! - `GET|POST /api/curate-test`: fixed card for checking frame rendering
//! - `GET /api/add-curate-action`: cast action metadata
//! - `POST /api/add-curate-action`: cast action, answers with the curate frame
//! - `GET /health`
//!
//!
//!
//! # External Services
//!
//! ## Neynar
//! Profile lookups by fid, see [`profile`]. One round trip per lookup, no cache.
//!
//! ## Redis
//! Curation ids and records, see [`database`]. Any Redis-compatible store works.
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! NEYNAR_HUB=... NEYNAR_API=... RUST_LOG=info cargo run
//! ```
//!
//! Run without Redis.
//! ```sh
//! NEYNAR_HUB=... CURATION_STORE=memory RUST_LOG=info cargo run
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod curate;
pub mod database;
pub mod error;
pub mod frame;
pub mod models;
pub mod profile;
pub mod routes;
pub mod state;
pub mod utils;
pub mod views;

use config::Config;
use routes::{
    action_metadata_handler, curate_action_handler, curate_frame_handler, health_handler,
    install_frame_handler, test_frame_handler,
};
use state::{AppState, CURATE_ACTION_PATH, CURATE_FRAME_PATH, INSTALL_FRAME_PATH, TEST_FRAME_PATH};

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            CURATE_FRAME_PATH,
            get(curate_frame_handler).post(curate_frame_handler),
        )
        .route(
            INSTALL_FRAME_PATH,
            get(install_frame_handler).post(install_frame_handler),
        )
        .route(
            TEST_FRAME_PATH,
            get(test_frame_handler).post(test_frame_handler),
        )
        .route(
            CURATE_ACTION_PATH,
            get(action_metadata_handler).post(curate_action_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let app = app(state.clone());

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}, public at {}", state.config.public_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
