//! # HTTP Server for Card Rendering
//!
//! Exposes the compositor to the admin campaign tool.
//!
//! ## Usage
//!
//! ```bash
//! cartolina serve --listen 0.0.0.0:8080 --base-url https://example.com
//! ```
//!
//! ## Routes
//!
//! - `POST /api/card/render`: PNG attachment download
//! - `POST /api/card/preview`: JSON with a Base64 data URL
//! - `GET /health`: liveness

mod handlers;
pub mod state;

pub use state::{RenderConfig, ServerConfig};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::CartolinaError;
use state::AppState;

/// Start the HTTP server.
pub async fn serve(config: ServerConfig) -> Result<(), CartolinaError> {
    let app_state = Arc::new(AppState::new(config.clone()));

    let app = Router::new()
        .route("/api/card/render", post(handlers::card::render))
        .route("/api/card/preview", post(handlers::card::preview))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        // Requests are small JSON bodies; renders are returned, not uploaded
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(app_state);

    tracing::info!(
        listen = %config.listen_addr,
        base_url = %config.render.base_url,
        assets = ?config.render.assets,
        "cartolina server starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
