//! # HTTP Server
//!
//! Serves the generator page and runs one controller per browser session.
//!
//! ## Usage
//!
//! ```bash
//! qrgen serve --listen 0.0.0.0:8080
//! ```
//!
//! Then open http://localhost:8080 in a browser.

mod handlers;
mod session;
mod state;
mod static_files;

pub use state::ServerConfig;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::QrGenError;
use state::{AppState, SESSION_EXPIRATION_SECS};

/// Upload limit for logos. Above the logo size limit so oversized files
/// reach validation and get a proper notification.
const UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

/// Build the application router.
fn router(config: ServerConfig) -> (Router, Arc<AppState>) {
    let app_state = Arc::new(AppState::new(config));

    let app = Router::new()
        // Frontend
        .route("/", get(static_files::index))
        .route("/assets/*path", get(static_files::asset))
        // Styles API
        .route("/api/styles", get(handlers::styles::list))
        // Session API
        .route("/api/sessions", post(handlers::session::create))
        .route("/api/sessions/:id", get(handlers::session::show))
        .route("/api/sessions/:id/text", post(handlers::session::text))
        .route("/api/sessions/:id/style", post(handlers::session::select_style))
        .route(
            "/api/sessions/:id/logo",
            post(handlers::session::logo).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route("/api/sessions/:id/generate", post(handlers::session::generate))
        .route("/api/sessions/:id/key", post(handlers::session::key))
        .route("/api/sessions/:id/preview", get(handlers::session::preview))
        .route("/api/sessions/:id/download", post(handlers::session::download))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state.clone());

    (app, app_state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use qrgen::config::GeneratorConfig;
/// use qrgen::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), qrgen::error::QrGenError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     generator: GeneratorConfig::default(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), QrGenError> {
    let listen_addr = config.listen_addr.clone();
    let (app, app_state) = router(config);

    // Spawn background session cleanup task
    tokio::spawn(cleanup_sessions(app_state));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| QrGenError::Transport(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    info!(addr = %listen_addr, "qrgen HTTP server listening");
    info!("open http://{}/ in your browser", listen_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| QrGenError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

/// Background task dropping idle sessions, which also stops their tasks.
async fn cleanup_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    let expiration = Duration::from_secs(SESSION_EXPIRATION_SECS);

    loop {
        interval.tick().await;
        let now = Instant::now();

        let mut sessions = state.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, v| now.duration_since(v.last_accessed) < expiration);
        let after = sessions.len();
        if before != after {
            info!(
                expired = before - after,
                remaining = after,
                "cleaned up expired sessions"
            );
        }
    }
}
