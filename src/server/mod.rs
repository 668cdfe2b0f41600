//! HTTP surface: an axum router over the classifier and the feedback store.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod routes;
pub mod state;

pub use state::AppState;

/// Builds the service router. Exposed separately from [`serve`] so tests
/// can drive it in-process.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/classify", post(routes::classify::classify))
        .route("/submit-feedback", post(routes::feedback::submit_feedback))
        .route("/feedback-stats", get(routes::feedback::feedback_stats))
        .route("/view-feedback", get(routes::feedback::view_feedback))
        .layer(cors)
        .with_state(state)
}

/// Binds `addr` and serves requests until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on {}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
