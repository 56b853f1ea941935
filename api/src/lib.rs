//! HTTP surface: GitHub webhook intake and a health probe.

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use ai_llm_service::error_handler::env_opt;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::json_error_mapper::json_error_mapper,
    routes::{health_route::health_route, webhook::github_webhook_route::github_webhook_route},
};

/// Router with all routes and middleware, bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/github/webhook", post(github_webhook_route))
        .route("/health", get(health_route))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Builds the state from the environment and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let host_url = env_opt("API_ADDRESS").ok_or(AppError::MissingEnv("API_ADDRESS"))?;
    let state = AppState::from_env()?;

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
