use std::{any::Any, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use shared::error::ApiError;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod push;

use app_state::AppState;
use config::load_settings;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings()?;
    let state = AppState::from_settings(&settings);
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, mode = ?settings.notify_mode, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/current-slide",
            get(api::get_current_slide).post(api::set_current_slide),
        )
        .route("/elements", get(api::list_elements).post(api::save_element))
        .route(
            "/elements/:element_id",
            get(api::get_element).delete(api::delete_element),
        )
        .route("/responses", post(api::submit_response))
        .route("/responses/:element_id", get(api::list_responses))
        .route("/results/:element_id", get(api::get_results))
        .route("/admin/responses", delete(api::clear_responses))
        .route("/admin/clear-responses", post(api::clear_responses))
        .route("/events", get(push::sse_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let router = Router::new()
        .route("/health", get(api::health))
        .route("/admin", get(api::admin_view))
        .route("/ws", get(push::ws_handler))
        .nest("/api", api)
        .fallback(api::not_found);

    guard_panics(router).with_state(state)
}

fn guard_panics<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(CatchPanicLayer::custom(internal_fault))
}

fn internal_fault(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::internal("internal server error")),
    )
        .into_response()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
