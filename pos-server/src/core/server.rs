//! HTTP server assembly

use axum::{
    Router,
    routing::{get, post, put},
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api;
use crate::core::ServerState;

/// Build the application router
///
/// Every route is a thin adapter over a core operation. The timeout layer
/// bounds each request; a transaction interrupted by it aborts on drop, so
/// a timed-out write never leaves partial rows behind.
pub fn router(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    Router::new()
        .route("/api/health", get(api::health::check))
        // orders
        .route("/api/orders", post(api::orders::create))
        .route("/api/orders/{id}", get(api::orders::get_by_id).put(api::orders::update))
        .route("/api/orders/{id}/status", put(api::orders::update_status))
        // tables
        .route("/api/tables", get(api::tables::list))
        .route("/api/tables/{id}/clear", post(api::tables::clear))
        // catalog
        .route(
            "/api/products",
            get(api::products::list).post(api::products::upsert),
        )
        // public submission + staff-facing external order surface
        .route("/api/public/orders", post(api::external_orders::submit))
        .route(
            "/api/external-orders/pending",
            get(api::external_orders::pending),
        )
        .route(
            "/api/external-orders/{id}/status",
            put(api::external_orders::update_status),
        )
        .route(
            "/api/external-orders/events",
            get(api::external_orders::events),
        )
        // reports
        .route("/api/reports/daily/{date}", get(api::reports::daily))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn run(state: ServerState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "pos-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
