//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::AggregatorError;
use crate::server::auth::require_basic_auth;
use crate::server::handlers::{
    afk_enabled_handler, health_handler, last_complete_report_handler, last_report_handler,
    last_successful_report_handler, metrics_handler, openconfig_handler, version_handler,
};
use crate::server::state::ServerState;

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let protected = Router::new()
        // Devices
        .route("/v1/devices/{hostname}/afk_enabled", get(afk_enabled_handler))
        .route("/v1/devices/{hostname}/openconfig", get(openconfig_handler))
        // Reports
        .route("/v1/report/last", get(last_report_handler))
        .route("/v1/report/last/complete", get(last_complete_report_handler))
        .route("/v1/report/last/successful", get(last_successful_report_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ));

    Router::new()
        // Health, version and metrics
        .route("/api/health", get(health_handler))
        .route("/api/version", get(version_handler))
        .route("/metrics", get(metrics_handler))
        .merge(protected)
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), AggregatorError>>, AggregatorError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AggregatorError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| AggregatorError::ServerError(e.to_string()))
    });

    Ok(handle)
}
