//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::app::state::AppState;
use crate::errors::AggregatorError;
use crate::metrics::BuildMetrics;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::utils::version_info;
use crate::workers::builder::{self, Builder};

/// Run the data aggregation API until `shutdown_signal` resolves
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AggregatorError> {
    info!("Initializing data aggregation API...");

    let cancel = CancellationToken::new();
    let mut shutdown_manager = ShutdownManager::new(cancel.clone(), options.lifecycle.clone());

    if let Err(e) = init(&options, &cancel, &mut shutdown_manager).await {
        error!("Failed to start the service: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    cancel: &CancellationToken,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), AggregatorError> {
    let app_state = AppState::init(&options.source)?;

    init_http_server(options, &app_state, cancel.child_token(), shutdown_manager).await?;
    init_build_worker(
        options.builder.clone(),
        &app_state,
        cancel.child_token(),
        shutdown_manager,
    )?;

    Ok(())
}

fn init_build_worker(
    options: builder::Options,
    app_state: &AppState,
    cancel: CancellationToken,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), AggregatorError> {
    info!("Initializing build worker...");

    let metrics: Arc<dyn BuildMetrics> = app_state.metrics.clone();
    let build_worker = Builder::new(
        app_state.source.clone(),
        app_state.converter.clone(),
        app_state.devices.clone(),
        app_state.reports.clone(),
        metrics,
    )
    .with_timeout(options.timeout);

    let handle = tokio::spawn(async move {
        builder::run(&options, &build_worker, cancel).await;
    });

    shutdown_manager.with_build_worker_handle(handle)
}

async fn init_http_server(
    options: &AppOptions,
    app_state: &AppState,
    cancel: CancellationToken,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), AggregatorError> {
    info!("Initializing HTTP server...");

    let server_state = ServerState::new(
        app_state.devices.clone(),
        app_state.reports.clone(),
        app_state.metrics.clone(),
        options.auth.clone(),
        version_info(),
    );

    let handle = serve(&options.server, Arc::new(server_state), async move {
        cancel.cancelled().await;
    })
    .await?;

    shutdown_manager.with_http_server_handle(handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    cancel: CancellationToken,
    lifecycle_options: LifecycleOptions,
    build_worker_handle: Option<JoinHandle<()>>,
    http_server_handle: Option<JoinHandle<Result<(), AggregatorError>>>,
}

impl ShutdownManager {
    fn new(cancel: CancellationToken, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            cancel,
            lifecycle_options,
            build_worker_handle: None,
            http_server_handle: None,
        }
    }

    fn with_build_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), AggregatorError> {
        if self.build_worker_handle.is_some() {
            return Err(AggregatorError::ShutdownError(
                "build_worker_handle already set".to_string(),
            ));
        }
        self.build_worker_handle = Some(handle);
        Ok(())
    }

    fn with_http_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), AggregatorError>>,
    ) -> Result<(), AggregatorError> {
        if self.http_server_handle.is_some() {
            return Err(AggregatorError::ShutdownError(
                "http_server_handle already set".to_string(),
            ));
        }
        self.http_server_handle = Some(handle);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), AggregatorError> {
        self.cancel.cancel();

        let max_delay = self.lifecycle_options.max_shutdown_delay;
        match tokio::time::timeout(max_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!("Shutdown timed out after {:?}", max_delay);
                Err(AggregatorError::ShutdownError(format!(
                    "timed out after {:?}",
                    max_delay
                )))
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), AggregatorError> {
        info!("Shutting down data aggregation API...");

        // 1. Build worker, may abandon an in-flight cycle
        if let Some(handle) = self.build_worker_handle.take() {
            handle
                .await
                .map_err(|e| AggregatorError::ShutdownError(e.to_string()))?;
        }

        // 2. HTTP server
        if let Some(handle) = self.http_server_handle.take() {
            handle
                .await
                .map_err(|e| AggregatorError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
