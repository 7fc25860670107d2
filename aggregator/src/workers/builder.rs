//! Build worker: periodically rebuilds and publishes the device set
//!
//! One cycle runs at a time. A tick that comes due while a cycle is still
//! running is skipped, not queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::convert::ConfigConverter;
use crate::device::model::DeviceSet;
use crate::device::repository::DeviceRepository;
use crate::errors::AggregatorError;
use crate::metrics::BuildMetrics;
use crate::report::model::{BuildOutcome, Completion, Report};
use crate::report::repository::ReportRepository;
use crate::source::SourceProvider;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Build worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Time between two build starts
    pub interval: Duration,

    /// Upper bound for fetch plus conversion, disabled when `None`
    pub timeout: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            timeout: None,
        }
    }
}

/// Runs build cycles against the shared repositories
pub struct Builder {
    source: Arc<dyn SourceProvider>,
    converter: Arc<dyn ConfigConverter>,
    devices: Arc<DeviceRepository>,
    reports: Arc<ReportRepository>,
    metrics: Arc<dyn BuildMetrics>,
    timeout: Option<Duration>,
}

impl Builder {
    pub fn new(
        source: Arc<dyn SourceProvider>,
        converter: Arc<dyn ConfigConverter>,
        devices: Arc<DeviceRepository>,
        reports: Arc<ReportRepository>,
        metrics: Arc<dyn BuildMetrics>,
    ) -> Self {
        Self {
            source,
            converter,
            devices,
            reports,
            metrics,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one build cycle and return its completed report
    ///
    /// The device repository is only written when the whole build succeeded
    /// and `cancel` was not triggered.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Arc<Report> {
        let started = Instant::now();
        let handle = self.reports.record_start();
        info!("Build {} started", handle.id());

        let result = match self.build(cancel).await {
            // Last check before publishing
            Ok(_) if cancel.is_cancelled() => Err(AggregatorError::Cancelled),
            other => other,
        };
        let cancelled = matches!(result, Err(AggregatorError::Cancelled));

        let completion = match result {
            Ok(devices) => {
                let device_count = devices.len();
                self.devices.set(devices);
                Completion::Success { device_count }
            }
            Err(e) => Completion::Failed {
                error: e.to_string(),
            },
        };

        let report = self.reports.record_completion(handle, completion);

        match &report.outcome {
            BuildOutcome::Success { device_count } => {
                self.metrics.build_successful();
                self.metrics.set_built_devices(*device_count);
                info!(
                    "Build {} succeeded: {} devices in {:?}",
                    report.id,
                    device_count,
                    started.elapsed()
                );
            }
            BuildOutcome::Failed { error } if cancelled => {
                warn!("Build {} abandoned: {}", report.id, error);
            }
            BuildOutcome::Failed { error } => {
                self.metrics.build_failed();
                error!("Build {} failed after {:?}: {}", report.id, started.elapsed(), error);
            }
            BuildOutcome::Pending => {}
        }

        report
    }

    async fn build(&self, cancel: &CancellationToken) -> Result<DeviceSet, AggregatorError> {
        if cancel.is_cancelled() {
            return Err(AggregatorError::Cancelled);
        }

        match self.timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.fetch_and_convert(cancel)).await {
                    Ok(result) => result,
                    Err(_) => Err(AggregatorError::Timeout(timeout)),
                }
            }
            None => self.fetch_and_convert(cancel).await,
        }
    }

    /// Cancellation interrupts the fetch only; a conversion runs to completion
    /// on the blocking pool and is discarded by the pre-publish check.
    async fn fetch_and_convert(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DeviceSet, AggregatorError> {
        debug!("Fetching inventory from {}", self.source.describe());
        let inventory = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AggregatorError::Cancelled),
            result = self.source.fetch() => result?,
        };

        debug!("Converting {} inventory devices", inventory.devices.len());
        let converter = Arc::clone(&self.converter);
        let devices = tokio::task::spawn_blocking(move || converter.convert(&inventory))
            .await
            .map_err(|e| AggregatorError::Internal(e.to_string()))??;

        Ok(devices)
    }
}

/// Number of ticks that came due while a cycle of `elapsed` was running
pub fn missed_ticks(elapsed: Duration, interval: Duration) -> u64 {
    if interval.is_zero() {
        return 0;
    }
    (elapsed.as_nanos() / interval.as_nanos()) as u64
}

/// Run the build worker until `cancel` fires
pub async fn run(options: &Options, builder: &Builder, cancel: CancellationToken) {
    info!("Build worker starting, interval {:?}", options.interval);

    let period = options.interval.max(MIN_INTERVAL);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Build worker shutting down...");
                return;
            }
            _ = interval.tick() => {}
        }

        let started = Instant::now();
        builder.run_cycle(&cancel).await;

        let skipped = missed_ticks(started.elapsed(), period);
        if skipped > 0 {
            warn!(
                "Build took {:?}, longer than the {:?} interval: skipping {} tick(s)",
                started.elapsed(),
                period,
                skipped
            );
        }
    }
}
