//! Build metrics

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, TextEncoder};

use crate::errors::AggregatorError;

/// Sink for build cycle metrics
pub trait BuildMetrics: Send + Sync {
    /// Record a successful build
    fn build_successful(&self);

    /// Record a failed build
    fn build_failed(&self);

    /// Number of devices in the last published set
    fn set_built_devices(&self, count: usize);
}

/// Prometheus registry owned by the application
pub struct Registry {
    registry: prometheus::Registry,
    built_devices_number: IntGauge,
    build_status: IntGauge,
    completed_build_total: IntCounterVec,
}

impl Registry {
    pub fn new() -> Result<Self, AggregatorError> {
        let registry = prometheus::Registry::new();

        let built_devices_number = IntGauge::with_opts(Opts::new(
            "built_devices_number",
            "Number of devices built during last successful build",
        ))?;
        let build_status = IntGauge::with_opts(Opts::new(
            "build_status",
            "Last completed build status, 0=Failed, 1=Success",
        ))?;
        let completed_build_total = IntCounterVec::new(
            Opts::new("completed_build_total", "Total number of completed build"),
            &["success"],
        )?;

        registry.register(Box::new(built_devices_number.clone()))?;
        registry.register(Box::new(build_status.clone()))?;
        registry.register(Box::new(completed_build_total.clone()))?;

        Ok(Self {
            registry,
            built_devices_number,
            build_status,
            completed_build_total,
        })
    }

    /// Content type of [`Registry::render`]
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> Result<String, AggregatorError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| AggregatorError::Internal(e.to_string()))
    }
}

impl BuildMetrics for Registry {
    fn build_successful(&self) {
        self.build_status.set(1);
        self.completed_build_total.with_label_values(&["true"]).inc();
    }

    fn build_failed(&self) {
        self.build_status.set(0);
        self.completed_build_total.with_label_values(&["false"]).inc();
    }

    fn set_built_devices(&self, count: usize) {
        self.built_devices_number.set(count as i64);
    }
}
