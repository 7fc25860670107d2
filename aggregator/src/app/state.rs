//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::SourceOptions;
use crate::convert::openconfig::OpenConfigConverter;
use crate::convert::ConfigConverter;
use crate::device::repository::DeviceRepository;
use crate::errors::AggregatorError;
use crate::filesys::file::File;
use crate::metrics::Registry;
use crate::report::repository::ReportRepository;
use crate::source::file::FileSource;
use crate::source::http::HttpSource;
use crate::source::SourceProvider;

/// Main application state
pub struct AppState {
    /// Last published device set
    pub devices: Arc<DeviceRepository>,

    /// Build report history
    pub reports: Arc<ReportRepository>,

    /// Prometheus registry
    pub metrics: Arc<Registry>,

    /// Inventory source used by the build worker
    pub source: Arc<dyn SourceProvider>,

    /// Inventory to OpenConfig converter
    pub converter: Arc<dyn ConfigConverter>,
}

impl AppState {
    /// Initialize application state
    pub fn init(source: &SourceOptions) -> Result<Self, AggregatorError> {
        info!("Initializing application state...");

        let source: Arc<dyn SourceProvider> = match source {
            SourceOptions::Http(options) => Arc::new(HttpSource::new(options.clone())?),
            SourceOptions::File(path) => Arc::new(FileSource::new(File::new(path.clone()))),
        };
        info!("Inventory source: {}", source.describe());

        Ok(Self {
            devices: Arc::new(DeviceRepository::new()),
            reports: Arc::new(ReportRepository::new()),
            metrics: Arc::new(Registry::new()?),
            source,
            converter: Arc::new(OpenConfigConverter::new()),
        })
    }
}
