//! Server state

use std::sync::Arc;

use crate::device::repository::DeviceRepository;
use crate::metrics::Registry;
use crate::report::repository::ReportRepository;
use crate::server::auth::BasicAuthCredentials;
use crate::utils::VersionInfo;

/// Server state shared across handlers
pub struct ServerState {
    pub devices: Arc<DeviceRepository>,
    pub reports: Arc<ReportRepository>,
    pub metrics: Arc<Registry>,
    pub auth: BasicAuthCredentials,
    pub version: VersionInfo,
}

impl ServerState {
    pub fn new(
        devices: Arc<DeviceRepository>,
        reports: Arc<ReportRepository>,
        metrics: Arc<Registry>,
        auth: BasicAuthCredentials,
        version: VersionInfo,
    ) -> Self {
        Self {
            devices,
            reports,
            metrics,
            auth,
            version,
        }
    }
}
