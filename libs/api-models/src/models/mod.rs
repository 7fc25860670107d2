//! API response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub build_time: String,
    pub build_user: String,
}

/// AFK status of a single device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfkEnabledResponse {
    pub afk_enabled: bool,
}

/// Build status as exposed to API consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Pending,
    Success,
    Failed,
}

/// Build report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: u64,
    pub status: BuildStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
