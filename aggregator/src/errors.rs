//! Error types for the data aggregation API

use std::time::Duration;

use thiserror::Error;

use crate::convert::ConversionError;

/// Main error type for the data aggregation API
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No report yet")]
    NoReportYet,

    #[error("Conversion error: {0}")]
    ConversionError(#[from] ConversionError),

    #[error("Source error: {0}")]
    SourceError(String),

    #[error("Build timed out after {0:?}")]
    Timeout(Duration),

    #[error("Build cancelled")]
    Cancelled,

    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AggregatorError {
    /// Expected lookup misses, surfaced to API callers as "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, AggregatorError::NotFound(_) | AggregatorError::NoReportYet)
    }
}
