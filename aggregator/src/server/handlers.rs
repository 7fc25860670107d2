//! HTTP request handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use api_models::{AfkEnabledResponse, BuildStatus, HealthResponse, ReportResponse, VersionResponse};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::errors::AggregatorError;
use crate::report::model::{BuildOutcome, Report};
use crate::server::state::ServerState;

/// Path segment selecting every device
pub const ALL_DEVICES: &str = "*";

/// Handler error mapped to an HTTP response
#[derive(Debug)]
pub struct ApiError(AggregatorError);

impl From<AggregatorError> for ApiError {
    fn from(e: AggregatorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_not_found() {
            return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
        }

        error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "internal server error"})),
        )
            .into_response()
    }
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Version handler
pub async fn version_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(VersionResponse {
        version: state.version.version.clone(),
        build_time: state.version.build_time.clone(),
        build_user: state.version.build_user.clone(),
    })
}

/// Prometheus exposition handler
pub async fn metrics_handler(State(state): State<Arc<ServerState>>) -> Result<Response, ApiError> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, state.metrics.content_type())], body).into_response())
}

/// AFK status of one device, or of every AFK-enabled device for `*`
pub async fn afk_enabled_handler(
    State(state): State<Arc<ServerState>>,
    Path(hostname): Path<String>,
) -> Result<Response, ApiError> {
    if hostname == ALL_DEVICES {
        let enabled: BTreeMap<String, AfkEnabledResponse> = state
            .devices
            .list_afk_enabled()
            .into_iter()
            .map(|(hostname, _)| (hostname, AfkEnabledResponse { afk_enabled: true }))
            .collect();
        return Ok(Json(enabled).into_response());
    }

    let afk_enabled = state.devices.is_afk_enabled(&hostname)?;
    Ok(Json(AfkEnabledResponse { afk_enabled }).into_response())
}

/// OpenConfig tree of one device, or of every device for `*`
pub async fn openconfig_handler(
    State(state): State<Arc<ServerState>>,
    Path(hostname): Path<String>,
) -> Result<Response, ApiError> {
    if hostname == ALL_DEVICES {
        return Ok(Json(state.devices.get_all_configs()).into_response());
    }

    let config = state.devices.get_config(&hostname)?;
    Ok(Json(config).into_response())
}

pub async fn last_report_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state.reports.get_last()?;
    Ok(Json(to_response(&report)))
}

pub async fn last_complete_report_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state.reports.get_last_complete()?;
    Ok(Json(to_response(&report)))
}

pub async fn last_successful_report_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state.reports.get_last_successful()?;
    Ok(Json(to_response(&report)))
}

fn to_response(report: &Report) -> ReportResponse {
    let (status, device_count, error) = match &report.outcome {
        BuildOutcome::Pending => (BuildStatus::Pending, None, None),
        BuildOutcome::Success { device_count } => (BuildStatus::Success, Some(*device_count), None),
        BuildOutcome::Failed { error } => (BuildStatus::Failed, None, Some(error.clone())),
    };

    ReportResponse {
        id: report.id,
        status,
        start_time: report.start_time,
        end_time: report.end_time,
        device_count,
        error,
    }
}
