/// Unified error handling module
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// A raw state row that cannot enter the window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("record has no icao24")]
    MissingIcao24,
    #[error("record {0} has no latitude")]
    MissingLatitude(String),
    #[error("record {0} has no longitude")]
    MissingLongitude(String),
}

/// Invalid zone or pattern configuration, fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("zone has an empty name")]
    EmptyZoneName,
    #[error("duplicate zone name: {0}")]
    DuplicateZone(String),
    #[error("zone {0} has inverted bounds")]
    InvertedBounds(String),
    #[error("zone {0} has non-finite coordinates")]
    NonFiniteCoordinates(String),
    #[error("military pattern list is empty")]
    EmptyPatterns,
    #[error("country group {0} has no prefixes")]
    EmptyGroup(String),
    #[error("country group {0} has a blank prefix")]
    BlankPrefix(String),
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("External API error: {0}")]
    ExternalApi(#[from] reqwest::Error),
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Acquisition already in progress")]
    AcquisitionInProgress,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

fn upstream_code(status: u16) -> &'static str {
    match status {
        403 => "UPSTREAM_403",
        404 => "UPSTREAM_404",
        429 => "UPSTREAM_429",
        500..=599 => "UPSTREAM_5XX",
        _ => "UPSTREAM_ERROR",
    }
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::ExternalApi(e) => e
                .status()
                .map(|s| upstream_code(s.as_u16()))
                .unwrap_or("UPSTREAM_ERROR"),
            ApiError::UpstreamStatus(status) => upstream_code(*status),
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::AcquisitionInProgress => "ACQUISITION_IN_PROGRESS",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        // Errors travel in the body, the status stays 200
        (StatusCode::OK, Json(error_response)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_codes() {
        assert_eq!(ApiError::UpstreamStatus(429).code(), "UPSTREAM_429");
        assert_eq!(ApiError::UpstreamStatus(503).code(), "UPSTREAM_5XX");
        assert_eq!(ApiError::UpstreamStatus(418).code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn test_busy_acquisition_code() {
        assert_eq!(ApiError::AcquisitionInProgress.code(), "ACQUISITION_IN_PROGRESS");
    }

    #[test]
    fn test_config_error_message() {
        let err = ApiError::from(ConfigError::InvertedBounds("Baltic".to_string()));
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert_eq!(err.to_string(), "Configuration error: zone Baltic has inverted bounds");
    }
}
