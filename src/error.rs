use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::{Gpu, GpuStatus};

/// Failures of the JSON file store. Messages are surfaced to API callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("status is required")]
    StatusRequired,

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("serial number {} already exists", .0.serial_number)]
    DuplicateSerial(Box<Gpu>),

    #[error("no id left after {0}")]
    IdSpaceExhausted(u64),

    #[error("GPU {0} not found")]
    NotFound(String),

    /// `context` is the headline returned as `error`; the store message goes in `message`.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Adapter for `map_err` that tags a store failure with the response headline.
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store { .. } | AppError::IdSpaceExhausted(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }

        let body = match self {
            AppError::MissingFields(missing) => json!({
                "error": "Missing required fields",
                "missing": missing,
            }),
            AppError::StatusRequired => json!({ "error": "Status is required" }),
            AppError::InvalidStatus(_) => json!({
                "error": "Invalid status",
                "validStatuses": GpuStatus::valid_names(),
            }),
            AppError::InvalidField { field, reason } => json!({
                "error": format!("Invalid {field}"),
                "message": reason,
            }),
            AppError::DuplicateSerial(existing) => json!({
                "error": "A GPU with this serial number already exists",
                "existing_gpu": existing,
            }),
            AppError::IdSpaceExhausted(max) => json!({
                "error": "Failed to add GPU",
                "message": format!("no id left after {max}"),
            }),
            AppError::NotFound(_) => json!({ "error": "GPU not found" }),
            AppError::Store { context, source } => json!({
                "error": context,
                "message": source.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_fields_lists_names() {
        let (status, body) = body_of(AppError::MissingFields(vec!["vendor", "owner"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["missing"], json!(["vendor", "owner"]));
    }

    #[tokio::test]
    async fn invalid_status_lists_valid_values() {
        let (status, body) = body_of(AppError::InvalidStatus("broken".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["validStatuses"],
            json!(["available", "missing", "in-use", "loaned-out"])
        );
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_of(AppError::NotFound("42".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "GPU not found" }));
    }

    #[tokio::test]
    async fn store_error_surfaces_underlying_message() {
        let source = StoreError::Read {
            path: PathBuf::from("gpu_database.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let (status, body) = body_of(AppError::store("Failed to read GPU database")(source)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to read GPU database");
        assert_eq!(
            body["message"],
            "failed to read gpu_database.json: no such file"
        );
    }
}
