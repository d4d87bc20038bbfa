pub mod gpus;

use axum::{http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "message": "Server is healthy",
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })),
    )
}
