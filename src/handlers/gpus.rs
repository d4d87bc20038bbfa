use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{CreateGpu, Gpu, GpuDocument, UpdateGpuStatus},
    AppState,
};

// ── Whole document ────────────────────────────────────────────────────────────

pub async fn get_database(State(state): State<AppState>) -> AppResult<Json<GpuDocument>> {
    let document = db::fetch_database(state.store.as_ref()).await?;
    info!(count = document.gpus().len(), "Read GPU database");
    Ok(Json(document))
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_gpus(State(state): State<AppState>) -> AppResult<Json<Vec<Gpu>>> {
    let gpus = db::fetch_all_gpus(state.store.as_ref()).await?;
    info!(count = gpus.len(), "Listed GPUs");
    Ok(Json(gpus))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_gpu(
    State(state): State<AppState>,
    Json(payload): Json<CreateGpu>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let gpu = db::insert_gpu(state.store.as_ref(), &payload).await?;

    info!(id = gpu.id, serial_number = %gpu.serial_number, "Added GPU");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "GPU added successfully",
            "id": gpu.id,
            "gpu": gpu,
        })),
    ))
}

// ── Status update ─────────────────────────────────────────────────────────────

pub async fn update_gpu_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateGpuStatus>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let gpu = db::update_gpu_status(state.store.as_ref(), &id, &payload).await?;

    info!(id = gpu.id, status = %gpu.status, "Updated GPU status");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "GPU status updated successfully",
            "gpu": gpu,
        })),
    ))
}
