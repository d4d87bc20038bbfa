pub mod store;

pub use store::{JsonFileStore, Store};

use crate::error::{AppError, AppResult};
use crate::models::*;

const READ_FAILED: &str = "Failed to read GPU database";
const ADD_FAILED: &str = "Failed to add GPU";
const UPDATE_FAILED: &str = "Failed to update GPU status";

// ── Reads ─────────────────────────────────────────────────────────────────────

pub async fn fetch_database(store: &dyn Store) -> AppResult<GpuDocument> {
    store.load().await.map_err(AppError::store(READ_FAILED))
}

pub async fn fetch_all_gpus(store: &dyn Store) -> AppResult<Vec<Gpu>> {
    Ok(fetch_database(store).await?.gpu_database.gpus)
}

// ── Create ────────────────────────────────────────────────────────────────────

/// Treats `None` and `""` alike, matching how clients leave form fields blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Input checks that need no store access: required fields, then status and year.
fn validate_new_gpu(payload: &CreateGpu) -> AppResult<(GpuStatus, Option<i32>)> {
    let required = [
        ("vendor", &payload.vendor),
        ("name", &payload.name),
        ("generation", &payload.generation),
        ("serial_number", &payload.serial_number),
        ("owner", &payload.owner),
    ];
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }

    let status = match present(&payload.status) {
        Some(raw) => raw
            .parse::<GpuStatus>()
            .map_err(|_| AppError::InvalidStatus(raw.to_string()))?,
        None => GpuStatus::default(),
    };

    let release_year = match payload.release_year.as_ref().filter(|y| !y.is_blank()) {
        Some(year) => Some(year.to_year().ok_or_else(|| AppError::InvalidField {
            field: "release_year",
            reason: "release_year must be an integer".to_string(),
        })?),
        None => None,
    };

    Ok((status, release_year))
}

pub async fn insert_gpu(store: &dyn Store, payload: &CreateGpu) -> AppResult<Gpu> {
    let (status, release_year) = validate_new_gpu(payload)?;

    let mut document = store.load().await.map_err(AppError::store(ADD_FAILED))?;

    let serial_number = present(&payload.serial_number).unwrap_or_default();
    if let Some(existing) = document.find_by_serial(serial_number) {
        return Err(AppError::DuplicateSerial(Box::new(existing.clone())));
    }

    let id = document
        .next_id()
        .ok_or(AppError::IdSpaceExhausted(u64::MAX))?;

    let owned = |value: &Option<String>| present(value).map(str::to_string);
    let gpu = Gpu {
        id,
        vendor: owned(&payload.vendor).unwrap_or_default(),
        name: owned(&payload.name).unwrap_or_default(),
        generation: owned(&payload.generation).unwrap_or_default(),
        serial_number: serial_number.to_string(),
        owner: owned(&payload.owner).unwrap_or_default(),
        borrowee: owned(&payload.borrowee),
        status,
        additional_info: AdditionalInfo {
            memory: owned(&payload.memory),
            release_year,
            purchase_date: owned(&payload.purchase_date),
            ..AdditionalInfo::default()
        },
        extra: Default::default(),
    };

    document.gpu_database.gpus.push(gpu.clone());
    store.save(&document).await.map_err(AppError::store(ADD_FAILED))?;

    Ok(gpu)
}

// ── Status update ─────────────────────────────────────────────────────────────

/// Overwrites only `status` on the matching record. `id` is the raw path segment;
/// only its leading integer counts, so "1abc" and "1.5" both address record 1.
pub async fn update_gpu_status(
    store: &dyn Store,
    id: &str,
    payload: &UpdateGpuStatus,
) -> AppResult<Gpu> {
    let raw = present(&payload.status).ok_or(AppError::StatusRequired)?;
    let status: GpuStatus = raw
        .parse()
        .map_err(|_| AppError::InvalidStatus(raw.to_string()))?;

    let mut document = store.load().await.map_err(AppError::store(UPDATE_FAILED))?;

    let not_found = || AppError::NotFound(id.to_string());
    let gpu_id: u64 = integer_prefix(id).parse().map_err(|_| not_found())?;
    let gpu = document.find_mut(gpu_id).ok_or_else(not_found)?;
    gpu.status = status;
    let updated = gpu.clone();

    store.save(&document).await.map_err(AppError::store(UPDATE_FAILED))?;

    Ok(updated)
}
