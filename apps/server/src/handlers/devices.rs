use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use netval_model::{Device, DeviceRole};
use netval_vault::CredentialRef;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    pub hostname: String,
    pub role: DeviceRole,
    pub vendor: String,
    pub platform: String,
    pub management_ip: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<CreateDeviceRequest>,
) -> Result<Json<Device>, ApiError> {
    if body.hostname.trim().is_empty() {
        return Err(ApiError::Validation("device hostname must not be empty".into()));
    }
    let device = state
        .devices
        .create(&project_id, &body.hostname, body.role, &body.vendor, &body.platform, body.management_ip.as_deref())
        .await?;
    Ok(Json(device))
}

pub async fn list_by_project(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.list_by_project(&project_id).await?))
}

pub async fn detail(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<Json<Device>, ApiError> {
    Ok(Json(state.devices.get(&device_id).await?))
}

/// Deletes a device. Any vault credential on file for it is deleted first so
/// nothing orphaned survives in the host secret store.
pub async fn delete(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<StatusCode, ApiError> {
    let device = state.devices.get(&device_id).await?;
    if let Some(reference) = &device.credential_ref {
        netval_vault::delete(&CredentialRef(reference.clone()))?;
    }
    state.devices.delete(&device_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
