use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use netval_vault::{CredentialMaterial, CredentialRef};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct StoreCredentialRequest {
    pub username: String,
    pub password: Option<String>,
    pub key_path: Option<String>,
}

pub async fn store(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(body): Json<StoreCredentialRequest>,
) -> Result<StatusCode, ApiError> {
    if body.password.is_none() && body.key_path.is_none() {
        return Err(ApiError::Validation("credentials need a password or a key_path".into()));
    }
    let device = state.devices.get(&device_id).await?;
    if let Some(existing) = &device.credential_ref {
        netval_vault::delete(&CredentialRef(existing.clone()))?;
    }
    let material = CredentialMaterial { username: body.username, password: body.password, key_path: body.key_path };
    let reference = netval_vault::store(&device.project_id, &device_id, &material)?;
    state.devices.set_credential_ref(&device_id, Some(&reference.0)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<StatusCode, ApiError> {
    let device = state.devices.get(&device_id).await?;
    if let Some(existing) = &device.credential_ref {
        netval_vault::delete(&CredentialRef(existing.clone()))?;
    }
    state.devices.set_credential_ref(&device_id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}
