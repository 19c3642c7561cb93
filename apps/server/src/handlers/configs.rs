use crate::config_ingest::persist_parsed_config;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use netval_model::{ConfigSnapshot, ParseWarning, SnapshotSource};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct IngestedConfigResponse {
    pub snapshot: ConfigSnapshot,
    pub warnings: Vec<ParseWarning>,
}

/// Accepts a raw config file as multipart form data, under a `config` field
/// (falling back to the first field present if the client didn't name one).
pub async fn upload(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<IngestedConfigResponse>, ApiError> {
    let mut raw_config = None;
    while let Some(field) = multipart.next_field().await.map_err(|error| ApiError::Validation(error.to_string()))? {
        if raw_config.is_none() || field.name() == Some("config") {
            let bytes = field.bytes().await.map_err(|error| ApiError::Validation(error.to_string()))?;
            raw_config = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
    }
    let raw_config = raw_config.ok_or_else(|| ApiError::Validation("no config file present in the upload".into()))?;

    let (snapshot, parsed) = persist_parsed_config(&state, &device_id, &raw_config, SnapshotSource::Upload).await?;
    Ok(Json(IngestedConfigResponse { snapshot, warnings: parsed.warnings }))
}

#[derive(Deserialize)]
pub struct ManualConfigRequest {
    pub raw_config: String,
}

pub async fn create_manual(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(body): Json<ManualConfigRequest>,
) -> Result<Json<IngestedConfigResponse>, ApiError> {
    if body.raw_config.trim().is_empty() {
        return Err(ApiError::Validation("raw_config must not be empty".into()));
    }
    let (snapshot, parsed) = persist_parsed_config(&state, &device_id, &body.raw_config, SnapshotSource::Manual).await?;
    Ok(Json(IngestedConfigResponse { snapshot, warnings: parsed.warnings }))
}

pub async fn latest(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<Json<ConfigSnapshot>, ApiError> {
    let snapshots = state.snapshots.list_by_device(&device_id).await?;
    snapshots
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound { entity: "config_snapshot", id: device_id })
}
