use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use netval_model::{Link, LinkMedium};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateLinkRequest {
    pub source_device_id: String,
    pub source_interface: String,
    pub target_device_id: String,
    pub target_interface: String,
    pub medium: LinkMedium,
}

pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<CreateLinkRequest>,
) -> Result<Json<Link>, ApiError> {
    if body.source_device_id == body.target_device_id {
        return Err(ApiError::Validation("a link cannot connect a device to itself".into()));
    }
    let source_device = state.devices.get(&body.source_device_id).await?;
    let target_device = state.devices.get(&body.target_device_id).await?;
    if source_device.project_id != project_id || target_device.project_id != project_id {
        return Err(ApiError::Validation(
            "a link's source and target devices must belong to the same project as the link".into(),
        ));
    }
    let link = state
        .links
        .create(&project_id, &body.source_device_id, &body.source_interface, &body.target_device_id, &body.target_interface, body.medium)
        .await?;
    Ok(Json(link))
}

pub async fn list_by_project(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Json<Vec<Link>>, ApiError> {
    Ok(Json(state.links.list_by_project(&project_id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(link_id): Path<String>) -> Result<StatusCode, ApiError> {
    state.links.delete(&link_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
