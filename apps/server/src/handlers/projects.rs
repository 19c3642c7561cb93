use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use netval_model::Project;
use netval_vault::CredentialRef;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("project name must not be empty".into()));
    }
    Ok(())
}

pub async fn create(State(state): State<AppState>, Json(body): Json<CreateProjectRequest>) -> Result<Json<Project>, ApiError> {
    require_name(&body.name)?;
    Ok(Json(state.projects.create(&body.name, body.description.as_deref()).await?))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.projects.list().await?))
}

pub async fn get(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.projects.get(&project_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    require_name(&body.name)?;
    Ok(Json(state.projects.update(&project_id, &body.name, body.description.as_deref()).await?))
}

/// Deletes a project. Every owned device's vault credential is revoked
/// first so the cascade delete never leaves a keyring entry orphaned behind
/// a row the store has already dropped.
pub async fn delete(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<StatusCode, ApiError> {
    let devices = state.devices.list_by_project(&project_id).await?;
    for device in &devices {
        if let Some(reference) = &device.credential_ref {
            netval_vault::delete(&CredentialRef(reference.clone()))?;
        }
    }
    state.projects.delete(&project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
