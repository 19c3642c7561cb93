use crate::error::ApiError;
use crate::jobs::run_ingestion_job;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use netval_ssh::DeviceTarget;
use netval_vault::CredentialRef;
use serde::Serialize;

fn credential_error() -> ApiError {
    ApiError::Validation("device has no credentials on file".into())
}

async fn load_target(state: &AppState, device_id: &str) -> Result<DeviceTarget, ApiError> {
    let device = state.devices.get(device_id).await?;
    let host = device.management_ip.clone().ok_or_else(|| ApiError::Validation("device has no management IP configured".into()))?;
    let credential_ref = device.credential_ref.clone().ok_or_else(credential_error)?;
    let credentials = netval_vault::load(&CredentialRef(credential_ref))?;
    Ok(DeviceTarget { device_id: device.id.clone(), host, port: 22, credentials })
}

#[derive(Serialize)]
pub struct ConnectivityResponse {
    pub reachable: bool,
    pub detail: Option<String>,
}

/// A synchronous liveness probe — not a job, since it's a single round trip.
pub async fn connect(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<Json<ConnectivityResponse>, ApiError> {
    let target = load_target(&state, &device_id).await?;
    match state.ssh_pool.probe(&target).await {
        Ok(()) => Ok(Json(ConnectivityResponse { reachable: true, detail: None })),
        Err(error) => Ok(Json(ConnectivityResponse { reachable: false, detail: Some(error.to_string()) })),
    }
}

#[derive(Serialize)]
pub struct JobCreatedResponse {
    pub job_id: String,
}

pub async fn ingest(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<Json<JobCreatedResponse>, ApiError> {
    let device = state.devices.get(&device_id).await?;
    let job = state.jobs.create(&device.project_id, netval_model::JobKind::Ingestion).await?;
    let job_id = job.id.clone();
    tokio::spawn(run_ingestion_job(state, job_id.clone(), device_id));
    Ok(Json(JobCreatedResponse { job_id }))
}
