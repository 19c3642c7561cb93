use crate::error::ApiError;
use crate::jobs::run_simulation_job;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use netval_model::{JobKind, SimulationJob, SnapshotSource};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct JobCreatedResponse {
    pub job_id: String,
}

/// Kicks off a simulation job against a project's current topology and
/// returns immediately with the job id; progress streams over
/// `/ws/simulation/{job_id}` and the final `AuditResult` lands in the job row.
pub async fn trigger(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Json<JobCreatedResponse>, ApiError> {
    state.projects.get(&project_id).await?;
    let job = state.jobs.create(&project_id, JobKind::Simulation).await?;
    let job_id = job.id.clone();
    tokio::spawn(run_simulation_job(state, job_id.clone(), project_id));
    Ok(Json(JobCreatedResponse { job_id }))
}

pub async fn get_job(State(state): State<AppState>, Path(job_id): Path<String>) -> Result<Json<SimulationJob>, ApiError> {
    Ok(Json(state.jobs.get(&job_id).await?))
}

#[derive(Serialize)]
pub struct GeneratedCliResponse {
    pub by_hostname: BTreeMap<String, String>,
}

/// Renders the deterministic CLI for every device's latest non-`pre_push`
/// snapshot, keyed by hostname. A device with no snapshot on file is skipped.
pub async fn generate_cli(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Json<GeneratedCliResponse>, ApiError> {
    let devices = state.devices.list_by_project(&project_id).await?;
    let mut by_hostname = BTreeMap::new();
    for device in devices {
        let snapshots = state.snapshots.list_by_device(&device.id).await?;
        let Some(latest) = snapshots.into_iter().find(|snapshot| snapshot.source != SnapshotSource::PrePush) else {
            continue;
        };
        let parsed = netval_parser::parse_running_config(&latest.raw_config);
        by_hostname.insert(device.hostname.clone(), netval_render::render(&parsed));
    }
    Ok(Json(GeneratedCliResponse { by_hostname }))
}
