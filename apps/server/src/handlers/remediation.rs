use crate::error::ApiError;
use crate::jobs::{run_remediation_job, run_rollback_job};
use crate::remediation_planner::plan_items;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use netval_model::{JobKind, PlanStatus, RemediationPlan};
use serde::{Deserialize, Serialize};

/// Builds a plan from a project's most recent completed simulation job.
/// Fails validation if no simulation has ever completed for the project.
pub async fn build_plan(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Json<RemediationPlan>, ApiError> {
    let jobs = state.jobs.list_by_project(&project_id).await?;
    let audit = jobs
        .into_iter()
        .filter(|job| job.kind == JobKind::Simulation)
        .find_map(|job| job.audit_result())
        .ok_or_else(|| ApiError::Validation("no completed simulation job to build a plan from".into()))?;

    let items = plan_items(&audit.findings);
    let plan = state.plans.create_with_items(&project_id, &items).await?;
    Ok(Json(plan))
}

pub async fn list_by_project(State(state): State<AppState>, Path(project_id): Path<String>) -> Result<Json<Vec<RemediationPlan>>, ApiError> {
    Ok(Json(state.plans.list_by_project(&project_id).await?))
}

pub async fn get(State(state): State<AppState>, Path(plan_id): Path<String>) -> Result<Json<RemediationPlan>, ApiError> {
    Ok(Json(state.plans.get_with_items(&plan_id).await?))
}

#[derive(Deserialize)]
pub struct ApproveItemRequest {
    pub item_index: usize,
    pub approved: bool,
}

/// Toggles one item's approval and, on a plan still `pending`, marks the
/// whole plan `approved` so it becomes eligible for apply.
pub async fn approve(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(body): Json<ApproveItemRequest>,
) -> Result<Json<RemediationPlan>, ApiError> {
    state.plans.set_item_approval(&plan_id, body.item_index, body.approved).await?;
    let plan = state.plans.get_with_items(&plan_id).await?;
    if plan.status == PlanStatus::Pending && plan.items.iter().any(|item| item.approved) {
        state.plans.set_status(&plan_id, PlanStatus::Approved).await?;
        return Ok(Json(state.plans.get_with_items(&plan_id).await?));
    }
    Ok(Json(plan))
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize)]
pub struct JobCreatedResponse {
    pub job_id: String,
}

/// Applies a plan's approved items over SSH. Requires `{"confirm": true}`;
/// without it the SSH pool never acquires a permit or opens a session.
pub async fn apply(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<JobCreatedResponse>, ApiError> {
    if !body.confirm {
        return Err(ApiError::ConfirmationRequired);
    }
    let plan = state.plans.get_with_items(&plan_id).await?;
    let job = state.jobs.create(&plan.project_id, JobKind::Remediation).await?;
    let job_id = job.id.clone();
    tokio::spawn(run_remediation_job(state, job_id.clone(), plan_id, true));
    Ok(Json(JobCreatedResponse { job_id }))
}

/// Rolls every device a plan touched back to its `pre_push` snapshot.
/// Requires `{"confirm": true}` for the same reason `apply` does.
pub async fn rollback(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<JobCreatedResponse>, ApiError> {
    if !body.confirm {
        return Err(ApiError::ConfirmationRequired);
    }
    let plan = state.plans.get_with_items(&plan_id).await?;
    let job = state.jobs.create(&plan.project_id, JobKind::Remediation).await?;
    let job_id = job.id.clone();
    tokio::spawn(run_rollback_job(state, job_id.clone(), plan_id, true));
    Ok(Json(JobCreatedResponse { job_id }))
}
