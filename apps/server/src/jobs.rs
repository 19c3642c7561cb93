//! The Job Manager: a per-job-id broadcast hub plus the background task
//! bodies for the three job kinds. Handlers create a `SimulationJob` row,
//! `tokio::spawn` the matching `run_*_job` here, and return the job id
//! immediately; progress and the terminal event are pushed through
//! [`JobEventHub`] for `/ws/*` subscribers, and the terminal result is
//! always persisted to the `jobs` table first so a subscriber that connects
//! late can still read it back via `GET /jobs/{id}`.

use crate::config_ingest::persist_parsed_config;
use crate::error::ApiError;
use crate::state::AppState;
use netval_model::{JobEvent, PlanStatus, RemediationItem, SnapshotSource};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Per-job-id fan-out. Each job id gets its own broadcast channel, created
/// lazily on first subscribe or publish; unlike a single global event bus,
/// subscribers for one job never see another job's traffic.
pub struct JobEventHub {
    senders: Mutex<HashMap<String, broadcast::Sender<JobEvent>>>,
}

const JOB_EVENT_CAPACITY: usize = 256;

impl JobEventHub {
    pub fn new() -> Self {
        Self { senders: Mutex::new(HashMap::new()) }
    }

    fn sender_for(&self, job_id: &str) -> broadcast::Sender<JobEvent> {
        let mut senders = self.senders.lock().expect("job event hub mutex poisoned");
        senders.entry(job_id.to_string()).or_insert_with(|| broadcast::channel(JOB_EVENT_CAPACITY).0).clone()
    }

    pub fn subscribe(&self, job_id: &str) -> broadcast::Receiver<JobEvent> {
        self.sender_for(job_id).subscribe()
    }

    pub fn publish(&self, job_id: &str, event: JobEvent) {
        let _ = self.sender_for(job_id).send(event);
    }
}

impl Default for JobEventHub {
    fn default() -> Self {
        Self::new()
    }
}

async fn fail(state: &AppState, job_id: &str, message: &str) {
    if state.jobs.mark_failed(job_id, message).await.is_ok() {
        state.job_events.publish(job_id, JobEvent::Failed { message: message.to_string() });
    }
}

/// Runs the full validation check registry against a project's topology and
/// persists an `AuditResult`.
pub async fn run_simulation_job(state: AppState, job_id: String, project_id: String) {
    if state.jobs.mark_running(&job_id).await.is_err() {
        return;
    }

    let graph = match crate::topology::load_graph(&state, &project_id).await {
        Ok(graph) => graph,
        Err(error) => {
            fail(&state, &job_id, &error.to_string()).await;
            return;
        }
    };

    let registry = state.registry.clone();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<netval_checks::CheckEvent>();
    let hub = state.job_events.clone();
    let forward_job_id = job_id.clone();
    let forward = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let job_event = match event {
                netval_checks::CheckEvent::Start { check_id } => JobEvent::CheckStart { check_id: check_id.to_string() },
                netval_checks::CheckEvent::Complete { check_id, passed_count, failed_count } => {
                    JobEvent::CheckComplete { check_id: check_id.to_string(), passed_count, failed_count }
                }
            };
            hub.publish(&forward_job_id, job_event);
        }
    });

    let outcome = tokio::task::spawn_blocking(move || {
        let findings = netval_checks::run_registry(&graph, &registry, netval_checks::DEFAULT_CHECK_BUDGET, |event| {
            let _ = tx.send(event);
        });
        let reachability = netval_checks::reachability_matrix(&graph);
        (findings, reachability)
    })
    .await;

    let _ = forward.await;

    match outcome {
        Ok((findings, reachability)) => {
            let result = netval_checks::aggregate(project_id, findings, reachability, chrono::Utc::now());
            let value = serde_json::to_value(&result).expect("AuditResult always serializes to JSON");
            if state.jobs.mark_complete(&job_id, &value).await.is_ok() {
                state.job_events.publish(&job_id, JobEvent::Complete { result: value });
            }
        }
        Err(join_error) => fail(&state, &job_id, &format!("simulation task did not complete: {join_error}")).await,
    }
}

async fn ingest_device(state: &AppState, device_id: &str) -> Result<serde_json::Value, ApiError> {
    let device = state.devices.get(device_id).await?;
    let host = device.management_ip.clone().ok_or_else(|| ApiError::Validation("device has no management IP configured".into()))?;
    let credential_ref = device.credential_ref.clone().ok_or_else(|| ApiError::Validation("device has no credentials on file".into()))?;
    let credentials = netval_vault::load(&netval_vault::CredentialRef(credential_ref))?;
    let target = netval_ssh::DeviceTarget { device_id: device.id.clone(), host, port: 22, credentials };

    let outcome = state.ssh_pool.ingest(&target).await.map_err(|e| ApiError::DeviceUnreachable(e.to_string()))?;
    let (_, parsed) = persist_parsed_config(state, device_id, &outcome.raw_config, SnapshotSource::Ssh).await?;

    Ok(serde_json::json!({ "outputs": outcome.outputs, "warnings": parsed.warnings }))
}

/// Pulls a device's live state over SSH and persists it as an `ssh`-sourced
/// snapshot, same as the upload/manual config endpoints but sourced live.
pub async fn run_ingestion_job(state: AppState, job_id: String, device_id: String) {
    if state.jobs.mark_running(&job_id).await.is_err() {
        return;
    }
    match ingest_device(&state, &device_id).await {
        Ok(value) => {
            if state.jobs.mark_complete(&job_id, &value).await.is_ok() {
                state.job_events.publish(&job_id, JobEvent::Complete { result: value });
            }
        }
        Err(error) => fail(&state, &job_id, &error.to_string()).await,
    }
}

fn push_progress_event(progress: netval_ssh::PushProgress) -> JobEvent {
    match progress {
        netval_ssh::PushProgress::Line { device_id, line } => JobEvent::PushLine { device_id, line },
        netval_ssh::PushProgress::DeviceComplete { device_id, success } => JobEvent::PushDeviceComplete { device_id, success },
    }
}

async fn load_push_target(state: &AppState, device_id: &str) -> Result<netval_ssh::DeviceTarget, ApiError> {
    let device = state.devices.get(device_id).await?;
    let host = device.management_ip.clone().ok_or_else(|| ApiError::Validation("device has no management IP configured".into()))?;
    let credential_ref = device.credential_ref.clone().ok_or_else(|| ApiError::Validation("device has no credentials on file".into()))?;
    let credentials = netval_vault::load(&netval_vault::CredentialRef(credential_ref))?;
    Ok(netval_ssh::DeviceTarget { device_id: device_id.to_string(), host, port: 22, credentials })
}

async fn apply_plan(state: &AppState, job_id: &str, plan_id: &str, confirm: bool) -> Result<serde_json::Value, ApiError> {
    if !confirm {
        return Err(ApiError::ConfirmationRequired);
    }

    let plan = state.plans.get_with_items(plan_id).await?;
    state.plans.set_status(plan_id, PlanStatus::Applying).await?;

    let mut by_device: BTreeMap<String, Vec<&RemediationItem>> = BTreeMap::new();
    for item in plan.items.iter().filter(|item| item.approved) {
        by_device.entry(item.device_id.clone()).or_default().push(item);
    }

    let mut device_results = Vec::new();
    let mut any_failed = false;

    for (device_id, items) in by_device {
        let target = match load_push_target(state, &device_id).await {
            Ok(target) => target,
            Err(error) => {
                any_failed = true;
                device_results.push(serde_json::json!({ "device_id": device_id, "success": false, "error": error.to_string() }));
                continue;
            }
        };

        let config_block = items.iter().map(|item| item.cli_patch.as_str()).collect::<Vec<_>>().join("\n");
        let hub = state.job_events.clone();
        let job_id_owned = job_id.to_string();
        let push_result = state
            .ssh_pool
            .push(&target, &config_block, true, move |progress| hub.publish(&job_id_owned, push_progress_event(progress)))
            .await;

        match push_result {
            Ok(outcome) => {
                state.snapshots.insert(&device_id, &outcome.pre_push_snapshot, SnapshotSource::PrePush).await?;
                device_results.push(serde_json::json!({ "device_id": device_id, "success": true }));
            }
            Err(error) => {
                any_failed = true;
                // A failed push can still have captured the pre-push
                // snapshot before the later step broke; persist it so
                // rollback stays available even though the plan failed.
                if let netval_ssh::SshError::PushFailure { pre_push_snapshot: Some(snapshot), .. } = &error {
                    state.snapshots.insert(&device_id, snapshot, SnapshotSource::PrePush).await?;
                }
                state.job_events.publish(job_id, JobEvent::PushDeviceComplete { device_id: device_id.clone(), success: false });
                device_results.push(serde_json::json!({ "device_id": device_id, "success": false, "error": error.to_string() }));
            }
        }
    }

    let final_status = if any_failed { PlanStatus::Failed } else { PlanStatus::Applied };
    state.plans.set_status(plan_id, final_status).await?;
    Ok(serde_json::json!({ "plan_id": plan_id, "status": format!("{final_status:?}"), "devices": device_results }))
}

/// Applies an approved remediation plan: pushes each device's concatenated
/// patch, gated on `confirm`. A `pre_push` snapshot is persisted for every
/// device that accepts the push, as returned by the SSH session itself.
pub async fn run_remediation_job(state: AppState, job_id: String, plan_id: String, confirm: bool) {
    if state.jobs.mark_running(&job_id).await.is_err() {
        return;
    }
    match apply_plan(&state, &job_id, &plan_id, confirm).await {
        Ok(value) => {
            if state.jobs.mark_complete(&job_id, &value).await.is_ok() {
                state.job_events.publish(&job_id, JobEvent::Complete { result: value });
            }
        }
        Err(error) => {
            let _ = state.plans.set_status(&plan_id, PlanStatus::Failed).await;
            fail(&state, &job_id, &error.to_string()).await;
        }
    }
}

async fn rollback_plan(state: &AppState, job_id: &str, plan_id: &str, confirm: bool) -> Result<serde_json::Value, ApiError> {
    if !confirm {
        return Err(ApiError::ConfirmationRequired);
    }

    let plan = state.plans.get_with_items(plan_id).await?;
    let mut device_ids: Vec<String> = plan.items.iter().map(|item| item.device_id.clone()).collect();
    device_ids.sort();
    device_ids.dedup();

    let mut device_results = Vec::new();
    let mut any_failed = false;

    for device_id in device_ids {
        let rollback_target = match state.snapshots.find_rollback_target(&device_id, state.config.retention_window_hours).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                any_failed = true;
                device_results.push(serde_json::json!({ "device_id": device_id, "success": false, "error": error.to_string() }));
                continue;
            }
        };

        let target = match load_push_target(state, &device_id).await {
            Ok(target) => target,
            Err(error) => {
                any_failed = true;
                device_results.push(serde_json::json!({ "device_id": device_id, "success": false, "error": error.to_string() }));
                continue;
            }
        };

        let parsed = netval_parser::parse_running_config(&rollback_target.raw_config);
        let cli = netval_render::render(&parsed);

        let hub = state.job_events.clone();
        let job_id_owned = job_id.to_string();
        let push_result = state
            .ssh_pool
            .push(&target, &cli, true, move |progress| hub.publish(&job_id_owned, push_progress_event(progress)))
            .await;

        match push_result {
            Ok(_) => device_results.push(serde_json::json!({ "device_id": device_id, "success": true })),
            Err(error) => {
                any_failed = true;
                device_results.push(serde_json::json!({ "device_id": device_id, "success": false, "error": error.to_string() }));
            }
        }
    }

    let final_status = if any_failed { PlanStatus::Failed } else { PlanStatus::RolledBack };
    state.plans.set_status(plan_id, final_status).await?;
    Ok(serde_json::json!({ "plan_id": plan_id, "status": format!("{final_status:?}"), "devices": device_results }))
}

/// Rolls every device touched by a plan back to its `pre_push` snapshot,
/// re-rendering it to CLI and pushing it the same way a forward patch is
/// pushed. Fails per-device if that device's rollback window has closed.
pub async fn run_rollback_job(state: AppState, job_id: String, plan_id: String, confirm: bool) {
    if state.jobs.mark_running(&job_id).await.is_err() {
        return;
    }
    match rollback_plan(&state, &job_id, &plan_id, confirm).await {
        Ok(value) => {
            if state.jobs.mark_complete(&job_id, &value).await.is_ok() {
                state.job_events.publish(&job_id, JobEvent::Complete { result: value });
            }
        }
        Err(error) => fail(&state, &job_id, &error.to_string()).await,
    }
}
