use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Complete,
    Failed,
}

/// One jobs table backs all three job kinds so the Job Manager can issue ids,
/// persist lifecycle and multiplex progress uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Simulation,
    Ingestion,
    Remediation,
}

/// A tracked job record, generalized across the three job kinds the Job
/// Manager tracks. `result` is opaque JSON so ingestion and remediation jobs
/// can carry their own result shapes; a simulation job's result, when
/// present, deserializes to [`AuditResult`] and is fully self-describing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationJob {
    pub id: String,
    pub project_id: String,
    pub kind: JobKind,
    pub status: JobStatus,
    pub result: Option<serde_json::Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SimulationJob {
    /// Parses `result` as an [`AuditResult`], for simulation-kind jobs.
    pub fn audit_result(&self) -> Option<AuditResult> {
        self.result
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// A progress event multiplexed to WebSocket subscribers of a live job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    CheckStart { check_id: String },
    CheckComplete { check_id: String, passed_count: usize, failed_count: usize },
    PushLine { device_id: String, line: String },
    PushDeviceComplete { device_id: String, success: bool },
    Complete { result: serde_json::Value },
    Failed { message: String },
}
