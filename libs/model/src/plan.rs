use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Approved,
    Applying,
    Applied,
    RolledBack,
    Failed,
}

/// One patch/rollback pair derived from a single failed finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationItem {
    pub device_id: String,
    pub interface: Option<String>,
    pub source_check_id: String,
    pub cli_patch: String,
    pub rollback_cli: String,
    pub approved: bool,
}

/// Destroyed only when its project is destroyed; intermediate states follow
/// the state machine below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationPlan {
    pub id: String,
    pub project_id: String,
    pub items: Vec<RemediationItem>,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub applied_at: Option<DateTime<Utc>>,
}

impl PlanStatus {
    /// Only `pending` and `approved` accept item-level approval toggles.
    pub fn accepts_approval_toggle(self) -> bool {
        matches!(self, PlanStatus::Pending | PlanStatus::Approved)
    }
}
