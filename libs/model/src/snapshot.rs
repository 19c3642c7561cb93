use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    Manual,
    Upload,
    Ssh,
    PrePush,
}

/// Append-only; a `pre_push` snapshot is written before every push
/// and is the rollback target for that push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub id: String,
    pub device_id: String,
    pub raw_config: String,
    pub config_hash: String,
    pub source: SnapshotSource,
    pub taken_at: DateTime<Utc>,
}
