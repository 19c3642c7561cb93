use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    Switch,
    Router,
    Wlc,
    Ap,
    Firewall,
    Endpoint,
}

/// Owned by exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub project_id: String,
    pub hostname: String,
    pub role: DeviceRole,
    pub vendor: String,
    pub platform: String,
    pub management_ip: Option<String>,
    pub canvas_x: f64,
    pub canvas_y: f64,
    /// Opaque key into the credential vault, or `None` if no credentials are on file.
    pub credential_ref: Option<String>,
    /// Content-hash of the most recent non-`pre_push` `ConfigSnapshot`, or `None`.
    pub config_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
