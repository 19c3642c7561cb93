use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root of the ownership tree. Deleting a project cascades to every
/// device, interface, link, snapshot, job and plan it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
