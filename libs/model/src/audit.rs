use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One finding from one registered check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub severity: Severity,
    pub passed: bool,
    pub device_id: Option<String>,
    pub interface: Option<String>,
    pub detail: String,
    pub suggested_fix: Option<String>,
}

/// Dense boolean table of path existence between every ordered device pair
/// tested during assembly, keyed by hostname.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReachabilityMatrix {
    pub entries: BTreeMap<String, BTreeMap<String, bool>>,
}

impl ReachabilityMatrix {
    pub fn set(&mut self, src_hostname: &str, dst_hostname: &str, reachable: bool) {
        self.entries
            .entry(src_hostname.to_string())
            .or_default()
            .insert(dst_hostname.to_string(), reachable);
    }

    pub fn get(&self, src_hostname: &str, dst_hostname: &str) -> Option<bool> {
        self.entries.get(src_hostname)?.get(dst_hostname).copied()
    }
}

/// A validation job's fully self-describing result: can be rendered without
/// re-reading the topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub project_id: String,
    pub findings: Vec<CheckResult>,
    pub reachability: ReachabilityMatrix,
    pub generated_at: DateTime<Utc>,
}

impl AuditResult {
    pub fn failed_findings(&self) -> impl Iterator<Item = &CheckResult> {
        self.findings.iter().filter(|f| !f.passed)
    }
}

/// Append-only audit trail of actions taken against a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub project_id: String,
    pub device_id: Option<String>,
    pub actor: String,
    pub action: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}
