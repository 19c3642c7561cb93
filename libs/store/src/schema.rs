//! Schema definition and idempotent migration for the topology store.

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const PRAGMAS: &[&str] = &[
    "PRAGMA journal_mode = WAL;",
    "PRAGMA foreign_keys = ON;",
    "PRAGMA synchronous = NORMAL;",
];

const TABLES: &[(&str, &str)] = &[
    ("projects", r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("devices", r#"
        CREATE TABLE IF NOT EXISTS devices (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            hostname TEXT NOT NULL,
            role TEXT NOT NULL,
            vendor TEXT NOT NULL,
            platform TEXT NOT NULL,
            management_ip TEXT,
            canvas_x REAL NOT NULL DEFAULT 0,
            canvas_y REAL NOT NULL DEFAULT 0,
            credential_ref TEXT,
            config_hash TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("interfaces", r#"
        CREATE TABLE IF NOT EXISTS interfaces (
            id TEXT PRIMARY KEY,
            device_id TEXT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            mode TEXT NOT NULL,
            vlan_access INTEGER,
            vlan_trunk_allowed TEXT NOT NULL DEFAULT '',
            native_vlan INTEGER,
            ip_address TEXT,
            ip_mask TEXT,
            dhcp_helper TEXT,
            duplex TEXT,
            state TEXT NOT NULL DEFAULT 'unknown',
            UNIQUE(device_id, name)
        );
    "#),
    ("device_vlans", r#"
        CREATE TABLE IF NOT EXISTS device_vlans (
            device_id TEXT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            vlan_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            PRIMARY KEY (device_id, vlan_id)
        );
    "#),
    ("links", r#"
        CREATE TABLE IF NOT EXISTS links (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            source_device_id TEXT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            source_interface TEXT NOT NULL,
            target_device_id TEXT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            target_interface TEXT NOT NULL,
            medium TEXT NOT NULL,
            vlan_allow_list TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT 'pending'
        );
    "#),
    ("config_snapshots", r#"
        CREATE TABLE IF NOT EXISTS config_snapshots (
            id TEXT PRIMARY KEY,
            device_id TEXT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            raw_config TEXT NOT NULL,
            config_hash TEXT NOT NULL,
            source TEXT NOT NULL,
            taken_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("jobs", r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'queued',
            result TEXT,
            started_at DATETIME,
            completed_at DATETIME
        );
    "#),
    ("remediation_plans", r#"
        CREATE TABLE IF NOT EXISTS remediation_plans (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            applied_at DATETIME
        );
    "#),
    ("remediation_items", r#"
        CREATE TABLE IF NOT EXISTS remediation_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_id TEXT NOT NULL REFERENCES remediation_plans(id) ON DELETE CASCADE,
            device_id TEXT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            interface TEXT,
            source_check_id TEXT NOT NULL,
            cli_patch TEXT NOT NULL,
            rollback_cli TEXT NOT NULL,
            approved INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("audit_log", r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            device_id TEXT,
            actor TEXT NOT NULL,
            action TEXT NOT NULL,
            detail TEXT NOT NULL,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

const INDEXES: &[(&str, &str)] = &[
    ("idx_devices_project", "CREATE INDEX IF NOT EXISTS idx_devices_project ON devices(project_id);"),
    ("idx_interfaces_device", "CREATE INDEX IF NOT EXISTS idx_interfaces_device ON interfaces(device_id);"),
    ("idx_links_project", "CREATE INDEX IF NOT EXISTS idx_links_project ON links(project_id);"),
    ("idx_snapshots_device", "CREATE INDEX IF NOT EXISTS idx_snapshots_device ON config_snapshots(device_id, taken_at);"),
    ("idx_jobs_project", "CREATE INDEX IF NOT EXISTS idx_jobs_project ON jobs(project_id, kind);"),
    ("idx_plans_project", "CREATE INDEX IF NOT EXISTS idx_plans_project ON remediation_plans(project_id);"),
    ("idx_items_plan", "CREATE INDEX IF NOT EXISTS idx_items_plan ON remediation_items(plan_id);"),
    ("idx_audit_project", "CREATE INDEX IF NOT EXISTS idx_audit_project ON audit_log(project_id, timestamp);"),
];

/// Applies the connection-scoped pragmas (WAL, foreign keys, synchronous
/// mode). libSQL pragmas are per-connection, not per-database, so this must
/// run on every connection handed out by [`crate::StoreClient::connection`],
/// not just the bootstrap connection schema is created on — otherwise
/// `ON DELETE CASCADE` never fires on connections opened afterward.
#[instrument(skip(conn))]
pub async fn apply_pragmas(conn: &Connection) -> Result<()> {
    for pragma in PRAGMAS {
        conn.execute(pragma, ()).await.with_context(|| format!("pragma failed: {pragma}"))?;
    }
    Ok(())
}

#[instrument(skip(conn))]
pub async fn apply_schema(conn: &Connection) -> Result<()> {
    info!("applying topology store schema");

    apply_pragmas(conn).await?;

    for (name, sql) in TABLES {
        debug!("creating table {name}");
        conn.execute(sql, ()).await.with_context(|| format!("table creation failed: {name}"))?;
    }

    for (name, sql) in INDEXES {
        debug!("creating index {name}");
        conn.execute(sql, ()).await.with_context(|| format!("index creation failed: {name}"))?;
    }

    info!("schema ready");
    Ok(())
}
