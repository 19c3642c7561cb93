use crate::errors::DbError;
use crate::repositories::project_repository::parse_ts;
use crate::StoreClient;
use chrono::{DateTime, Duration, Utc};
use libsql::{params, Row};
use netval_model::{ConfigSnapshot, SnapshotSource};
use tracing::instrument;
use uuid::Uuid;

pub struct SnapshotRepository {
    client: StoreClient,
}

impl SnapshotRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, raw_config))]
    pub async fn insert(&self, device_id: &str, raw_config: &str, source: SnapshotSource) -> Result<ConfigSnapshot, DbError> {
        let conn = self.client.connection().await?;
        let id = Uuid::new_v4().to_string();
        let config_hash = netval_model::content_hash(raw_config);
        conn.execute(
            "INSERT INTO config_snapshots (id, device_id, raw_config, config_hash, source) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id.clone(), device_id, raw_config, config_hash, source_to_str(source)],
        )
        .await?;
        self.get(&id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<ConfigSnapshot, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query("SELECT id, device_id, raw_config, config_hash, source, taken_at FROM config_snapshots WHERE id = ?1", params![id])
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "config_snapshot", id: id.to_string() })?;
        row_to_snapshot(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_by_device(&self, device_id: &str) -> Result<Vec<ConfigSnapshot>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, device_id, raw_config, config_hash, source, taken_at FROM config_snapshots
                 WHERE device_id = ?1 ORDER BY taken_at DESC",
                params![device_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_snapshot(&row)?);
        }
        Ok(out)
    }

    /// Finds the `pre_push` snapshot to roll a device back to, rejecting the
    /// request once it falls outside the retention window.
    #[instrument(skip(self))]
    pub async fn find_rollback_target(
        &self,
        device_id: &str,
        retention_window_hours: i64,
    ) -> Result<ConfigSnapshot, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, device_id, raw_config, config_hash, source, taken_at FROM config_snapshots
                 WHERE device_id = ?1 AND source = 'pre_push' ORDER BY taken_at DESC LIMIT 1",
                params![device_id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "config_snapshot", id: device_id.to_string() })?;
        let snapshot = row_to_snapshot(&row)?;

        let deadline = snapshot.taken_at + Duration::hours(retention_window_hours);
        if Utc::now() > deadline {
            return Err(DbError::RollbackWindowClosed);
        }
        Ok(snapshot)
    }
}

fn source_to_str(source: SnapshotSource) -> &'static str {
    match source {
        SnapshotSource::Manual => "manual",
        SnapshotSource::Upload => "upload",
        SnapshotSource::Ssh => "ssh",
        SnapshotSource::PrePush => "pre_push",
    }
}

fn source_from_str(raw: &str) -> SnapshotSource {
    match raw {
        "upload" => SnapshotSource::Upload,
        "ssh" => SnapshotSource::Ssh,
        "pre_push" => SnapshotSource::PrePush,
        _ => SnapshotSource::Manual,
    }
}

fn row_to_snapshot(row: &Row) -> Result<ConfigSnapshot, DbError> {
    let taken_at: DateTime<Utc> = parse_ts(row.get::<String>(5)?)?;
    Ok(ConfigSnapshot {
        id: row.get(0)?,
        device_id: row.get(1)?,
        raw_config: row.get(2)?,
        config_hash: row.get(3)?,
        source: source_from_str(&row.get::<String>(4)?),
        taken_at,
    })
}
