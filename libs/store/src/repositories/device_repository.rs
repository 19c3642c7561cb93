use crate::errors::DbError;
use crate::repositories::project_repository::parse_ts;
use crate::StoreClient;
use libsql::{params, Row};
use netval_model::{Device, DeviceRole};
use tracing::instrument;
use uuid::Uuid;

pub struct DeviceRepository {
    client: StoreClient,
}

impl DeviceRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        project_id: &str,
        hostname: &str,
        role: DeviceRole,
        vendor: &str,
        platform: &str,
        management_ip: Option<&str>,
    ) -> Result<Device, DbError> {
        let conn = self.client.connection().await?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO devices (id, project_id, hostname, role, vendor, platform, management_ip)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id.clone(), project_id, hostname, role_to_str(role), vendor, platform, management_ip],
        )
        .await?;
        self.get(&id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Device, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, project_id, hostname, role, vendor, platform, management_ip,
                        canvas_x, canvas_y, credential_ref, config_hash, created_at, updated_at
                 FROM devices WHERE id = ?1",
                params![id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "device", id: id.to_string() })?;
        row_to_device(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_by_project(&self, project_id: &str) -> Result<Vec<Device>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, project_id, hostname, role, vendor, platform, management_ip,
                        canvas_x, canvas_y, credential_ref, config_hash, created_at, updated_at
                 FROM devices WHERE project_id = ?1 ORDER BY hostname ASC",
                params![project_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_device(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn update_canvas_position(&self, id: &str, x: f64, y: f64) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn
            .execute(
                "UPDATE devices SET canvas_x = ?2, canvas_y = ?3, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id, x, y],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "device", id: id.to_string() });
        }
        Ok(())
    }

    #[instrument(skip(self, credential_ref))]
    pub async fn set_credential_ref(&self, id: &str, credential_ref: Option<&str>) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn
            .execute(
                "UPDATE devices SET credential_ref = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id, credential_ref],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "device", id: id.to_string() });
        }
        Ok(())
    }

    /// Records the content-hash of a device's most recent full config, used to
    /// detect drift between what the store believes is live and what was last
    /// fetched or pushed.
    #[instrument(skip(self))]
    pub async fn set_config_hash(&self, id: &str, config_hash: &str) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn
            .execute(
                "UPDATE devices SET config_hash = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id, config_hash],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "device", id: id.to_string() });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn.execute("DELETE FROM devices WHERE id = ?1", params![id]).await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "device", id: id.to_string() });
        }
        Ok(())
    }
}

pub(crate) fn role_to_str(role: DeviceRole) -> &'static str {
    match role {
        DeviceRole::Switch => "switch",
        DeviceRole::Router => "router",
        DeviceRole::Wlc => "wlc",
        DeviceRole::Ap => "ap",
        DeviceRole::Firewall => "firewall",
        DeviceRole::Endpoint => "endpoint",
    }
}

pub(crate) fn role_from_str(raw: &str) -> Result<DeviceRole, DbError> {
    Ok(match raw {
        "switch" => DeviceRole::Switch,
        "router" => DeviceRole::Router,
        "wlc" => DeviceRole::Wlc,
        "ap" => DeviceRole::Ap,
        "firewall" => DeviceRole::Firewall,
        "endpoint" => DeviceRole::Endpoint,
        other => return Err(DbError::Mapping(format!("unknown device role '{other}'"))),
    })
}

fn row_to_device(row: &Row) -> Result<Device, DbError> {
    Ok(Device {
        id: row.get(0)?,
        project_id: row.get(1)?,
        hostname: row.get(2)?,
        role: role_from_str(&row.get::<String>(3)?)?,
        vendor: row.get(4)?,
        platform: row.get(5)?,
        management_ip: row.get(6)?,
        canvas_x: row.get(7)?,
        canvas_y: row.get(8)?,
        credential_ref: row.get(9)?,
        config_hash: row.get(10)?,
        created_at: parse_ts(row.get::<String>(11)?)?,
        updated_at: parse_ts(row.get::<String>(12)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::ProjectRepository;

    async fn test_client() -> StoreClient {
        StoreClient::connect("file::memory:?cache=shared").await.expect("connect")
    }

    #[tokio::test]
    async fn creates_a_device_under_a_project() {
        let client = test_client().await;
        let project = ProjectRepository::new(client.clone()).create("Campus A", None).await.expect("project");
        let devices = DeviceRepository::new(client);
        let device = devices
            .create(&project.id, "core-sw-01", DeviceRole::Switch, "Cisco", "IOS-XE", Some("10.0.0.1"))
            .await
            .expect("device");
        assert_eq!(device.hostname, "core-sw-01");
        assert!(device.config_hash.is_none());
    }
}
