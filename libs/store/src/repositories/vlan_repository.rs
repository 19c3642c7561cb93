use crate::errors::DbError;
use crate::StoreClient;
use libsql::{params, Row};
use netval_model::DeviceVlan;
use tracing::instrument;

pub struct DeviceVlanRepository {
    client: StoreClient,
}

impl DeviceVlanRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn upsert(&self, vlan: &DeviceVlan) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        conn.execute(
            "INSERT INTO device_vlans (device_id, vlan_id, name) VALUES (?1, ?2, ?3)
             ON CONFLICT(device_id, vlan_id) DO UPDATE SET name = excluded.name",
            params![vlan.device_id.clone(), vlan.vlan_id, vlan.name.clone()],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_by_device(&self, device_id: &str) -> Result<Vec<DeviceVlan>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query("SELECT device_id, vlan_id, name FROM device_vlans WHERE device_id = ?1 ORDER BY vlan_id ASC", params![device_id])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_vlan(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, device_id: &str, vlan_id: u16) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        conn.execute("DELETE FROM device_vlans WHERE device_id = ?1 AND vlan_id = ?2", params![device_id, vlan_id]).await?;
        Ok(())
    }
}

fn row_to_vlan(row: &Row) -> Result<DeviceVlan, DbError> {
    Ok(DeviceVlan {
        device_id: row.get(0)?,
        vlan_id: row.get::<i64>(1)? as u16,
        name: row.get(2)?,
    })
}
