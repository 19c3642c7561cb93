use crate::errors::DbError;
use crate::repositories::interface_repository::{decode_vlan_set, encode_vlan_set};
use crate::StoreClient;
use libsql::{params, Row};
use netval_model::{Link, LinkMedium, LinkState};
use tracing::instrument;
use uuid::Uuid;

pub struct LinkRepository {
    client: StoreClient,
}

impl LinkRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        project_id: &str,
        source_device_id: &str,
        source_interface: &str,
        target_device_id: &str,
        target_interface: &str,
        medium: LinkMedium,
    ) -> Result<Link, DbError> {
        let conn = self.client.connection().await?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO links (id, project_id, source_device_id, source_interface, target_device_id, target_interface, medium)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id.clone(), project_id, source_device_id, source_interface, target_device_id, target_interface, medium_to_str(medium)],
        )
        .await?;
        self.get(&id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Link, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, project_id, source_device_id, source_interface, target_device_id, target_interface, medium, vlan_allow_list, state
                 FROM links WHERE id = ?1",
                params![id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "link", id: id.to_string() })?;
        row_to_link(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_by_project(&self, project_id: &str) -> Result<Vec<Link>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, project_id, source_device_id, source_interface, target_device_id, target_interface, medium, vlan_allow_list, state
                 FROM links WHERE project_id = ?1 ORDER BY id ASC",
                params![project_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_link(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn set_vlan_allow_list(&self, id: &str, allow_list: &std::collections::BTreeSet<u16>) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn
            .execute("UPDATE links SET vlan_allow_list = ?2 WHERE id = ?1", params![id, encode_vlan_set(allow_list)])
            .await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "link", id: id.to_string() });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_state(&self, id: &str, state: LinkState) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn.execute("UPDATE links SET state = ?2 WHERE id = ?1", params![id, state_to_str(state)]).await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "link", id: id.to_string() });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn.execute("DELETE FROM links WHERE id = ?1", params![id]).await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "link", id: id.to_string() });
        }
        Ok(())
    }
}

fn medium_to_str(medium: LinkMedium) -> &'static str {
    match medium {
        LinkMedium::Ethernet => "ethernet",
        LinkMedium::Fiber => "fiber",
    }
}

fn medium_from_str(raw: &str) -> LinkMedium {
    match raw {
        "fiber" => LinkMedium::Fiber,
        _ => LinkMedium::Ethernet,
    }
}

fn state_to_str(state: LinkState) -> &'static str {
    match state {
        LinkState::Pending => "pending",
        LinkState::Connected => "connected",
        LinkState::Misconfigured => "misconfigured",
    }
}

fn state_from_str(raw: &str) -> LinkState {
    match raw {
        "connected" => LinkState::Connected,
        "misconfigured" => LinkState::Misconfigured,
        _ => LinkState::Pending,
    }
}

fn row_to_link(row: &Row) -> Result<Link, DbError> {
    Ok(Link {
        id: row.get(0)?,
        project_id: row.get(1)?,
        source_device_id: row.get(2)?,
        source_interface: row.get(3)?,
        target_device_id: row.get(4)?,
        target_interface: row.get(5)?,
        medium: medium_from_str(&row.get::<String>(6)?),
        vlan_allow_list: decode_vlan_set(&row.get::<String>(7)?),
        state: state_from_str(&row.get::<String>(8)?),
    })
}
