use crate::errors::DbError;
use crate::StoreClient;
use libsql::{params, Row};
use netval_model::{Duplex, Interface, InterfaceMode, InterfaceState};
use std::collections::BTreeSet;
use tracing::instrument;
use uuid::Uuid;

pub struct InterfaceRepository {
    client: StoreClient,
}

impl InterfaceRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Inserts or fully replaces the interface named `interface.name` on
    /// `device_id` — config ingestion always supplies the complete interface,
    /// never a partial patch.
    #[instrument(skip(self, interface))]
    pub async fn upsert(&self, device_id: &str, interface: &Interface) -> Result<Interface, DbError> {
        let conn = self.client.connection().await?;
        let existing_id: Option<String> = {
            let mut rows = conn
                .query("SELECT id FROM interfaces WHERE device_id = ?1 AND name = ?2", params![device_id, interface.name.clone()])
                .await?;
            match rows.next().await? {
                Some(row) => Some(row.get(0)?),
                None => None,
            }
        };

        let id = existing_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let trunk_allowed = encode_vlan_set(&interface.vlan_trunk_allowed);

        let duplex = interface.duplex.map(duplex_to_str);

        if existing_id.is_some() {
            conn.execute(
                "UPDATE interfaces SET description = ?2, mode = ?3, vlan_access = ?4, vlan_trunk_allowed = ?5,
                    native_vlan = ?6, ip_address = ?7, ip_mask = ?8, dhcp_helper = ?9, duplex = ?10, state = ?11 WHERE id = ?1",
                params![
                    id.clone(),
                    interface.description.clone(),
                    mode_to_str(interface.mode),
                    interface.vlan_access,
                    trunk_allowed,
                    interface.native_vlan,
                    interface.ip_address.clone(),
                    interface.ip_mask.clone(),
                    interface.dhcp_helper.clone(),
                    duplex,
                    state_to_str(interface.state),
                ],
            )
            .await?;
        } else {
            conn.execute(
                "INSERT INTO interfaces (id, device_id, name, description, mode, vlan_access, vlan_trunk_allowed,
                    native_vlan, ip_address, ip_mask, dhcp_helper, duplex, state)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    id.clone(),
                    device_id,
                    interface.name.clone(),
                    interface.description.clone(),
                    mode_to_str(interface.mode),
                    interface.vlan_access,
                    trunk_allowed,
                    interface.native_vlan,
                    interface.ip_address.clone(),
                    interface.ip_mask.clone(),
                    interface.dhcp_helper.clone(),
                    duplex,
                    state_to_str(interface.state),
                ],
            )
            .await?;
        }

        self.get(&id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Interface, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, device_id, name, description, mode, vlan_access, vlan_trunk_allowed,
                        native_vlan, ip_address, ip_mask, dhcp_helper, duplex, state
                 FROM interfaces WHERE id = ?1",
                params![id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| DbError::NotFound { entity: "interface", id: id.to_string() })?;
        row_to_interface(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_by_device(&self, device_id: &str) -> Result<Vec<Interface>, DbError> {
        let conn = self.client.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, device_id, name, description, mode, vlan_access, vlan_trunk_allowed,
                        native_vlan, ip_address, ip_mask, dhcp_helper, duplex, state
                 FROM interfaces WHERE device_id = ?1 ORDER BY name ASC",
                params![device_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_interface(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let conn = self.client.connection().await?;
        let affected = conn.execute("DELETE FROM interfaces WHERE id = ?1", params![id]).await?;
        if affected == 0 {
            return Err(DbError::NotFound { entity: "interface", id: id.to_string() });
        }
        Ok(())
    }
}

pub(crate) fn encode_vlan_set(set: &BTreeSet<u16>) -> String {
    set.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

pub(crate) fn decode_vlan_set(raw: &str) -> BTreeSet<u16> {
    raw.split(',').filter_map(|s| s.trim().parse().ok()).collect()
}

fn mode_to_str(mode: InterfaceMode) -> &'static str {
    match mode {
        InterfaceMode::Access => "access",
        InterfaceMode::Trunk => "trunk",
        InterfaceMode::Routed => "routed",
        InterfaceMode::Unknown => "unknown",
    }
}

fn mode_from_str(raw: &str) -> InterfaceMode {
    match raw {
        "access" => InterfaceMode::Access,
        "trunk" => InterfaceMode::Trunk,
        "routed" => InterfaceMode::Routed,
        _ => InterfaceMode::Unknown,
    }
}

fn state_to_str(state: InterfaceState) -> &'static str {
    match state {
        InterfaceState::Up => "up",
        InterfaceState::Down => "down",
        InterfaceState::Unknown => "unknown",
    }
}

fn state_from_str(raw: &str) -> InterfaceState {
    match raw {
        "up" => InterfaceState::Up,
        "down" => InterfaceState::Down,
        _ => InterfaceState::Unknown,
    }
}

fn duplex_to_str(duplex: Duplex) -> &'static str {
    match duplex {
        Duplex::Full => "full",
        Duplex::Half => "half",
        Duplex::Auto => "auto",
    }
}

fn duplex_from_str(raw: &str) -> Option<Duplex> {
    match raw {
        "full" => Some(Duplex::Full),
        "half" => Some(Duplex::Half),
        "auto" => Some(Duplex::Auto),
        _ => None,
    }
}

fn row_to_interface(row: &Row) -> Result<Interface, DbError> {
    Ok(Interface {
        id: row.get(0)?,
        device_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        mode: mode_from_str(&row.get::<String>(4)?),
        vlan_access: row.get::<Option<i64>>(5)?.map(|v| v as u16),
        vlan_trunk_allowed: decode_vlan_set(&row.get::<String>(6)?),
        native_vlan: row.get::<Option<i64>>(7)?.map(|v| v as u16),
        ip_address: row.get(8)?,
        ip_mask: row.get(9)?,
        dhcp_helper: row.get(10)?,
        duplex: row.get::<Option<String>>(11)?.and_then(|s| duplex_from_str(&s)),
        state: state_from_str(&row.get::<String>(12)?),
    })
}
