//! Shared by the manual/upload config endpoints and the SSH ingest job:
//! persists a raw configuration blob as a snapshot, parses it, and upserts
//! the interfaces/VLANs it describes into the topology store.

use crate::error::ApiError;
use crate::state::AppState;
use netval_model::{ConfigSnapshot, DeviceVlan, Interface, ParsedDevice, SnapshotSource};

pub async fn persist_parsed_config(
    state: &AppState,
    device_id: &str,
    raw_config: &str,
    source: SnapshotSource,
) -> Result<(ConfigSnapshot, ParsedDevice), ApiError> {
    let snapshot = state.snapshots.insert(device_id, raw_config, source).await?;
    state.devices.set_config_hash(device_id, &snapshot.config_hash).await?;

    let parsed = netval_parser::parse_running_config(raw_config);

    for parsed_interface in &parsed.interfaces {
        let interface = Interface {
            id: String::new(),
            device_id: device_id.to_string(),
            name: parsed_interface.name.clone(),
            description: parsed_interface.description.clone(),
            mode: parsed_interface.mode,
            vlan_access: parsed_interface.vlan_access,
            vlan_trunk_allowed: parsed_interface.vlan_trunk_allowed.clone(),
            native_vlan: parsed_interface.native_vlan,
            ip_address: parsed_interface.ip_address.clone(),
            ip_mask: parsed_interface.ip_mask.clone(),
            dhcp_helper: parsed_interface.dhcp_helper.clone(),
            duplex: parsed_interface.duplex,
            state: parsed_interface.state,
        };
        state.interfaces.upsert(device_id, &interface).await?;
    }

    for parsed_vlan in &parsed.vlans {
        let vlan = DeviceVlan { device_id: device_id.to_string(), vlan_id: parsed_vlan.id, name: parsed_vlan.name.clone() };
        state.vlans.upsert(&vlan).await?;
    }

    Ok((snapshot, parsed))
}
