use serde::{Deserialize, Serialize};

/// Composite key `(device_id, vlan_id)`; represents a VLAN's presence
/// in a device's VLAN database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceVlan {
    pub device_id: String,
    pub vlan_id: u16,
    pub name: String,
}

/// 802.1Q legal VLAN range.
pub const VLAN_ID_MIN: u16 = 1;
pub const VLAN_ID_MAX: u16 = 4094;

pub fn is_legal_vlan_id(id: u16) -> bool {
    (VLAN_ID_MIN..=VLAN_ID_MAX).contains(&id)
}
