use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceMode {
    Access,
    Trunk,
    Routed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceState {
    Up,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duplex {
    Full,
    Half,
    Auto,
}

/// Names are unique within a device, enforced at the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub id: String,
    pub device_id: String,
    pub name: String,
    pub description: Option<String>,
    pub mode: InterfaceMode,
    pub vlan_access: Option<u16>,
    pub vlan_trunk_allowed: BTreeSet<u16>,
    /// `switchport trunk native vlan <n>`, meaningful only on trunk ports.
    pub native_vlan: Option<u16>,
    pub ip_address: Option<String>,
    pub ip_mask: Option<String>,
    /// `ip helper-address <ip>` on an SVI: where DHCP requests on this VLAN
    /// are forwarded.
    pub dhcp_helper: Option<String>,
    pub duplex: Option<Duplex>,
    pub state: InterfaceState,
}

impl Interface {
    /// An SVI is an interface named `Vlan<N>` carrying an IP address.
    pub fn is_svi(&self) -> bool {
        self.name.to_ascii_lowercase().starts_with("vlan") && self.ip_address.is_some()
    }

    /// Extracts `N` from an SVI name `Vlan<N>`, if this is one.
    pub fn svi_vlan_id(&self) -> Option<u16> {
        if !self.is_svi() {
            return None;
        }
        self.name
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .ok()
    }
}
