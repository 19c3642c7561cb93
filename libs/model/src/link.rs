use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMedium {
    Ethernet,
    Fiber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Pending,
    Connected,
    Misconfigured,
}

/// Undirected in semantics even though endpoints are ordered fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub project_id: String,
    pub source_device_id: String,
    pub source_interface: String,
    pub target_device_id: String,
    pub target_interface: String,
    pub medium: LinkMedium,
    pub vlan_allow_list: BTreeSet<u16>,
    pub state: LinkState,
}

impl Link {
    /// The interface name on `device_id`'s side of this link, if it is an endpoint.
    pub fn interface_on(&self, device_id: &str) -> Option<&str> {
        if device_id == self.source_device_id {
            Some(&self.source_interface)
        } else if device_id == self.target_device_id {
            Some(&self.target_interface)
        } else {
            None
        }
    }

    /// The device at the other end of this link from `device_id`.
    pub fn other_end(&self, device_id: &str) -> Option<&str> {
        if device_id == self.source_device_id {
            Some(&self.target_device_id)
        } else if device_id == self.target_device_id {
            Some(&self.source_device_id)
        } else {
            None
        }
    }
}
