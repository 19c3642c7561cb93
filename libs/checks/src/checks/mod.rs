//! The registered checks. Each submodule is one named variant of the
//! [`crate::registry::Check`] sum type; `crate::registry::default_registry`
//! fixes their run order.

pub mod dhcp_reachability;
pub mod duplex_mismatch;
pub mod mgmt_ssh_path;
pub mod routing_blackhole;
pub mod trunk_native_mismatch;
pub mod vlan_continuity;
pub mod vlan_orphan_svi;
pub mod wlc_join_chain;
