//! Assembles a project's topology graph from the store, re-parsing each
//! device's latest configuration to recover the static routes the
//! persisted model doesn't carry as its own entity.

use crate::error::ApiError;
use crate::state::AppState;
use netval_model::SnapshotSource;
use netval_checks::TopologyGraph;
use std::collections::BTreeMap;

pub async fn load_graph(state: &AppState, project_id: &str) -> Result<TopologyGraph, ApiError> {
    let devices = state.devices.list_by_project(project_id).await?;

    let mut interfaces = Vec::new();
    let mut vlans = Vec::new();
    let mut static_routes_by_device = BTreeMap::new();

    for device in &devices {
        interfaces.extend(state.interfaces.list_by_device(&device.id).await?);
        vlans.extend(state.vlans.list_by_device(&device.id).await?);

        let snapshots = state.snapshots.list_by_device(&device.id).await?;
        if let Some(latest) = snapshots.into_iter().find(|s| s.source != SnapshotSource::PrePush) {
            let parsed = netval_parser::parse_running_config(&latest.raw_config);
            static_routes_by_device.insert(device.id.clone(), parsed.static_routes);
        }
    }

    let links = state.links.list_by_project(project_id).await?;
    Ok(netval_checks::assemble(&devices, &interfaces, &vlans, &links, &static_routes_by_device))
}
