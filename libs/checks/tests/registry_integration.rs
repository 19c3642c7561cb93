//! Runs the full default check registry against a small assembled topology,
//! the way the server's simulation job does, rather than exercising one
//! check in isolation.

use netval_checks::{aggregate, assemble, default_registry, reachability_matrix, run_registry, DEFAULT_CHECK_BUDGET};
use netval_model::{Device, DeviceRole, DeviceVlan, Link, LinkMedium, LinkState};
use std::collections::BTreeMap;

fn device(id: &str, hostname: &str, role: DeviceRole) -> Device {
    Device {
        id: id.into(),
        project_id: "p1".into(),
        hostname: hostname.into(),
        role,
        vendor: "Cisco".into(),
        platform: "IOS-XE".into(),
        management_ip: None,
        canvas_x: 0.0,
        canvas_y: 0.0,
        credential_ref: None,
        config_hash: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

fn link(id: &str, source: &str, target: &str, allow_list: &[u16]) -> Link {
    Link {
        id: id.into(),
        project_id: "p1".into(),
        source_device_id: source.into(),
        source_interface: "Gi1/0/1".into(),
        target_device_id: target.into(),
        target_interface: "Gi1/0/1".into(),
        medium: LinkMedium::Ethernet,
        vlan_allow_list: allow_list.iter().copied().collect(),
        state: LinkState::Connected,
    }
}

/// A two-switch topology with a deliberate VLAN continuity gap: the trunk
/// allows VLAN 30 but only the `core` switch's VLAN database carries it.
#[test]
fn full_registry_run_surfaces_the_seeded_gap_and_every_check_reports() {
    let devices = vec![device("access", "ACCESS-SW", DeviceRole::Switch), device("core", "CORE-SW", DeviceRole::Switch)];
    let vlans = vec![
        DeviceVlan { device_id: "access".into(), vlan_id: 10, name: "DATA".into() },
        DeviceVlan { device_id: "core".into(), vlan_id: 10, name: "DATA".into() },
        DeviceVlan { device_id: "core".into(), vlan_id: 30, name: "MGMT".into() },
    ];
    let links = vec![link("l1", "access", "core", &[10, 30])];

    let graph = assemble(&devices, &[], &vlans, &links, &BTreeMap::new());
    let registry = default_registry();
    assert_eq!(registry.len(), 8, "the registry must run all eight checks in fixed order");

    let mut events = Vec::new();
    let findings = run_registry(&graph, &registry, DEFAULT_CHECK_BUDGET, |event| events.push(event));

    // Every registered check produced at least one result.
    let distinct_check_ids: std::collections::BTreeSet<_> = findings.iter().map(|f| f.check_id.clone()).collect();
    assert_eq!(distinct_check_ids.len(), registry.len());

    let continuity_failure = findings
        .iter()
        .find(|f| f.check_id == "VLAN_CONTINUITY" && !f.passed)
        .expect("the seeded VLAN 30 gap must be reported");
    assert_eq!(continuity_failure.device_id.as_deref(), Some("access"));

    let matrix = reachability_matrix(&graph);
    assert_eq!(matrix.get("ACCESS-SW", "CORE-SW"), Some(true));
    assert_eq!(matrix.get("CORE-SW", "ACCESS-SW"), Some(true));

    let result = aggregate("p1".to_string(), findings, matrix, chrono::Utc::now());
    assert_eq!(result.project_id, "p1");
    assert!(!result.findings.is_empty());
}

#[test]
fn repeated_runs_over_the_same_topology_produce_identical_findings() {
    let devices = vec![device("a", "SW-A", DeviceRole::Switch), device("b", "SW-B", DeviceRole::Switch)];
    let vlans = vec![
        DeviceVlan { device_id: "a".into(), vlan_id: 10, name: "DATA".into() },
        DeviceVlan { device_id: "b".into(), vlan_id: 10, name: "DATA".into() },
    ];
    let links = vec![link("l1", "a", "b", &[10])];
    let graph = assemble(&devices, &[], &vlans, &links, &BTreeMap::new());
    let registry = default_registry();

    let first = run_registry(&graph, &registry, DEFAULT_CHECK_BUDGET, |_| {});
    let second = run_registry(&graph, &registry, DEFAULT_CHECK_BUDGET, |_| {});

    let first_details: Vec<_> = first.iter().map(|f| (f.check_id.clone(), f.passed, f.detail.clone())).collect();
    let second_details: Vec<_> = second.iter().map(|f| (f.check_id.clone(), f.passed, f.detail.clone())).collect();
    assert_eq!(first_details, second_details, "the deterministic tie-breaking must make two runs byte-identical");
}
