//! Turns a simulation job's failed findings into a [`RemediationPlan`]: one
//! [`RemediationItem`] per finding, rendered from a per-check-id CLI template.
//! Checks this planner has no template for are skipped rather than failing
//! the whole plan — a plan covering a subset of findings is still useful.

use netval_model::{CheckResult, RemediationItem};

pub fn plan_items(findings: &[CheckResult]) -> Vec<RemediationItem> {
    findings.iter().filter(|finding| !finding.passed).filter_map(item_for_finding).collect()
}

fn item_for_finding(finding: &CheckResult) -> Option<RemediationItem> {
    let Some(device_id) = finding.device_id.clone() else { return None; };

    let (cli_patch, rollback_cli) = match finding.check_id.as_str() {
        "VLAN_CONTINUITY" | "VLAN_ORPHAN_SVI" => {
            let vlan_id = extract_vlan_id(&finding.detail)?;
            (format!("vlan {vlan_id}\n name VLAN{vlan_id}"), format!("no vlan {vlan_id}"))
        }
        "TRUNK_NATIVE_MISMATCH" => {
            let interface = finding.interface.clone()?;
            let vlan_id = extract_vlan_id(&finding.detail)?;
            (
                format!("interface {interface}\n switchport trunk native vlan {vlan_id}"),
                format!("interface {interface}\n no switchport trunk native vlan {vlan_id}"),
            )
        }
        "MGMT_SSH_PATH" => {
            let interface = finding.interface.clone()?;
            (format!("interface {interface}\n no shutdown"), format!("interface {interface}\n shutdown"))
        }
        "DUPLEX_MISMATCH" => {
            let interface = finding.interface.clone()?;
            (format!("interface {interface}\n duplex auto"), format!("interface {interface}\n duplex half"))
        }
        "WLC_JOIN_CHAIN" => {
            let interface = finding.interface.clone()?;
            // The check already computed the exact trunk-allow fix; reuse it
            // rather than re-deriving it, and invert `add` to `remove` for
            // the rollback half.
            let fix = finding.suggested_fix.clone()?;
            let rollback_fix = fix.replacen("vlan add", "vlan remove", 1);
            (format!("interface {interface}\n {fix}"), format!("interface {interface}\n {rollback_fix}"))
        }
        "ROUTING_BLACKHOLE" | "DHCP_REACHABILITY" => return None,
        _ => return None,
    };

    Some(RemediationItem {
        device_id,
        interface: finding.interface.clone(),
        source_check_id: finding.check_id.clone(),
        cli_patch,
        rollback_cli,
        approved: false,
    })
}

/// Pulls the first bare integer out of a finding's free-text detail, which is
/// where the checks embed the VLAN id (e.g. "VLAN 20 present on ..."). Not a
/// general-purpose parser — just enough to recover the templating parameter.
fn extract_vlan_id(detail: &str) -> Option<u16> {
    detail.split(|c: char| !c.is_ascii_digit()).find(|token| !token.is_empty()).and_then(|token| token.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_model::Severity;

    fn failing(check_id: &str, device_id: &str, interface: Option<&str>, detail: &str) -> CheckResult {
        CheckResult {
            check_id: check_id.to_string(),
            severity: Severity::Error,
            passed: false,
            device_id: Some(device_id.to_string()),
            interface: interface.map(str::to_string),
            detail: detail.to_string(),
            suggested_fix: None,
        }
    }

    fn failing_with_fix(check_id: &str, device_id: &str, interface: Option<&str>, detail: &str, suggested_fix: &str) -> CheckResult {
        CheckResult { suggested_fix: Some(suggested_fix.to_string()), ..failing(check_id, device_id, interface, detail) }
    }

    #[test]
    fn vlan_continuity_failure_produces_patch_and_inverse() {
        let findings = vec![failing("VLAN_CONTINUITY", "dev-1", None, "VLAN 20 missing on dev-1")];
        let items = plan_items(&findings);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].cli_patch, "vlan 20\n name VLAN20");
        assert_eq!(items[0].rollback_cli, "no vlan 20");
        assert!(!items[0].approved);
    }

    #[test]
    fn passing_findings_produce_no_items() {
        let mut finding = failing("VLAN_CONTINUITY", "dev-1", None, "VLAN 20 missing");
        finding.passed = true;
        assert!(plan_items(&[finding]).is_empty());
    }

    #[test]
    fn unrecognized_check_ids_are_skipped_not_errored() {
        let findings = vec![failing("ROUTING_BLACKHOLE", "dev-1", None, "no route to 10.0.0.0/24")];
        assert!(plan_items(&findings).is_empty());
    }

    #[test]
    fn wlc_join_chain_failure_reuses_the_checks_own_suggested_fix() {
        let findings = vec![failing_with_fix(
            "WLC_JOIN_CHAIN",
            "swc",
            Some("Gi1/0/1"),
            "AP VLAN 20 missing from trunk at hop 2, between SW-ACCESS and SW-CORE",
            "switchport trunk allowed vlan add 20",
        )];
        let items = plan_items(&findings);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].cli_patch, "interface Gi1/0/1\n switchport trunk allowed vlan add 20");
        assert_eq!(items[0].rollback_cli, "interface Gi1/0/1\n switchport trunk allowed vlan remove 20");
    }
}
