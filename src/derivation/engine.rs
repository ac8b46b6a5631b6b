//! The derivation pass itself.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::derivation::bitrate::{format_bitrate, to_bps};
use crate::derivation::views::{
    AccessAndMobilityEntry, Arp, ImsiQosEntry, PccFlowInfo, PccQos, PccRule, PlmnSnssaiEntry,
    PolicyControlEntry, SessionManagementEntry, Snssai, UpfInfo, ViewSnapshot,
};
use crate::model::{AppFilterRule, DeviceGroup, Plmn, Slice};
use crate::observability::metrics;

const FLOW_DIRECTION_BIDIRECTIONAL: &str = "BIDIRECTIONAL";
const FLOW_STATUS_ENABLED: &str = "ENABLED";
const PREEMPT_CAP: &str = "NOT_PREEMPT";
const PREEMPT_VULN: &str = "NOT_PREEMPTABLE";

const DEFAULT_RULE_ID: &str = "DefaultRule";
const DEFAULT_RULE_PRECEDENCE: u32 = 255;
const DEFAULT_5QI: u8 = 9;
const DEFAULT_ARP_PRIORITY: u8 = 1;

/// Derive all six views from the full raw configuration set.
///
/// Pure function of its inputs. Per-record problems (unparsable SST or UPF
/// port, dangling device-group references) skip only the affected item and
/// are logged; the call itself never fails.
pub fn derive_all(slices: &[Slice], device_groups: &[DeviceGroup]) -> ViewSnapshot {
    ViewSnapshot {
        plmn: derive_plmn(slices),
        plmn_snssai: derive_plmn_snssai(slices),
        access_and_mobility: derive_access_and_mobility(slices),
        session_management: derive_session_management(slices, device_groups),
        policy_control: derive_policy_control(slices),
        imsi_qos: derive_imsi_qos(device_groups),
    }
}

/// Distinct PLMNs across all slices, sorted by (MCC, MNC).
///
/// Every slice contributes here, even one with an unparsable SST.
fn derive_plmn(slices: &[Slice]) -> Vec<Plmn> {
    slices
        .iter()
        .map(|s| s.site_info.plmn.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// SNSSAI values per PLMN, deduplicated and sorted.
fn derive_plmn_snssai(slices: &[Slice]) -> Vec<PlmnSnssaiEntry> {
    let mut grouped: BTreeMap<Plmn, BTreeSet<Snssai>> = BTreeMap::new();
    for (slice, snssai) in valid_snssai_slices(slices) {
        grouped
            .entry(slice.site_info.plmn.clone())
            .or_default()
            .insert(snssai);
    }

    grouped
        .into_iter()
        .map(|(plmn_id, set)| PlmnSnssaiEntry {
            plmn_id,
            s_nssai_list: set.into_iter().collect(),
        })
        .collect()
}

/// Union of TACs per (PLMN, SNSSAI), rendered as decimal strings.
fn derive_access_and_mobility(slices: &[Slice]) -> Vec<AccessAndMobilityEntry> {
    let mut grouped: BTreeMap<(Plmn, Snssai), BTreeSet<u32>> = BTreeMap::new();
    for (slice, snssai) in valid_snssai_slices(slices) {
        let tacs = grouped
            .entry((slice.site_info.plmn.clone(), snssai))
            .or_default();
        for gnb in &slice.site_info.g_node_bs {
            tacs.insert(gnb.tac);
        }
    }

    grouped
        .into_iter()
        .map(|((plmn_id, snssai), tacs)| AccessAndMobilityEntry {
            plmn_id,
            snssai,
            tacs: tacs.into_iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

/// Per-slice session view: resolved IP domains, UPF endpoint, radio nodes.
fn derive_session_management(
    slices: &[Slice],
    device_groups: &[DeviceGroup],
) -> Vec<SessionManagementEntry> {
    let groups_by_name: HashMap<&str, &DeviceGroup> = device_groups
        .iter()
        .map(|g| (g.device_group_name.as_str(), g))
        .collect();

    let mut entries: Vec<SessionManagementEntry> = valid_snssai_slices(slices)
        .map(|(slice, snssai)| {
            let mut ip_domain = Vec::new();
            for name in &slice.site_device_group {
                match groups_by_name.get(name.as_str()) {
                    Some(group) => ip_domain.extend(group.ip_domain_expanded.iter().cloned()),
                    None => {
                        tracing::debug!(
                            slice = %slice.slice_name,
                            group = %name,
                            "Device group reference does not resolve"
                        );
                    }
                }
            }

            SessionManagementEntry {
                slice_name: slice.slice_name.clone(),
                plmn_id: slice.site_info.plmn.clone(),
                snssai,
                ip_domain,
                upf: resolve_upf(slice),
                gnb_names: slice
                    .site_info
                    .g_node_bs
                    .iter()
                    .map(|g| g.name.clone())
                    .collect(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.slice_name.cmp(&b.slice_name));
    entries
}

/// PCC rules per (PLMN, SNSSAI); a slice without filtering rules contributes
/// the built-in default rule instead of nothing.
fn derive_policy_control(slices: &[Slice]) -> Vec<PolicyControlEntry> {
    let mut grouped: BTreeMap<(Plmn, Snssai), Vec<PccRule>> = BTreeMap::new();
    for (slice, snssai) in valid_snssai_slices(slices) {
        let rules = grouped
            .entry((slice.site_info.plmn.clone(), snssai))
            .or_default();
        if slice.application_filtering_rules.is_empty() {
            rules.push(default_pcc_rule());
        } else {
            rules.extend(slice.application_filtering_rules.iter().map(pcc_rule));
        }
    }

    grouped
        .into_iter()
        .map(|((plmn_id, snssai), mut pcc_rules)| {
            pcc_rules.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
            PolicyControlEntry { plmn_id, snssai, pcc_rules }
        })
        .collect()
}

/// One entry per QoS-bearing IP domain of each device group.
fn derive_imsi_qos(device_groups: &[DeviceGroup]) -> Vec<ImsiQosEntry> {
    let mut entries: Vec<ImsiQosEntry> = Vec::new();
    for group in device_groups {
        for domain in &group.ip_domain_expanded {
            let Some(qos) = &domain.ue_dnn_qos else { continue };
            let (five_qi, arp) = match &qos.traffic_class {
                Some(tc) => (tc.qci, tc.arp),
                None => (DEFAULT_5QI, DEFAULT_ARP_PRIORITY),
            };
            entries.push(ImsiQosEntry {
                dnn: domain.dnn.clone(),
                device_group_name: group.device_group_name.clone(),
                imsis: group.imsis.clone(),
                uplink: format_bitrate(to_bps(qos.dnn_mbr_uplink, &qos.bitrate_unit)),
                downlink: format_bitrate(to_bps(qos.dnn_mbr_downlink, &qos.bitrate_unit)),
                five_qi,
                arp,
            });
        }
    }

    entries.sort_by(|a, b| (&a.dnn, &a.device_group_name).cmp(&(&b.dnn, &b.device_group_name)));
    entries
}

/// Slices with a parsable SNSSAI; the rest are logged and skipped.
fn valid_snssai_slices<'a>(
    slices: &'a [Slice],
) -> impl Iterator<Item = (&'a Slice, Snssai)> + 'a {
    slices.iter().filter_map(|slice| match Snssai::parse(&slice.slice_id) {
        Some(snssai) => Some((slice, snssai)),
        None => {
            tracing::warn!(
                slice = %slice.slice_name,
                sst = %slice.slice_id.sst,
                "Skipping slice with unparsable SST"
            );
            metrics::record_derivation_skip("sst");
            None
        }
    })
}

/// UPF block: requires a hostname; a bad port drops the port, not the block.
fn resolve_upf(slice: &Slice) -> Option<UpfInfo> {
    let upf = slice.site_info.upf.as_ref()?;
    let hostname = upf.name.as_ref().filter(|n| !n.is_empty())?.clone();
    let port = match upf.port.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<u16>() {
            Ok(p) if p > 0 => Some(p),
            _ => {
                tracing::warn!(
                    slice = %slice.slice_name,
                    port = %raw,
                    "Skipping unparsable UPF port"
                );
                metrics::record_derivation_skip("upf_port");
                None
            }
        },
    };
    Some(UpfInfo { hostname, port })
}

fn protocol_name(protocol: u8) -> &'static str {
    match protocol {
        6 => "tcp",
        17 => "udp",
        _ => "ip",
    }
}

fn pcc_rule(rule: &AppFilterRule) -> PccRule {
    let (five_qi, arp_priority) = match &rule.traffic_class {
        Some(tc) => (tc.qci, tc.arp),
        None => (DEFAULT_5QI, DEFAULT_ARP_PRIORITY),
    };

    PccRule {
        rule_id: rule.rule_name.clone(),
        precedence: rule.priority,
        qos: PccQos {
            five_qi,
            max_br_ul: Some(format_bitrate(to_bps(rule.app_mbr_uplink, &rule.bitrate_unit))),
            max_br_dl: Some(format_bitrate(to_bps(rule.app_mbr_downlink, &rule.bitrate_unit))),
            arp: Arp {
                priority_level: arp_priority,
                preempt_cap: PREEMPT_CAP.to_string(),
                preempt_vuln: PREEMPT_VULN.to_string(),
            },
        },
        flow_infos: vec![PccFlowInfo {
            flow_description: format!(
                "permit out {} from any to assigned {}-{}",
                protocol_name(rule.protocol),
                rule.start_port,
                rule.end_port
            ),
            flow_direction: FLOW_DIRECTION_BIDIRECTIONAL.to_string(),
            flow_status: FLOW_STATUS_ENABLED.to_string(),
        }],
    }
}

fn default_pcc_rule() -> PccRule {
    PccRule {
        rule_id: DEFAULT_RULE_ID.to_string(),
        precedence: DEFAULT_RULE_PRECEDENCE,
        qos: PccQos {
            five_qi: DEFAULT_5QI,
            max_br_ul: None,
            max_br_dl: None,
            arp: Arp {
                priority_level: DEFAULT_ARP_PRIORITY,
                preempt_cap: PREEMPT_CAP.to_string(),
                preempt_vuln: PREEMPT_VULN.to_string(),
            },
        },
        flow_infos: vec![PccFlowInfo {
            flow_description: "permit out ip from any to assigned".to_string(),
            flow_direction: FLOW_DIRECTION_BIDIRECTIONAL.to_string(),
            flow_status: FLOW_STATUS_ENABLED.to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GNodeB, SiteInfo, SliceId, TrafficClass, Upf};

    fn plmn(mcc: &str, mnc: &str) -> Plmn {
        Plmn { mcc: mcc.into(), mnc: mnc.into() }
    }

    fn slice(name: &str, sst: &str, sd: &str, mcc: &str, mnc: &str) -> Slice {
        Slice {
            slice_name: name.into(),
            slice_id: SliceId { sst: sst.into(), sd: sd.into() },
            site_info: SiteInfo {
                plmn: plmn(mcc, mnc),
                g_node_bs: vec![],
                upf: None,
            },
            site_device_group: vec![],
            application_filtering_rules: vec![],
        }
    }

    #[test]
    fn test_plmn_dedup_and_order() {
        let slices = vec![
            slice("s3", "1", "", "310", "410"),
            slice("s1", "1", "", "001", "01"),
            slice("s2", "2", "", "001", "01"),
        ];
        let plmns = derive_plmn(&slices);
        assert_eq!(plmns, vec![plmn("001", "01"), plmn("310", "410")]);
    }

    #[test]
    fn test_invalid_sst_keeps_plmn_only() {
        let slices = vec![slice("s1", "bad", "", "001", "01")];
        let snapshot = derive_all(&slices, &[]);
        assert_eq!(snapshot.plmn.len(), 1);
        assert!(snapshot.plmn_snssai.is_empty());
        assert!(snapshot.access_and_mobility.is_empty());
        assert!(snapshot.policy_control.is_empty());
        assert!(snapshot.session_management.is_empty());
    }

    #[test]
    fn test_snssai_dedup_within_plmn() {
        let slices = vec![
            slice("s1", "1", "01", "001", "01"),
            slice("s2", "1", "01", "001", "01"),
            slice("s3", "2", "", "001", "01"),
        ];
        let entries = derive_plmn_snssai(&slices);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].s_nssai_list,
            vec![
                Snssai { sst: 1, sd: Some("01".into()) },
                Snssai { sst: 2, sd: None },
            ]
        );
    }

    #[test]
    fn test_tac_union_across_slices() {
        let mut a = slice("a", "1", "01", "001", "01");
        a.site_info.g_node_bs = vec![
            GNodeB { name: "gnb1".into(), tac: 1 },
            GNodeB { name: "gnb2".into(), tac: 2 },
        ];
        let mut b = slice("b", "1", "01", "001", "01");
        b.site_info.g_node_bs = vec![
            GNodeB { name: "gnb3".into(), tac: 2 },
            GNodeB { name: "gnb4".into(), tac: 3 },
        ];

        let entries = derive_access_and_mobility(&[a, b]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tacs, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_tacs_sort_numerically() {
        let mut a = slice("a", "1", "", "001", "01");
        a.site_info.g_node_bs = vec![
            GNodeB { name: "g1".into(), tac: 100 },
            GNodeB { name: "g2".into(), tac: 20 },
            GNodeB { name: "g3".into(), tac: 3 },
        ];
        let entries = derive_access_and_mobility(&[a]);
        assert_eq!(entries[0].tacs, vec!["3", "20", "100"]);
    }

    #[test]
    fn test_upf_bad_port_keeps_hostname() {
        let mut s = slice("s1", "1", "", "001", "01");
        s.site_info.upf = Some(Upf {
            name: Some("upf.local".into()),
            port: Some("not-a-port".into()),
        });
        let upf = resolve_upf(&s).unwrap();
        assert_eq!(upf.hostname, "upf.local");
        assert!(upf.port.is_none());

        s.site_info.upf = Some(Upf { name: Some("upf.local".into()), port: Some("8805".into()) });
        assert_eq!(resolve_upf(&s).unwrap().port, Some(8805));

        // No hostname, no block
        s.site_info.upf = Some(Upf { name: None, port: Some("8805".into()) });
        assert!(resolve_upf(&s).is_none());
    }

    #[test]
    fn test_unresolved_group_reference_is_skipped() {
        let mut s = slice("s1", "1", "", "001", "01");
        s.site_device_group = vec!["missing".into()];
        let entries = derive_session_management(&[s], &[]);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ip_domain.is_empty());
    }

    #[test]
    fn test_default_pcc_rule_when_no_filtering_rules() {
        let s = slice("s1", "1", "", "001", "01");
        let entries = derive_policy_control(&[s]);
        assert_eq!(entries.len(), 1);
        let rules = &entries[0].pcc_rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_id, "DefaultRule");
        assert_eq!(rules[0].precedence, 255);
        assert_eq!(rules[0].flow_infos[0].flow_description, "permit out ip from any to assigned");
    }

    #[test]
    fn test_pcc_rule_translation() {
        let mut s = slice("s1", "1", "", "001", "01");
        s.application_filtering_rules = vec![AppFilterRule {
            rule_name: "allow-video".into(),
            priority: 10,
            action: "permit".into(),
            endpoint: "0.0.0.0/0".into(),
            protocol: 6,
            start_port: 443,
            end_port: 443,
            app_mbr_uplink: 10,
            app_mbr_downlink: 100,
            bitrate_unit: "mbps".into(),
            traffic_class: Some(TrafficClass { qci: 8, arp: 6 }),
        }];

        let entries = derive_policy_control(&[s]);
        let rule = &entries[0].pcc_rules[0];
        assert_eq!(rule.rule_id, "allow-video");
        assert_eq!(rule.precedence, 10);
        assert_eq!(rule.qos.five_qi, 8);
        assert_eq!(rule.qos.arp.priority_level, 6);
        assert_eq!(rule.qos.max_br_ul.as_deref(), Some("10 Mbps"));
        assert_eq!(rule.qos.max_br_dl.as_deref(), Some("100 Mbps"));
        assert_eq!(
            rule.flow_infos[0].flow_description,
            "permit out tcp from any to assigned 443-443"
        );
        assert_eq!(rule.flow_infos[0].flow_direction, "BIDIRECTIONAL");
        assert_eq!(rule.flow_infos[0].flow_status, "ENABLED");
    }

    #[test]
    fn test_protocol_names() {
        assert_eq!(protocol_name(6), "tcp");
        assert_eq!(protocol_name(17), "udp");
        assert_eq!(protocol_name(132), "ip");
    }
}
