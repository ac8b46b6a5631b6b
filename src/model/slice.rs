//! Network slice documents.

use serde::{Deserialize, Serialize};

/// Public Land Mobile Network identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Plmn {
    /// Mobile country code, e.g. "001".
    pub mcc: String,
    /// Mobile network code, e.g. "01".
    pub mnc: String,
}

/// Slice/service type identifier pair.
///
/// SST arrives as a numeric string; a slice whose SST does not parse as an
/// integer in [0, 255] is excluded from every SNSSAI-keyed derived view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceId {
    pub sst: String,
    /// Slice differentiator. Empty string means absent.
    #[serde(default)]
    pub sd: String,
}

/// A radio access node with its tracking area code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GNodeB {
    pub name: String,
    pub tac: u32,
}

/// User plane function reference.
///
/// Stored as loose key-value pairs by the management API, so both keys are
/// optional and the port is kept in its raw string form until parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upf {
    #[serde(rename = "upf-name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "upf-port", default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

/// Site topology of a slice: PLMN, radio nodes, and the optional UPF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub plmn: Plmn,
    #[serde(rename = "gNodeBs", default)]
    pub g_node_bs: Vec<GNodeB>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upf: Option<Upf>,
}

/// QoS traffic class attached to a filtering rule or an IP domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficClass {
    /// QCI / 5QI value.
    pub qci: u8,
    /// ARP priority level.
    pub arp: u8,
}

/// Application filtering rule, translated into a PCC rule by derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppFilterRule {
    pub rule_name: String,
    pub priority: u32,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub endpoint: String,
    /// IP protocol number (6 = TCP, 17 = UDP).
    pub protocol: u8,
    #[serde(default)]
    pub start_port: u16,
    #[serde(default)]
    pub end_port: u16,
    pub app_mbr_uplink: u64,
    pub app_mbr_downlink: u64,
    /// Unit of the MBR values ("bps", "kbps", "mbps", "gbps").
    pub bitrate_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_class: Option<TrafficClass>,
}

/// A network slice as edited by operators.
///
/// Exactly one record per slice name. Device groups are referenced by name
/// and owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    pub slice_name: String,
    pub slice_id: SliceId,
    pub site_info: SiteInfo,
    #[serde(default)]
    pub site_device_group: Vec<String>,
    #[serde(default)]
    pub application_filtering_rules: Vec<AppFilterRule>,
}

impl Slice {
    /// Whether this slice references the named device group.
    pub fn references_group(&self, group_name: &str) -> bool {
        self.site_device_group.iter().any(|g| g == group_name)
    }
}
