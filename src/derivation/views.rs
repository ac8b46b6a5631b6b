//! Derived view types served to other network functions.

use serde::{Deserialize, Serialize};

use crate::model::{IpDomain, Plmn, SliceId};

/// Slice/service type plus optional differentiator.
///
/// Absent SD is omitted from the serialized form entirely. Ordering is
/// (SST, SD) with absent SD first, which fixes the order of SNSSAI lists
/// in every grouped view.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Snssai {
    pub sst: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sd: Option<String>,
}

impl Snssai {
    /// Parse a raw slice id. `None` when the SST is empty, non-numeric, or
    /// outside [0, 255]; an empty SD becomes an absent one.
    pub fn parse(id: &SliceId) -> Option<Self> {
        let sst = id.sst.parse::<u8>().ok()?;
        let sd = if id.sd.is_empty() { None } else { Some(id.sd.clone()) };
        Some(Self { sst, sd })
    }
}

/// One PLMN with every SNSSAI used by a slice in that PLMN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlmnSnssaiEntry {
    #[serde(rename = "plmnId")]
    pub plmn_id: Plmn,
    #[serde(rename = "sNssaiList")]
    pub s_nssai_list: Vec<Snssai>,
}

/// Tracking areas of one (PLMN, SNSSAI) pair, merged across slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessAndMobilityEntry {
    #[serde(rename = "plmnId")]
    pub plmn_id: Plmn,
    pub snssai: Snssai,
    /// Decimal TAC strings, unique, ascending by numeric value.
    pub tacs: Vec<String>,
}

/// Resolved UPF endpoint of a slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpfInfo {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Session management view of one slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionManagementEntry {
    pub slice_name: String,
    pub plmn_id: Plmn,
    pub snssai: Snssai,
    /// IP domains resolved from the slice's device groups.
    pub ip_domain: Vec<IpDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upf: Option<UpfInfo>,
    pub gnb_names: Vec<String>,
}

/// Allocation and retention priority of a PCC rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arp {
    pub priority_level: u8,
    pub preempt_cap: String,
    pub preempt_vuln: String,
}

/// QoS block of a PCC rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PccQos {
    #[serde(rename = "5qi")]
    pub five_qi: u8,
    #[serde(rename = "maxbrUl", default, skip_serializing_if = "Option::is_none")]
    pub max_br_ul: Option<String>,
    #[serde(rename = "maxbrDl", default, skip_serializing_if = "Option::is_none")]
    pub max_br_dl: Option<String>,
    pub arp: Arp,
}

/// A single traffic flow governed by a PCC rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PccFlowInfo {
    pub flow_description: String,
    pub flow_direction: String,
    pub flow_status: String,
}

/// Policy and charging control rule derived from a filtering rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PccRule {
    pub rule_id: String,
    pub precedence: u32,
    pub qos: PccQos,
    pub flow_infos: Vec<PccFlowInfo>,
}

/// PCC rules of one (PLMN, SNSSAI) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyControlEntry {
    pub plmn_id: Plmn,
    pub snssai: Snssai,
    pub pcc_rules: Vec<PccRule>,
}

/// Display-form QoS of one device group's DNN, with its subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImsiQosEntry {
    pub dnn: String,
    pub device_group_name: String,
    pub imsis: Vec<String>,
    pub uplink: String,
    pub downlink: String,
    #[serde(rename = "5qi")]
    pub five_qi: u8,
    pub arp: u8,
}

/// The six derived views, produced together by one derivation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub plmn: Vec<Plmn>,
    pub plmn_snssai: Vec<PlmnSnssaiEntry>,
    pub access_and_mobility: Vec<AccessAndMobilityEntry>,
    pub session_management: Vec<SessionManagementEntry>,
    pub policy_control: Vec<PolicyControlEntry>,
    pub imsi_qos: Vec<ImsiQosEntry>,
}
