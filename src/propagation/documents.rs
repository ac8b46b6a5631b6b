//! Per-subscriber policy and provisioning documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::derivation::Snssai;

/// Hex key form of an SNSSAI, e.g. `01010203` for SST 1 / SD "010203".
pub fn snssai_key(snssai: &Snssai) -> String {
    format!("{:02x}{}", snssai.sst, snssai.sd.as_deref().unwrap_or(""))
}

/// Uplink/downlink bit rate pair in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambr {
    pub uplink: String,
    pub downlink: String,
}

/// Access-and-mobility policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmPolicyData {
    pub ue_id: String,
    pub subsc_cats: Vec<String>,
}

impl AmPolicyData {
    pub fn new(ue_id: String) -> Self {
        Self { ue_id, subsc_cats: vec!["console".to_string()] }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmPolicyDnnData {
    pub dnn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmPolicySnssaiData {
    pub snssai: Snssai,
    pub sm_policy_dnn_data: BTreeMap<String, SmPolicyDnnData>,
}

/// Session-management policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmPolicyData {
    pub ue_id: String,
    pub sm_policy_snssai_data: BTreeMap<String, SmPolicySnssaiData>,
}

impl SmPolicyData {
    pub fn new(ue_id: String, snssai: &Snssai, dnns: &[String]) -> Self {
        let dnn_data = dnns
            .iter()
            .map(|dnn| (dnn.clone(), SmPolicyDnnData { dnn: dnn.clone() }))
            .collect();
        let mut snssai_data = BTreeMap::new();
        snssai_data.insert(
            snssai_key(snssai),
            SmPolicySnssaiData { snssai: snssai.clone(), sm_policy_dnn_data: dnn_data },
        );
        Self { ue_id, sm_policy_snssai_data: snssai_data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nssai {
    pub default_single_nssais: Vec<Snssai>,
}

/// Provisioned access-and-mobility subscription data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmData {
    pub ue_id: String,
    pub serving_plmn_id: String,
    pub nssai: Nssai,
    pub subscribed_ue_ambr: Ambr,
}

impl AmData {
    pub fn new(ue_id: String, serving_plmn_id: String, snssai: &Snssai, ambr: Ambr) -> Self {
        Self {
            ue_id,
            serving_plmn_id,
            nssai: Nssai { default_single_nssais: vec![snssai.clone()] },
            subscribed_ue_ambr: ambr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArpPriority {
    pub priority_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmQosProfile {
    #[serde(rename = "5qi")]
    pub five_qi: u8,
    pub arp: ArpPriority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnnConfiguration {
    pub session_ambr: Ambr,
    #[serde(rename = "5gQosProfile")]
    pub qos_profile: SmQosProfile,
}

/// Provisioned session-management subscription data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmData {
    pub ue_id: String,
    pub serving_plmn_id: String,
    pub single_nssai: Snssai,
    pub dnn_configurations: BTreeMap<String, DnnConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnnInfo {
    pub dnn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnssaiInfo {
    pub dnn_infos: Vec<DnnInfo>,
}

/// SMF selection subscription data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmfSelectionData {
    pub ue_id: String,
    pub serving_plmn_id: String,
    pub subscribed_snssai_infos: BTreeMap<String, SnssaiInfo>,
}

impl SmfSelectionData {
    pub fn new(ue_id: String, serving_plmn_id: String, snssai: &Snssai, dnns: &[String]) -> Self {
        let mut infos = BTreeMap::new();
        infos.insert(
            snssai_key(snssai),
            SnssaiInfo {
                dnn_infos: dnns.iter().map(|dnn| DnnInfo { dnn: dnn.clone() }).collect(),
            },
        );
        Self { ue_id, serving_plmn_id, subscribed_snssai_infos: infos }
    }
}
