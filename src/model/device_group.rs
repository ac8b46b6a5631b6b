//! Device group documents.

use serde::{Deserialize, Serialize};

use crate::model::slice::TrafficClass;

/// Per-DNN QoS profile of an IP domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UeDnnQos {
    pub dnn_mbr_uplink: u64,
    pub dnn_mbr_downlink: u64,
    pub bitrate_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_class: Option<TrafficClass>,
}

/// IP domain profile shared by every subscriber of a device group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpDomain {
    pub dnn: String,
    pub dns_primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_secondary: Option<String>,
    pub ue_ip_pool: String,
    pub mtu: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ue_dnn_qos: Option<UeDnnQos>,
}

/// A named set of subscribers sharing IP-domain and QoS configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    pub device_group_name: String,
    #[serde(default)]
    pub imsis: Vec<String>,
    #[serde(default)]
    pub ip_domain_expanded: Vec<IpDomain>,
}

impl DeviceGroup {
    /// Whether the group holds the given subscriber.
    pub fn has_imsi(&self, imsi: &str) -> bool {
        self.imsis.iter().any(|i| i == imsi)
    }
}
