//! Shared fixtures and failure injection for integration testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use config_console::model::{
    AppFilterRule, DeviceGroup, GNodeB, IpDomain, Plmn, SiteInfo, Slice, SliceId, TrafficClass,
    UeDnnQos, Upf,
};
use config_console::store::{DocumentStore, MemoryStore, StoreError};

/// Build a slice with the given identity and topology.
#[allow(dead_code)]
pub fn slice(name: &str, sst: &str, sd: &str, mcc: &str, mnc: &str, tacs: &[u32]) -> Slice {
    Slice {
        slice_name: name.into(),
        slice_id: SliceId { sst: sst.into(), sd: sd.into() },
        site_info: SiteInfo {
            plmn: Plmn { mcc: mcc.into(), mnc: mnc.into() },
            g_node_bs: tacs
                .iter()
                .enumerate()
                .map(|(i, tac)| GNodeB { name: format!("{name}-gnb{i}"), tac: *tac })
                .collect(),
            upf: Some(Upf { name: Some(format!("upf.{name}")), port: Some("8805".into()) }),
        },
        site_device_group: vec![],
        application_filtering_rules: vec![],
    }
}

/// Build a device group with one QoS-bearing IP domain.
#[allow(dead_code)]
pub fn device_group(name: &str, dnn: &str, imsis: Vec<String>) -> DeviceGroup {
    DeviceGroup {
        device_group_name: name.into(),
        imsis,
        ip_domain_expanded: vec![IpDomain {
            dnn: dnn.into(),
            dns_primary: "8.8.8.8".into(),
            dns_secondary: None,
            ue_ip_pool: "10.250.0.0/16".into(),
            mtu: 1460,
            ue_dnn_qos: Some(UeDnnQos {
                dnn_mbr_uplink: 20,
                dnn_mbr_downlink: 200,
                bitrate_unit: "mbps".into(),
                traffic_class: Some(TrafficClass { qci: 9, arp: 6 }),
            }),
        }],
    }
}

/// A filtering rule for policy-control tests.
#[allow(dead_code)]
pub fn filter_rule(name: &str, priority: u32, protocol: u8) -> AppFilterRule {
    AppFilterRule {
        rule_name: name.into(),
        priority,
        action: "permit".into(),
        endpoint: "0.0.0.0/0".into(),
        protocol,
        start_port: 80,
        end_port: 443,
        app_mbr_uplink: 10,
        app_mbr_downlink: 50,
        bitrate_unit: "mbps".into(),
        traffic_class: Some(TrafficClass { qci: 8, arp: 6 }),
    }
}

/// A store wrapper that fails selected operations on demand and records
/// every bulk call, for failure injection and chunking assertions.
#[derive(Default)]
#[allow(dead_code)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_lists: AtomicU32,
    fail_puts: Mutex<HashMap<String, u32>>,
    fail_deletes: Mutex<HashMap<String, u32>>,
    list_delay: Mutex<Option<Duration>>,
    pub list_calls: AtomicU32,
    pub bulk_calls: Mutex<Vec<(String, usize)>>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` list calls with a store-unavailable error.
    pub fn fail_next_lists(&self, n: u32) {
        self.fail_lists.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` put/put_many calls against one collection.
    pub fn fail_next_puts(&self, collection: &str, n: u32) {
        self.fail_puts.lock().unwrap().insert(collection.to_string(), n);
    }

    /// Fail the next `n` delete calls against one collection.
    pub fn fail_next_deletes(&self, collection: &str, n: u32) {
        self.fail_deletes.lock().unwrap().insert(collection.to_string(), n);
    }

    /// Slow every list call down, to widen the in-flight sync window.
    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    fn should_fail(map: &Mutex<HashMap<String, u32>>, collection: &str) -> bool {
        let mut map = map.lock().unwrap();
        match map.get_mut(collection) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .fail_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Unavailable("injected list failure".into()));
        }
        self.inner.list(collection).await
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        if Self::should_fail(&self.fail_puts, collection) {
            return Err(StoreError::Unavailable("injected put failure".into()));
        }
        self.inner.put(collection, key, doc).await
    }

    async fn put_many(
        &self,
        collection: &str,
        docs: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        if Self::should_fail(&self.fail_puts, collection) {
            return Err(StoreError::Unavailable("injected bulk failure".into()));
        }
        self.bulk_calls
            .lock()
            .unwrap()
            .push((collection.to_string(), docs.len()));
        self.inner.put_many(collection, docs).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        if Self::should_fail(&self.fail_deletes, collection) {
            return Err(StoreError::Unavailable("injected delete failure".into()));
        }
        self.inner.delete(collection, key).await
    }
}
