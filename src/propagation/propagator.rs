//! Affected-subscriber computation and the ordered write/delete chains.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::derivation::bitrate::{format_bitrate, to_bps};
use crate::derivation::Snssai;
use crate::model::{DeviceGroup, IpDomain, Plmn, Slice};
use crate::propagation::batch::BatchWriter;
use crate::propagation::documents::{
    Ambr, AmData, AmPolicyData, ArpPriority, DnnConfiguration, SmData, SmPolicyData, SmQosProfile,
    SmfSelectionData,
};
use crate::propagation::saga::{CompensationStack, PropagationError, PropagationStep};
use crate::store::raw::{provisioned_key, serving_plmn, ue_id};
use crate::store::{DocumentStore, RawConfigStore, StoreError};

const DEFAULT_5QI: u8 = 9;
const DEFAULT_ARP_PRIORITY: u8 = 1;
const DEFAULT_AMBR: &str = "1 Gbps";

/// The effective configuration written for every affected subscriber:
/// PLMN and SNSSAI from the owning slice, DNNs and QoS from the device
/// group's IP domains.
struct EffectiveConfig {
    plmn: Plmn,
    snssai: Snssai,
    dnns: Vec<String>,
    ambr: Ambr,
    dnn_configurations: BTreeMap<String, DnnConfiguration>,
}

impl EffectiveConfig {
    fn new(plmn: &Plmn, snssai: Snssai, domains: &[IpDomain]) -> Self {
        let mut dnn_configurations = BTreeMap::new();
        for domain in domains {
            let (session_ambr, qos_profile) = match &domain.ue_dnn_qos {
                Some(qos) => {
                    let (five_qi, arp) = match &qos.traffic_class {
                        Some(tc) => (tc.qci, tc.arp),
                        None => (DEFAULT_5QI, DEFAULT_ARP_PRIORITY),
                    };
                    (
                        Ambr {
                            uplink: format_bitrate(to_bps(qos.dnn_mbr_uplink, &qos.bitrate_unit)),
                            downlink: format_bitrate(to_bps(
                                qos.dnn_mbr_downlink,
                                &qos.bitrate_unit,
                            )),
                        },
                        SmQosProfile { five_qi, arp: ArpPriority { priority_level: arp } },
                    )
                }
                None => (default_ambr(), default_qos_profile()),
            };
            dnn_configurations
                .insert(domain.dnn.clone(), DnnConfiguration { session_ambr, qos_profile });
        }

        let ambr = dnn_configurations
            .values()
            .next()
            .map(|c| c.session_ambr.clone())
            .unwrap_or_else(default_ambr);

        Self {
            plmn: plmn.clone(),
            snssai,
            dnns: dnn_configurations.keys().cloned().collect(),
            ambr,
            dnn_configurations,
        }
    }
}

fn default_ambr() -> Ambr {
    Ambr { uplink: DEFAULT_AMBR.into(), downlink: DEFAULT_AMBR.into() }
}

fn default_qos_profile() -> SmQosProfile {
    SmQosProfile {
        five_qi: DEFAULT_5QI,
        arp: ArpPriority { priority_level: DEFAULT_ARP_PRIORITY },
    }
}

/// Keeps the five per-subscriber collections consistent with slice and
/// device-group membership.
///
/// Invoked synchronously by the write path, after the raw document is
/// persisted and while the raw-store guard is held.
pub struct SubscriberConsistencyPropagator {
    store: Arc<dyn DocumentStore>,
    raw: RawConfigStore,
    batch: BatchWriter,
}

impl SubscriberConsistencyPropagator {
    pub fn new(store: Arc<dyn DocumentStore>, chunk_size: usize) -> Self {
        Self {
            store: store.clone(),
            raw: RawConfigStore::new(store.clone()),
            batch: BatchWriter::new(store, chunk_size),
        }
    }

    /// Propagate a device-group create (`prev` None), update, or delete
    /// (`next` None).
    pub async fn device_group_changed(
        &self,
        prev: Option<&DeviceGroup>,
        next: Option<&DeviceGroup>,
    ) -> Result<(), PropagationError> {
        let Some(name) = next.or(prev).map(|g| g.device_group_name.as_str()) else {
            return Ok(());
        };

        let Some(slice) = self.raw.owning_slice(name).await? else {
            tracing::debug!(group = name, "Device group backs no slice; nothing to propagate");
            return Ok(());
        };
        let plmn = slice.site_info.plmn.clone();

        // Refresh every current member; the group backs a slice, so a QoS or
        // domain edit affects all of them, not just newly added ids.
        if let Some(next) = next {
            match Snssai::parse(&slice.slice_id) {
                Some(snssai) => {
                    let cfg = EffectiveConfig::new(&plmn, snssai, &next.ip_domain_expanded);
                    self.write_chain(&next.imsis, &cfg).await?;
                }
                None => {
                    tracing::warn!(
                        slice = %slice.slice_name,
                        group = name,
                        "Owning slice has unparsable SST; member refresh skipped"
                    );
                }
            }
        }

        // Retract members no longer present in the group
        let removed: Vec<String> = prev
            .map(|p| {
                p.imsis
                    .iter()
                    .filter(|imsi| next.map_or(true, |n| !n.has_imsi(imsi)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if !removed.is_empty() {
            tracing::info!(group = name, removed = removed.len(), "Retracting departed members");
            self.delete_chain(&removed, &plmn).await?;
        }

        Ok(())
    }

    /// Propagate a slice create (`prev` None), update, or delete
    /// (`next` None).
    pub async fn slice_changed(
        &self,
        prev: Option<&Slice>,
        next: Option<&Slice>,
    ) -> Result<(), PropagationError> {
        if let Some(next) = next {
            match Snssai::parse(&next.slice_id) {
                Some(snssai) => {
                    for group_name in &next.site_device_group {
                        let Some(group) = self.raw.device_group(group_name).await? else {
                            tracing::debug!(
                                slice = %next.slice_name,
                                group = %group_name,
                                "Referenced device group missing; skipped"
                            );
                            continue;
                        };
                        let cfg = EffectiveConfig::new(
                            &next.site_info.plmn,
                            snssai.clone(),
                            &group.ip_domain_expanded,
                        );
                        self.write_chain(&group.imsis, &cfg).await?;
                    }
                }
                None => {
                    tracing::warn!(
                        slice = %next.slice_name,
                        sst = %next.slice_id.sst,
                        "Slice has unparsable SST; subscriber refresh skipped"
                    );
                }
            }
        }

        // Groups the slice no longer references (or all groups on delete)
        if let Some(prev) = prev {
            for group_name in &prev.site_device_group {
                if next.is_some_and(|n| n.references_group(group_name)) {
                    continue;
                }
                let Some(group) = self.raw.device_group(group_name).await? else {
                    continue;
                };
                tracing::info!(
                    slice = %prev.slice_name,
                    group = %group_name,
                    members = group.imsis.len(),
                    "Retracting subscribers of detached device group"
                );
                self.delete_chain(&group.imsis, &prev.site_info.plmn).await?;
            }
        }

        Ok(())
    }

    /// Ordered write chain over all five collections, bulk per collection.
    async fn write_chain(
        &self,
        imsis: &[String],
        cfg: &EffectiveConfig,
    ) -> Result<(), PropagationError> {
        if imsis.is_empty() {
            return Ok(());
        }

        let mut stack = CompensationStack::new(self.store.clone());
        for step in PropagationStep::ORDER {
            let mut docs = Vec::with_capacity(imsis.len());
            for imsi in imsis {
                let key = step_key(step, imsi, &cfg.plmn);
                let doc = match build_document(step, imsi, cfg) {
                    Ok(doc) => doc,
                    Err(e) => return fail(step, e, stack).await,
                };
                if let Err(e) = stack.backup(step.collection(), &key).await {
                    return fail(step, e, stack).await;
                }
                docs.push((key, doc));
            }

            if let Err(e) = self.batch.write(step.collection(), docs).await {
                return fail(step, e, stack).await;
            }
            tracing::debug!(step = %step, subscribers = imsis.len(), "Propagation step committed");
        }

        Ok(())
    }

    /// Ordered delete chain, same order and compensation as writes.
    async fn delete_chain(
        &self,
        imsis: &[String],
        plmn: &Plmn,
    ) -> Result<(), PropagationError> {
        if imsis.is_empty() {
            return Ok(());
        }

        let mut stack = CompensationStack::new(self.store.clone());
        for step in PropagationStep::ORDER {
            for imsi in imsis {
                let key = step_key(step, imsi, plmn);
                if let Err(e) = stack.backup(step.collection(), &key).await {
                    return fail(step, e, stack).await;
                }
                if let Err(e) = self.store.delete(step.collection(), &key).await {
                    return fail(step, e, stack).await;
                }
            }
            tracing::debug!(step = %step, subscribers = imsis.len(), "Retraction step committed");
        }

        Ok(())
    }
}

/// Unwind the compensation stack, then report the failed step. When the
/// unwind itself breaks, the error carries the restoration failure too.
async fn fail(
    step: PropagationStep,
    source: StoreError,
    stack: CompensationStack,
) -> Result<(), PropagationError> {
    tracing::error!(step = %step, error = %source, "Propagation step failed, unwinding");
    match stack.unwind().await {
        Ok(()) => Err(PropagationError::Step { step, source }),
        Err((undo_collection, undo_key, undo_source)) => {
            tracing::error!(
                collection = %undo_collection,
                key = %undo_key,
                error = %undo_source,
                "Rollback failed; manual reconciliation required"
            );
            Err(PropagationError::Rollback { step, source, undo_collection, undo_key, undo_source })
        }
    }
}

fn step_key(step: PropagationStep, imsi: &str, plmn: &Plmn) -> String {
    match step {
        PropagationStep::AmPolicy | PropagationStep::SmPolicy => ue_id(imsi),
        PropagationStep::AmData | PropagationStep::SmData | PropagationStep::SmfSelection => {
            provisioned_key(imsi, plmn)
        }
    }
}

fn build_document(
    step: PropagationStep,
    imsi: &str,
    cfg: &EffectiveConfig,
) -> Result<Value, StoreError> {
    let uid = ue_id(imsi);
    let plmn_id = serving_plmn(&cfg.plmn);
    let doc = match step {
        PropagationStep::AmPolicy => serde_json::to_value(AmPolicyData::new(uid)),
        PropagationStep::SmPolicy => {
            serde_json::to_value(SmPolicyData::new(uid, &cfg.snssai, &cfg.dnns))
        }
        PropagationStep::AmData => {
            serde_json::to_value(AmData::new(uid, plmn_id, &cfg.snssai, cfg.ambr.clone()))
        }
        PropagationStep::SmData => serde_json::to_value(SmData {
            ue_id: uid,
            serving_plmn_id: plmn_id,
            single_nssai: cfg.snssai.clone(),
            dnn_configurations: cfg.dnn_configurations.clone(),
        }),
        PropagationStep::SmfSelection => {
            serde_json::to_value(SmfSelectionData::new(uid, plmn_id, &cfg.snssai, &cfg.dnns))
        }
    };
    doc.map_err(StoreError::Encode)
}
