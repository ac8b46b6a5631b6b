//! Typed access to the raw configuration collections.

use std::sync::Arc;

use serde_json::Value;

use crate::model::{DeviceGroup, Plmn, Slice};
use crate::store::{DocumentStore, StoreError, DEVICE_GROUP_COLL, SLICE_COLL};

/// Subscriber id in its stored form, e.g. `imsi-001010123456789`.
pub fn ue_id(imsi: &str) -> String {
    format!("imsi-{imsi}")
}

/// Serving PLMN in its stored form, e.g. `00101`.
pub fn serving_plmn(plmn: &Plmn) -> String {
    format!("{}{}", plmn.mcc, plmn.mnc)
}

/// Key for provisioned-data documents, scoped by subscriber and PLMN.
pub fn provisioned_key(imsi: &str, plmn: &Plmn) -> String {
    format!("{}/{}", ue_id(imsi), serving_plmn(plmn))
}

/// Typed wrapper over the raw slice and device-group collections.
///
/// Read-many calls tolerate individually undecodable documents: the bad
/// record is logged and skipped, the rest of the collection is returned.
#[derive(Clone)]
pub struct RawConfigStore {
    store: Arc<dyn DocumentStore>,
}

impl RawConfigStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The underlying document store.
    pub fn backend(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// All slice documents.
    pub async fn slices(&self) -> Result<Vec<Slice>, StoreError> {
        let docs = self.store.list(SLICE_COLL).await?;
        Ok(decode_all(SLICE_COLL, docs))
    }

    /// All device group documents.
    pub async fn device_groups(&self) -> Result<Vec<DeviceGroup>, StoreError> {
        let docs = self.store.list(DEVICE_GROUP_COLL).await?;
        Ok(decode_all(DEVICE_GROUP_COLL, docs))
    }

    /// One slice by name.
    pub async fn slice(&self, name: &str) -> Result<Option<Slice>, StoreError> {
        match self.store.get(SLICE_COLL, name).await? {
            Some(doc) => Ok(Some(decode_one(SLICE_COLL, doc)?)),
            None => Ok(None),
        }
    }

    /// One device group by name.
    pub async fn device_group(&self, name: &str) -> Result<Option<DeviceGroup>, StoreError> {
        match self.store.get(DEVICE_GROUP_COLL, name).await? {
            Some(doc) => Ok(Some(decode_one(DEVICE_GROUP_COLL, doc)?)),
            None => Ok(None),
        }
    }

    /// Upsert a slice document.
    pub async fn put_slice(&self, slice: &Slice) -> Result<(), StoreError> {
        let doc = serde_json::to_value(slice).map_err(StoreError::Encode)?;
        self.store.put(SLICE_COLL, &slice.slice_name, doc).await
    }

    /// Upsert a device group document.
    pub async fn put_device_group(&self, group: &DeviceGroup) -> Result<(), StoreError> {
        let doc = serde_json::to_value(group).map_err(StoreError::Encode)?;
        self.store
            .put(DEVICE_GROUP_COLL, &group.device_group_name, doc)
            .await
    }

    /// Delete a slice document.
    pub async fn delete_slice(&self, name: &str) -> Result<(), StoreError> {
        self.store.delete(SLICE_COLL, name).await
    }

    /// Delete a device group document.
    pub async fn delete_device_group(&self, name: &str) -> Result<(), StoreError> {
        self.store.delete(DEVICE_GROUP_COLL, name).await
    }

    /// The slice currently referencing the named device group, if any.
    pub async fn owning_slice(&self, group_name: &str) -> Result<Option<Slice>, StoreError> {
        Ok(self
            .slices()
            .await?
            .into_iter()
            .find(|s| s.references_group(group_name)))
    }
}

fn decode_one<T: serde::de::DeserializeOwned>(
    collection: &str,
    doc: Value,
) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(|source| StoreError::Decode {
        collection: collection.to_string(),
        source,
    })
}

fn decode_all<T: serde::de::DeserializeOwned>(collection: &str, docs: Vec<Value>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(collection, error = %e, "Skipping undecodable document");
                None
            }
        })
        .collect()
}
