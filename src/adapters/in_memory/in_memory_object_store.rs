// In memory implementation of the ObjectStore port.
//
// Purpose
// - Exercise the change poller without a running object store.
//
// Responsibilities
// - Store records per bucket, listed in key order like an S3 listing.
// - Simulate an unreachable store through an offline switch.

use crate::core::object_record::ObjectRecord;
use crate::core::ports::{ObjectStore, ObjectStoreError};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryObjectStore {
    buckets: RwLock<HashMap<String, BTreeMap<String, ObjectRecord>>>,
    is_offline: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
    }

    /// Stores the record, creating the bucket when missing and replacing an existing key.
    pub async fn put(&self, bucket: &str, record: ObjectRecord) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(record.key.clone(), record);
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), ObjectStoreError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(ObjectStoreError::Backend("Object store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError> {
        self.ensure_online()?;
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectRecord>, ObjectStoreError> {
        self.ensure_online()?;
        let guard = self.buckets.read().await;
        let records = guard
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::Backend(format!("NoSuchBucket: {bucket}")))?;
        Ok(records.values().cloned().collect())
    }
}
