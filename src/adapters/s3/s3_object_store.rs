// ObjectStore adapter backed by aws-sdk-s3.
//
// Purpose
// - Talk to MinIO or any other S3-compatible endpoint with static credentials.
//
// Responsibilities
// - Check bucket existence with HeadBucket.
// - Walk every ListObjectsV2 page and map entries to ObjectRecord.

use crate::config::StoreConfig;
use crate::core::object_record::ObjectRecord;
use crate::core::ports::{ObjectStore, ObjectStoreError};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::DateTime as S3DateTime;
use aws_sdk_s3::types::Object;
use chrono::{DateTime, Utc};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(store: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            store.access_key.clone(),
            store.secret_key.clone(),
            None,
            None,
            "realtime-sync-static",
        );
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(store.region.clone()))
            .endpoint_url(store.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Self::new(Client::from_conf(config))
    }
}

fn to_chrono(at: &S3DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(at.secs(), at.subsec_nanos())
}

fn to_record(object: &Object) -> Option<ObjectRecord> {
    let Some(key) = object.key() else {
        warn!("skipping listing entry without a key");
        return None;
    };
    let Some(last_modified) = object.last_modified().and_then(to_chrono) else {
        warn!(key, "skipping listing entry without a usable last modified time");
        return None;
    };
    let size = object.size().unwrap_or_default().max(0) as u64;
    Some(ObjectRecord::new(key, last_modified, size))
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(ObjectStoreError::Backend(DisplayErrorContext(&e).to_string())),
        }
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectRecord>, ObjectStoreError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut records = Vec::new();
        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|e| ObjectStoreError::Backend(DisplayErrorContext(&e).to_string()))?;
            records.extend(page.contents().iter().filter_map(to_record));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod s3_object_store_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_map_a_complete_listing_entry() {
        let object = Object::builder()
            .key("datasets/a.parquet")
            .last_modified(S3DateTime::from_secs(1_700_000_000))
            .size(42)
            .build();
        let record = to_record(&object).expect("entry should map");
        assert_eq!(record.key, "datasets/a.parquet");
        assert_eq!(record.last_modified.timestamp(), 1_700_000_000);
        assert_eq!(record.size, 42);
    }

    #[rstest]
    fn it_should_keep_sub_second_precision() {
        let object = Object::builder()
            .key("a")
            .last_modified(S3DateTime::from_millis(1_700_000_000_250))
            .build();
        let record = to_record(&object).unwrap();
        assert_eq!(record.last_modified.timestamp_millis(), 1_700_000_000_250);
        assert_eq!(record.size, 0);
    }

    #[rstest]
    fn it_should_skip_entries_without_key_or_timestamp() {
        let no_key = Object::builder()
            .last_modified(S3DateTime::from_secs(1))
            .build();
        let no_time = Object::builder().key("a").build();
        assert!(to_record(&no_key).is_none());
        assert!(to_record(&no_time).is_none());
    }
}
