// Shared test fixture for object listing entries.
// Compiled into the crate only during tests (cfg(test) in src/lib.rs).

use crate::core::object_record::ObjectRecord;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;

// JSON -> DTO (listing entry shape)
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRecordDto {
    pub key: String,
    pub last_modified: String,
    pub size: u64,
}

pub struct ObjectRecordBuilder {
    inner: ObjectRecord,
}

impl Default for ObjectRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl ObjectRecordBuilder {
    pub fn new() -> Self {
        let json_str =
            fs::read_to_string("./src/test_support/fixtures/objects/json/object_record.json").unwrap();
        let dto: ObjectRecordDto = serde_json::from_str(&json_str).unwrap();

        Self {
            inner: ObjectRecord {
                key: dto.key,
                last_modified: DateTime::parse_from_rfc3339(&dto.last_modified)
                    .unwrap()
                    .with_timezone(&Utc),
                size: dto.size,
            },
        }
    }

    pub fn key(mut self, v: impl Into<String>) -> Self {
        self.inner.key = v.into();
        self
    }

    pub fn last_modified(mut self, v: DateTime<Utc>) -> Self {
        self.inner.last_modified = v;
        self
    }

    pub fn size(mut self, v: u64) -> Self {
        self.inner.size = v;
        self
    }

    pub fn build(self) -> ObjectRecord {
        self.inner
    }
}
