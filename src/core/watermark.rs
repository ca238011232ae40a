// Watermark separating already synchronized objects from pending ones.
//
// Purpose
// - Decide which listed objects are changes.
//
// Responsibilities
// - Only move forward in time.
// - Compare strictly: an object modified exactly at the watermark is not a change.

use crate::core::object_record::ObjectRecord;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }

    /// Moves the watermark to `at`. Returns false and leaves it untouched when `at` is earlier.
    pub fn advance_to(&mut self, at: DateTime<Utc>) -> bool {
        if at < self.0 {
            return false;
        }
        self.0 = at;
        true
    }

    pub fn is_passed_by(&self, record: &ObjectRecord) -> bool {
        record.last_modified > self.0
    }

    /// Keeps the records modified after the watermark, preserving listing order.
    pub fn changes_in(&self, listing: Vec<ObjectRecord>) -> Vec<ObjectRecord> {
        listing
            .into_iter()
            .filter(|record| self.is_passed_by(record))
            .collect()
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
