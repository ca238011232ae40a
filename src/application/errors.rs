use crate::core::ports::ObjectStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },

    #[error("bucket '{bucket}' unreachable after {attempts} attempt(s): {source}")]
    Unreachable {
        bucket: String,
        attempts: u32,
        #[source]
        source: ObjectStoreError,
    },
}
