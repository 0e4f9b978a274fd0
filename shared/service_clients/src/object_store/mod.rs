//! Object storage operations
//!
//! This module defines the bucket/object lifecycle used by the samples and
//! provides an S3-backed implementation plus an in-memory one.

mod memory;
mod s3_store;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};

use crate::error::ServiceResult;

pub use memory::InMemoryObjectStore;
pub use s3_store::S3ObjectStore;

/// A bucket as returned by create or list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRef {
    /// Globally unique bucket name
    pub name: String,
    /// Creation time, when the service reports one
    pub created_at: Option<DateTime<Utc>>,
}

/// Content metadata attached to an object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// MIME type of the payload
    pub content_type: Option<String>,
    /// Payload size in bytes
    pub content_length: Option<i64>,
    /// Caller supplied name/value pairs
    pub user_metadata: HashMap<String, String>,
}

impl ObjectMetadata {
    /// Metadata with only a content type set
    #[must_use]
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Self::default()
        }
    }
}

/// Reference to a stored object returned by a put
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key
    pub key: String,
    /// Entity tag of the stored version
    pub e_tag: Option<String>,
}

/// Entry of an object listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: i64,
}

/// A downloaded object
///
/// The body is an owned stream; the underlying connection stays open until
/// it is fully read or the value is dropped.
#[derive(Debug)]
pub struct StoredObject {
    /// Metadata reported with the object
    pub metadata: ObjectMetadata,
    /// Object contents
    pub body: ByteStream,
}

/// Bucket and object lifecycle against a blob store keyed by (bucket, key)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Creates a new bucket
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the name is taken, `AccessDenied`, `Unavailable`
    async fn create_bucket(&self, name: &str) -> ServiceResult<BucketRef>;

    /// Lists the buckets visible to the caller (first page only)
    ///
    /// # Errors
    ///
    /// Any rejection or client failure from the service
    async fn list_buckets(&self) -> ServiceResult<Vec<BucketRef>>;

    /// Stores `payload` under `key`, replacing any existing object
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing bucket, `AccessDenied`, `Unavailable`,
    /// `PayloadTooLarge`
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: ByteStream,
        metadata: ObjectMetadata,
    ) -> ServiceResult<ObjectRef>;

    /// Fetches an object with its metadata
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing bucket or key, `AccessDenied`
    async fn get_object(&self, bucket: &str, key: &str) -> ServiceResult<StoredObject>;

    /// Lists objects whose key starts with `prefix`
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing bucket; an empty result is not an error
    async fn list_objects(&self, bucket: &str, prefix: &str) -> ServiceResult<Vec<ObjectSummary>>;

    /// Deletes an object; deleting a missing key succeeds
    ///
    /// # Errors
    ///
    /// Any rejection other than a missing key
    async fn delete_object(&self, bucket: &str, key: &str) -> ServiceResult<()>;

    /// Deletes an empty bucket
    ///
    /// # Errors
    ///
    /// `NotEmpty` if objects remain, `NotFound` for a missing bucket
    async fn delete_bucket(&self, name: &str) -> ServiceResult<()>;
}
