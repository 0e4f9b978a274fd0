//! In-memory object store
//!
//! Mirrors the S3 error codes and statuses so callers observe the same
//! taxonomy as against the real service.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BucketRef, ObjectMetadata, ObjectRef, ObjectStore, ObjectSummary, StoredObject};
use crate::error::{ErrorKind, ServiceError, ServiceResult};

/// Largest payload accepted by a single S3 PUT
pub const DEFAULT_MAX_OBJECT_SIZE: usize = 5 * 1024 * 1024 * 1024;

struct MemoryObject {
    data: Vec<u8>,
    metadata: ObjectMetadata,
    e_tag: String,
}

struct MemoryBucket {
    created_at: DateTime<Utc>,
    objects: BTreeMap<String, MemoryObject>,
}

/// Object store held entirely in process memory
pub struct InMemoryObjectStore {
    buckets: Mutex<BTreeMap<String, MemoryBucket>>,
    max_object_size: usize,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_object_size(DEFAULT_MAX_OBJECT_SIZE)
    }

    /// Creates an empty store that rejects payloads above `max_object_size`
    #[must_use]
    pub fn with_max_object_size(max_object_size: usize) -> Self {
        Self {
            buckets: Mutex::new(BTreeMap::new()),
            max_object_size,
        }
    }
}

fn request_id() -> Option<String> {
    Some(Uuid::new_v4().to_string())
}

fn no_such_bucket(name: &str) -> ServiceError {
    ServiceError::rejected(
        ErrorKind::NotFound,
        "NoSuchBucket",
        format!("The specified bucket does not exist: {name}"),
        404,
        request_id(),
    )
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn create_bucket(&self, name: &str) -> ServiceResult<BucketRef> {
        let mut buckets = self.buckets.lock().await;
        if buckets.contains_key(name) {
            return Err(ServiceError::rejected(
                ErrorKind::AlreadyExists,
                "BucketAlreadyOwnedByYou",
                format!("Your previous request to create the named bucket succeeded: {name}"),
                409,
                request_id(),
            ));
        }

        let created_at = Utc::now();
        buckets.insert(
            name.to_string(),
            MemoryBucket {
                created_at,
                objects: BTreeMap::new(),
            },
        );

        Ok(BucketRef {
            name: name.to_string(),
            created_at: Some(created_at),
        })
    }

    async fn list_buckets(&self) -> ServiceResult<Vec<BucketRef>> {
        let buckets = self.buckets.lock().await;

        Ok(buckets
            .iter()
            .map(|(name, bucket)| BucketRef {
                name: name.clone(),
                created_at: Some(bucket.created_at),
            })
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: ByteStream,
        metadata: ObjectMetadata,
    ) -> ServiceResult<ObjectRef> {
        let data = payload
            .collect()
            .await
            .map_err(|e| ServiceError::unavailable(format!("Failed to read payload: {e}")))?
            .into_bytes()
            .to_vec();

        if data.len() > self.max_object_size {
            return Err(ServiceError::rejected(
                ErrorKind::PayloadTooLarge,
                "EntityTooLarge",
                "Your proposed upload exceeds the maximum allowed size",
                400,
                request_id(),
            ));
        }

        let mut buckets = self.buckets.lock().await;
        let target = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        let e_tag = Uuid::new_v4().simple().to_string();
        let metadata = ObjectMetadata {
            content_length: i64::try_from(data.len()).ok(),
            ..metadata
        };
        target.objects.insert(
            key.to_string(),
            MemoryObject {
                data,
                metadata,
                e_tag: e_tag.clone(),
            },
        );

        Ok(ObjectRef {
            bucket: bucket.to_string(),
            key: key.to_string(),
            e_tag: Some(e_tag),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> ServiceResult<StoredObject> {
        let buckets = self.buckets.lock().await;
        let source = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        let object = source.objects.get(key).ok_or_else(|| {
            ServiceError::rejected(
                ErrorKind::NotFound,
                "NoSuchKey",
                format!("The specified key does not exist: {key}"),
                404,
                request_id(),
            )
        })?;

        Ok(StoredObject {
            metadata: object.metadata.clone(),
            body: ByteStream::from(object.data.clone()),
        })
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> ServiceResult<Vec<ObjectSummary>> {
        let buckets = self.buckets.lock().await;
        let source = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        Ok(source
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.metadata.content_length.unwrap_or_default(),
            })
            .collect())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ServiceResult<()> {
        let mut buckets = self.buckets.lock().await;
        let target = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        target.objects.remove(key);

        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> ServiceResult<()> {
        let mut buckets = self.buckets.lock().await;
        let target = buckets.get(name).ok_or_else(|| no_such_bucket(name))?;
        if !target.objects.is_empty() {
            return Err(ServiceError::rejected(
                ErrorKind::NotEmpty,
                "BucketNotEmpty",
                format!("The bucket you tried to delete is not empty: {name}"),
                409,
                request_id(),
            ));
        }

        buckets.remove(name);
        Ok(())
    }
}
