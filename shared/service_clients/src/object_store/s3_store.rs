//! S3-backed object store

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client as S3Client,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{BucketRef, ObjectMetadata, ObjectRef, ObjectStore, ObjectSummary, StoredObject};
use crate::error::{classify, ServiceResult};

/// Region that rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// Object store client for S3 operations
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
}

impl S3ObjectStore {
    /// Creates a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured, pre-authenticated S3 client
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        let region = self.s3_client.config().region()?.to_string();
        if region == DEFAULT_REGION {
            return None;
        }

        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region.as_str()))
                .build(),
        )
    }
}

fn to_chrono(date: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(date.secs(), date.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn create_bucket(&self, name: &str) -> ServiceResult<BucketRef> {
        debug!("Creating bucket: {}", name);

        self.s3_client
            .create_bucket()
            .bucket(name)
            .set_create_bucket_configuration(self.bucket_configuration())
            .send()
            .await
            .map_err(classify)?;

        Ok(BucketRef {
            name: name.to_string(),
            created_at: None,
        })
    }

    async fn list_buckets(&self) -> ServiceResult<Vec<BucketRef>> {
        let output = self
            .s3_client
            .list_buckets()
            .send()
            .await
            .map_err(classify)?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                Some(BucketRef {
                    name: bucket.name()?.to_string(),
                    created_at: bucket.creation_date().and_then(to_chrono),
                })
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
        debug!("Uploading object {} to bucket {}", key, bucket);

        let user_metadata =
            (!metadata.user_metadata.is_empty()).then_some(metadata.user_metadata);

        let output = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(payload)
            .set_content_type(metadata.content_type)
            .set_content_length(metadata.content_length)
            .set_metadata(user_metadata)
            .send()
            .await
            .map_err(classify)?;

        Ok(ObjectRef {
            bucket: bucket.to_string(),
            key: key.to_string(),
            e_tag: output.e_tag().map(ToString::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> ServiceResult<StoredObject> {
        debug!("Downloading object {} from bucket {}", key, bucket);

        let output = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;

        let metadata = ObjectMetadata {
            content_type: output.content_type().map(ToString::to_string),
            content_length: output.content_length(),
            user_metadata: output.metadata().cloned().unwrap_or_default(),
        };

        Ok(StoredObject {
            metadata,
            body: output.body,
        })
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> ServiceResult<Vec<ObjectSummary>> {
        let output = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(classify)?;

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectSummary {
                    key: object.key()?.to_string(),
                    size: object.size().unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ServiceResult<()> {
        debug!("Deleting object {} from bucket {}", key, bucket);

        let result = self
            .s3_client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(service_err))
                if service_err.err().code() == Some("NoSuchKey") =>
            {
                Ok(())
            }
            Err(e) => Err(classify(e)),
        }
    }

    async fn delete_bucket(&self, name: &str) -> ServiceResult<()> {
        debug!("Deleting bucket: {}", name);

        self.s3_client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(classify)?;

        Ok(())
    }
}
