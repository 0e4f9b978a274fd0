//! Object storage walkthrough
//!
//! Creates a bucket, uploads a sample file, downloads and prints it, lists
//! by prefix, then deletes the object and the bucket.

use std::sync::Arc;

use async_trait::async_trait;
use service_clients::{ObjectStore, ServiceError, ServiceResult};
use tokio::io::AsyncBufReadExt;
use tracing::info;
use uuid::Uuid;

use crate::orchestrator::{Demo, DemoState};
use crate::sample_file::SampleFile;

/// Prefix of generated bucket names
pub const BUCKET_PREFIX: &str = "my-first-s3-bucket";

/// Key the sample object is stored under
pub const OBJECT_KEY: &str = "MyObjectKey";

/// Prefix used for the object listing
pub const LIST_PREFIX: &str = "My";

/// Bucket/object lifecycle against an [`ObjectStore`]
pub struct ObjectStoreDemo {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key: String,
    prefix: String,
    downloaded: Vec<String>,
}

impl ObjectStoreDemo {
    /// Creates a demo using a freshly generated bucket name
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_names(
            store,
            format!("{BUCKET_PREFIX}-{}", Uuid::new_v4()),
            OBJECT_KEY,
            LIST_PREFIX,
        )
    }

    /// Creates a demo with explicit bucket, key and listing prefix
    #[must_use]
    pub fn with_names(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
            prefix: prefix.into(),
            downloaded: Vec::new(),
        }
    }

    /// Name of the bucket this run owns
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Lines read back from the downloaded object
    #[must_use]
    pub fn downloaded_lines(&self) -> &[String] {
        &self.downloaded
    }

    async fn create_bucket(&self) -> ServiceResult<()> {
        info!("Creating bucket {}", self.bucket);
        self.store.create_bucket(&self.bucket).await?;

        info!("Listing buckets");
        for bucket in self.store.list_buckets().await? {
            info!(" - {}", bucket.name);
        }
        Ok(())
    }

    async fn upload(&self) -> ServiceResult<()> {
        info!("Uploading a new object to S3 from a file");
        let sample = SampleFile::create()
            .map_err(|e| ServiceError::unavailable(format!("Failed to create sample file: {e}")))?;

        let object = self
            .store
            .put_object(
                &self.bucket,
                &self.key,
                sample.byte_stream().await?,
                sample.metadata()?,
            )
            .await?;
        info!(e_tag = ?object.e_tag, "Uploaded {}/{}", object.bucket, object.key);
        Ok(())
    }

    async fn download(&mut self) -> ServiceResult<()> {
        info!("Downloading an object");
        let object = self.store.get_object(&self.bucket, &self.key).await?;
        info!(
            "Content-Type: {}",
            object.metadata.content_type.as_deref().unwrap_or("<unknown>")
        );

        // Dropping the reader on any path releases the connection
        let mut lines = Box::pin(object.body.into_async_read()).lines();
        self.downloaded.clear();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| ServiceError::unavailable(format!("Failed to read object body: {e}")))?
        {
            info!("    {}", line);
            self.downloaded.push(line);
        }
        Ok(())
    }

    async fn list_objects(&self) -> ServiceResult<()> {
        info!("Listing objects");
        for summary in self.store.list_objects(&self.bucket, &self.prefix).await? {
            info!(" - {}  (size = {})", summary.key, summary.size);
        }
        Ok(())
    }
}

#[async_trait]
impl Demo for ObjectStoreDemo {
    fn title(&self) -> &'static str {
        "Getting Started with Amazon S3"
    }

    async fn enter(&mut self, state: DemoState) -> ServiceResult<()> {
        match state {
            DemoState::ContainerCreated => self.create_bucket().await,
            DemoState::ContentWritten => self.upload().await,
            DemoState::ContentRead => self.download().await,
            DemoState::ContentListed => self.list_objects().await,
            DemoState::ContentDeleted => {
                info!("Deleting an object");
                self.store.delete_object(&self.bucket, &self.key).await
            }
            DemoState::ContainerDeleted => {
                info!("Deleting bucket {}", self.bucket);
                self.store.delete_bucket(&self.bucket).await
            }
            DemoState::Init | DemoState::Done | DemoState::Failed => Ok(()),
        }
    }
}
