//! Shared test setup utilities

#![allow(dead_code)]

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sqs::Client as SqsClient;
use service_clients::{ObjectStore, ReceiveConfig, S3ObjectStore, SqsMessageQueue};
use uuid::Uuid;

/// LocalStack edge endpoint
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Generates a unique, DNS-safe container name for a test
pub fn unique_name(test_name: &str) -> String {
    format!("{}-{}", test_name, Uuid::new_v4())
}

/// Loads an SDK config pointing at LocalStack with hardcoded credentials
pub async fn localstack_config() -> aws_config::SdkConfig {
    let credentials = Credentials::from_keys(
        "test", // AWS_ACCESS_KEY_ID
        "test", // AWS_SECRET_ACCESS_KEY
        None,   // no session token
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .credentials_provider(credentials)
        .load()
        .await
}

/// S3 object store backed by LocalStack
pub async fn localstack_object_store() -> S3ObjectStore {
    let config = localstack_config().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&config)
        .force_path_style(true)
        .build();

    S3ObjectStore::new(Arc::new(S3Client::from_conf(s3_config)))
}

/// SQS message queue backed by LocalStack
pub async fn localstack_message_queue() -> SqsMessageQueue {
    let config = localstack_config().await;

    SqsMessageQueue::new(Arc::new(SqsClient::new(&config)), ReceiveConfig::default())
}

/// Reads an object body to the end
pub async fn read_object(store: &dyn ObjectStore, bucket: &str, key: &str) -> Vec<u8> {
    let object = store
        .get_object(bucket, key)
        .await
        .expect("Failed to get object");

    object
        .body
        .collect()
        .await
        .expect("Failed to read object body")
        .into_bytes()
        .to_vec()
}
