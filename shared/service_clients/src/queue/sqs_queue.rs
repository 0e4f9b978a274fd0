//! SQS-backed message queue

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::{types::MessageSystemAttributeName, Client as SqsClient};
use tracing::debug;

use super::{MessageQueue, QueueRef, ReceiveConfig, ReceivedMessage};
use crate::error::{classify, ErrorKind, ServiceError, ServiceResult};

/// SQS reports an oversized body through a generic parameter error
const BODY_TOO_LARGE_REASON: &str = "must be shorter";

/// SQS reports an expired receipt handle through a generic parameter error
const RECEIPT_HANDLE_EXPIRED_REASON: &str = "receipt handle has expired";

/// Message queue client for SQS operations
pub struct SqsMessageQueue {
    sqs_client: Arc<SqsClient>,
    config: ReceiveConfig,
}

impl SqsMessageQueue {
    /// Creates a new SQS message queue client
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured, pre-authenticated SQS client
    /// * `config` - Polling parameters applied to every receive
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>, config: ReceiveConfig) -> Self {
        Self { sqs_client, config }
    }
}

/// Narrows a generic `InvalidParameterValue` rejection to `kind` when the
/// service message carries `reason`
fn refine(error: ServiceError, kind: ErrorKind, reason: &str) -> ServiceError {
    match error {
        ServiceError::ServiceRejected {
            message,
            status,
            code,
            request_id,
            ..
        } if code == "InvalidParameterValue" && message.contains(reason) => {
            ServiceError::rejected(kind, code, message, status, request_id)
        }
        other => other,
    }
}

#[async_trait]
impl MessageQueue for SqsMessageQueue {
    async fn create_queue(&self, name: &str) -> ServiceResult<QueueRef> {
        debug!("Creating queue: {}", name);

        let output = self
            .sqs_client
            .create_queue()
            .queue_name(name)
            .send()
            .await
            .map_err(classify)?;

        let url = output
            .queue_url()
            .ok_or_else(|| ServiceError::unavailable("Queue URL not returned"))?;

        Ok(QueueRef {
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    async fn list_queues(&self) -> ServiceResult<Vec<QueueRef>> {
        let output = self
            .sqs_client
            .list_queues()
            .send()
            .await
            .map_err(classify)?;

        Ok(output
            .queue_urls()
            .iter()
            .map(QueueRef::from_url)
            .collect())
    }

    async fn send_message(&self, queue: &QueueRef, body: &str) -> ServiceResult<String> {
        let output = self
            .sqs_client
            .send_message()
            .queue_url(&queue.url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| refine(classify(e), ErrorKind::BodyTooLarge, BODY_TOO_LARGE_REASON))?;

        Ok(output
            .message_id()
            .map(ToString::to_string)
            .unwrap_or_default())
    }

    async fn receive_messages(
        &self,
        queue: &QueueRef,
        max_count: i32,
    ) -> ServiceResult<Vec<ReceivedMessage>> {
        let output = self
            .sqs_client
            .receive_message()
            .queue_url(&queue.url)
            .max_number_of_messages(max_count)
            .set_visibility_timeout(self.config.visibility_timeout_seconds)
            .wait_time_seconds(self.config.wait_time_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .send()
            .await
            .map_err(classify)?;

        Ok(output
            .messages()
            .iter()
            .filter_map(|msg| {
                Some(ReceivedMessage {
                    message_id: msg.message_id()?.to_string(),
                    receipt_handle: msg.receipt_handle()?.to_string(),
                    body: msg.body().unwrap_or_default().to_string(),
                    md5_of_body: msg.md5_of_body().unwrap_or_default().to_string(),
                    attributes: msg
                        .attributes()
                        .map(|attributes| {
                            attributes
                                .iter()
                                .map(|(name, value)| (name.as_str().to_string(), value.clone()))
                                .collect()
                        })
                        .unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn delete_message(&self, queue: &QueueRef, receipt_handle: &str) -> ServiceResult<()> {
        self.sqs_client
            .delete_message()
            .queue_url(&queue.url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                refine(
                    classify(e),
                    ErrorKind::ReceiptHandleExpired,
                    RECEIPT_HANDLE_EXPIRED_REASON,
                )
            })?;

        Ok(())
    }

    async fn delete_queue(&self, queue: &QueueRef) -> ServiceResult<()> {
        debug!("Deleting queue: {}", queue.url);

        self.sqs_client
            .delete_queue()
            .queue_url(&queue.url)
            .send()
            .await
            .map_err(classify)?;

        Ok(())
    }
}
