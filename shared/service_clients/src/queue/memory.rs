//! In-memory message queue
//!
//! Models the SQS visibility window: a received message is hidden until its
//! visibility timeout passes, after which it becomes receivable again and the
//! old receipt handle is rejected.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use md5::{Digest, Md5};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{MessageQueue, QueueRef, ReceivedMessage, MAX_MESSAGE_BODY_BYTES, MAX_RECEIVE_COUNT};
use crate::error::{ErrorKind, ServiceError, ServiceResult};

/// Visibility timeout SQS applies when a queue does not set one
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

const URL_PREFIX: &str = "http://sqs.memory.localhost/000000000000";

struct MemoryMessage {
    message_id: String,
    body: String,
    md5_of_body: String,
    sent_timestamp_ms: i64,
    receive_count: u32,
    receipt_handle: Option<String>,
    invisible_until: Option<Instant>,
}

impl MemoryMessage {
    fn is_visible(&self, now: Instant) -> bool {
        self.invisible_until.is_none_or(|until| until <= now)
    }
}

/// Message queue held entirely in process memory
pub struct InMemoryMessageQueue {
    queues: Mutex<BTreeMap<String, Vec<MemoryMessage>>>,
    visibility_timeout: Duration,
}

impl Default for InMemoryMessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageQueue {
    /// Creates an empty queue service with the default visibility timeout
    #[must_use]
    pub fn new() -> Self {
        Self::with_visibility_timeout(DEFAULT_VISIBILITY_TIMEOUT)
    }

    /// Creates an empty queue service hiding received messages for `visibility_timeout`
    #[must_use]
    pub fn with_visibility_timeout(visibility_timeout: Duration) -> Self {
        Self {
            queues: Mutex::new(BTreeMap::new()),
            visibility_timeout,
        }
    }
}

fn request_id() -> Option<String> {
    Some(Uuid::new_v4().to_string())
}

fn non_existent_queue(queue: &QueueRef) -> ServiceError {
    ServiceError::rejected(
        ErrorKind::NotFound,
        "AWS.SimpleQueueService.NonExistentQueue",
        format!("The specified queue does not exist: {}", queue.url),
        400,
        request_id(),
    )
}

fn md5_hex(body: &str) -> String {
    hex::encode(Md5::digest(body.as_bytes()))
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn create_queue(&self, name: &str) -> ServiceResult<QueueRef> {
        let queue = QueueRef {
            name: name.to_string(),
            url: format!("{URL_PREFIX}/{name}"),
        };

        let mut queues = self.queues.lock().await;
        if queues.contains_key(&queue.url) {
            return Err(ServiceError::rejected(
                ErrorKind::AlreadyExists,
                "QueueAlreadyExists",
                format!("A queue already exists with the same name: {name}"),
                400,
                request_id(),
            ));
        }
        queues.insert(queue.url.clone(), Vec::new());

        Ok(queue)
    }

    async fn list_queues(&self) -> ServiceResult<Vec<QueueRef>> {
        let queues = self.queues.lock().await;

        Ok(queues.keys().map(QueueRef::from_url).collect())
    }

    async fn send_message(&self, queue: &QueueRef, body: &str) -> ServiceResult<String> {
        if body.len() > MAX_MESSAGE_BODY_BYTES {
            return Err(ServiceError::rejected(
                ErrorKind::BodyTooLarge,
                "InvalidParameterValue",
                format!(
                    "One or more parameters are invalid. Reason: Message must be shorter than {MAX_MESSAGE_BODY_BYTES} bytes."
                ),
                400,
                request_id(),
            ));
        }

        let mut queues = self.queues.lock().await;
        let messages = queues
            .get_mut(&queue.url)
            .ok_or_else(|| non_existent_queue(queue))?;

        let message_id = Uuid::new_v4().to_string();
        messages.push(MemoryMessage {
            message_id: message_id.clone(),
            body: body.to_string(),
            md5_of_body: md5_hex(body),
            sent_timestamp_ms: Utc::now().timestamp_millis(),
            receive_count: 0,
            receipt_handle: None,
            invisible_until: None,
        });

        Ok(message_id)
    }

    async fn receive_messages(
        &self,
        queue: &QueueRef,
        max_count: i32,
    ) -> ServiceResult<Vec<ReceivedMessage>> {
        if !(1..=MAX_RECEIVE_COUNT).contains(&max_count) {
            return Err(ServiceError::rejected(
                ErrorKind::Other,
                "ReadCountOutOfRange",
                format!("Value {max_count} for parameter MaxNumberOfMessages is invalid"),
                400,
                request_id(),
            ));
        }

        let mut queues = self.queues.lock().await;
        let messages = queues
            .get_mut(&queue.url)
            .ok_or_else(|| non_existent_queue(queue))?;

        let now = Instant::now();
        let limit = usize::try_from(max_count).unwrap_or(1);

        Ok(messages
            .iter_mut()
            .filter(|message| message.is_visible(now))
            .take(limit)
            .map(|message| {
                let receipt_handle = Uuid::new_v4().to_string();
                message.receive_count += 1;
                message.receipt_handle = Some(receipt_handle.clone());
                message.invisible_until = Some(now + self.visibility_timeout);

                let attributes = HashMap::from([
                    (
                        "SentTimestamp".to_string(),
                        message.sent_timestamp_ms.to_string(),
                    ),
                    (
                        "ApproximateReceiveCount".to_string(),
                        message.receive_count.to_string(),
                    ),
                ]);

                ReceivedMessage {
                    message_id: message.message_id.clone(),
                    receipt_handle,
                    body: message.body.clone(),
                    md5_of_body: message.md5_of_body.clone(),
                    attributes,
                }
            })
            .collect())
    }

    async fn delete_message(&self, queue: &QueueRef, receipt_handle: &str) -> ServiceResult<()> {
        let mut queues = self.queues.lock().await;
        let messages = queues
            .get_mut(&queue.url)
            .ok_or_else(|| non_existent_queue(queue))?;

        let now = Instant::now();
        let position = messages.iter().position(|message| {
            message.receipt_handle.as_deref() == Some(receipt_handle) && !message.is_visible(now)
        });

        match position {
            Some(index) => {
                messages.remove(index);
                Ok(())
            }
            None => Err(ServiceError::rejected(
                ErrorKind::ReceiptHandleExpired,
                "ReceiptHandleIsInvalid",
                format!("The receipt handle has expired or is invalid: {receipt_handle}"),
                400,
                request_id(),
            )),
        }
    }

    async fn delete_queue(&self, queue: &QueueRef) -> ServiceResult<()> {
        let mut queues = self.queues.lock().await;
        queues
            .remove(&queue.url)
            .map(|_| ())
            .ok_or_else(|| non_existent_queue(queue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_received_message_is_hidden_during_visibility_window() {
        let service = InMemoryMessageQueue::new();
        let queue = service.create_queue("hidden").await.unwrap();
        service.send_message(&queue, "hello").await.unwrap();

        let first = service.receive_messages(&queue, 1).await.unwrap();
        let second = service.receive_messages(&queue, 1).await.unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_expired_receipt_handle_is_rejected() {
        let service = InMemoryMessageQueue::with_visibility_timeout(Duration::ZERO);
        let queue = service.create_queue("expired").await.unwrap();
        service.send_message(&queue, "hello").await.unwrap();

        let received = service.receive_messages(&queue, 1).await.unwrap();
        let err = service
            .delete_message(&queue, &received[0].receipt_handle)
            .await
            .unwrap_err();

        assert!(err.is_kind(ErrorKind::ReceiptHandleExpired));
    }

    #[tokio::test]
    async fn test_message_is_redelivered_after_window() {
        let service = InMemoryMessageQueue::with_visibility_timeout(Duration::ZERO);
        let queue = service.create_queue("redeliver").await.unwrap();
        service.send_message(&queue, "hello").await.unwrap();

        let first = service.receive_messages(&queue, 1).await.unwrap();
        let second = service.receive_messages(&queue, 1).await.unwrap();

        assert_eq!(first[0].message_id, second[0].message_id);
        assert_ne!(first[0].receipt_handle, second[0].receipt_handle);
        assert_eq!(second[0].attributes["ApproximateReceiveCount"], "2");
    }

    #[tokio::test]
    async fn test_checksum_is_md5_of_body() {
        let service = InMemoryMessageQueue::new();
        let queue = service.create_queue("checksum").await.unwrap();
        service.send_message(&queue, "hello").await.unwrap();

        let received = service.receive_messages(&queue, 1).await.unwrap();

        assert_eq!(received[0].md5_of_body, "5d41402abc4b2a76b9719d911017c592");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let service = InMemoryMessageQueue::new();
        let queue = service.create_queue("oversized").await.unwrap();
        let body = "x".repeat(MAX_MESSAGE_BODY_BYTES + 1);

        let err = service.send_message(&queue, &body).await.unwrap_err();

        assert!(err.is_kind(ErrorKind::BodyTooLarge));
    }

    #[tokio::test]
    async fn test_receive_count_out_of_range_is_rejected() {
        let service = InMemoryMessageQueue::new();
        let queue = service.create_queue("range").await.unwrap();

        let err = service.receive_messages(&queue, 11).await.unwrap_err();

        assert!(err.is_kind(ErrorKind::Other));
    }
}
