//! Message queue operations
//!
//! This module defines the queue/message lifecycle used by the samples, with
//! an SQS-backed implementation and an in-memory one.

mod memory;
mod sqs_queue;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ServiceResult;

pub use memory::InMemoryMessageQueue;
pub use sqs_queue::SqsMessageQueue;

/// Largest message body SQS accepts, in bytes
pub const MAX_MESSAGE_BODY_BYTES: usize = 256 * 1024;

/// Upper bound on messages returned by a single receive
pub const MAX_RECEIVE_COUNT: i32 = 10;

/// A queue as returned by create or list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRef {
    /// Account-scoped queue name
    pub name: String,
    /// URL used to address the queue in every other call
    pub url: String,
}

impl QueueRef {
    /// Builds a reference from a queue URL, taking the last path segment as
    /// the name
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = url.rsplit('/').next().unwrap_or_default().to_string();
        Self { name, url }
    }
}

/// Wrapper for received messages with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Server-assigned message ID
    pub message_id: String,
    /// Receipt handle for deleting the message
    pub receipt_handle: String,
    /// Message body
    pub body: String,
    /// Hex MD5 digest of the body
    pub md5_of_body: String,
    /// System attributes reported with the message
    pub attributes: HashMap<String, String>,
}

/// Configuration for receive calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveConfig {
    /// Visibility timeout for received messages (in seconds), queue default when unset
    pub visibility_timeout_seconds: Option<i32>,
    /// Wait time for long polling (in seconds), 0 for short polling
    pub wait_time_seconds: i32,
}

/// Queue and message lifecycle against a named message queue
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Creates a new queue
    ///
    /// # Errors
    ///
    /// `AlreadyExists`, `AccessDenied`
    async fn create_queue(&self, name: &str) -> ServiceResult<QueueRef>;

    /// Lists the queues in the account
    ///
    /// # Errors
    ///
    /// Any rejection or client failure from the service
    async fn list_queues(&self) -> ServiceResult<Vec<QueueRef>>;

    /// Sends a text message and returns its message ID
    ///
    /// # Errors
    ///
    /// `BodyTooLarge`, `AccessDenied`, `NotFound` for a missing queue
    async fn send_message(&self, queue: &QueueRef, body: &str) -> ServiceResult<String>;

    /// Receives up to `max_count` messages
    ///
    /// Delivery is best effort: an empty result does not mean the queue is
    /// empty, and a just-sent message may not be visible yet.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing queue, or any other rejection
    async fn receive_messages(
        &self,
        queue: &QueueRef,
        max_count: i32,
    ) -> ServiceResult<Vec<ReceivedMessage>>;

    /// Deletes a received message by its receipt handle
    ///
    /// # Errors
    ///
    /// `ReceiptHandleExpired` when the visibility window has passed
    async fn delete_message(&self, queue: &QueueRef, receipt_handle: &str) -> ServiceResult<()>;

    /// Deletes a queue and any messages left in it
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing queue
    async fn delete_queue(&self, queue: &QueueRef) -> ServiceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_queue_ref_name_from_url() {
        let queue = QueueRef::from_url("https://sqs.us-east-1.amazonaws.com/123456789012/MyQueue");

        assert_eq!(queue.name, "MyQueue");
        assert_eq!(
            queue.url,
            "https://sqs.us-east-1.amazonaws.com/123456789012/MyQueue"
        );
    }
}
