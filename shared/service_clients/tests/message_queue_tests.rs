//! Behavioral tests for message queue implementations

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use service_clients::{ErrorKind, InMemoryMessageQueue, MessageQueue, QueueRef, ReceivedMessage};

use crate::common::{localstack_message_queue, unique_name};

const POLL_ATTEMPTS: usize = 10;

/// Polls until a message arrives or the attempts run out
async fn poll_for_message(queue: &dyn MessageQueue, target: &QueueRef) -> Option<ReceivedMessage> {
    for _ in 0..POLL_ATTEMPTS {
        let mut messages = queue
            .receive_messages(target, 1)
            .await
            .expect("Failed to receive messages");
        if let Some(message) = messages.pop() {
            return Some(message);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    None
}

async fn check_send_receive_delete(queue: &dyn MessageQueue) {
    let target = queue
        .create_queue(&unique_name("round-trip"))
        .await
        .expect("Failed to create queue");

    let message_id = queue
        .send_message(&target, "hello")
        .await
        .expect("Failed to send message");
    assert!(!message_id.is_empty(), "Message ID should not be empty");

    let received = poll_for_message(queue, &target)
        .await
        .expect("Message should eventually be received");
    assert_eq!(received.body, "hello");
    assert_eq!(received.message_id, message_id);

    queue
        .delete_message(&target, &received.receipt_handle)
        .await
        .expect("Failed to delete message");

    let remaining = queue.receive_messages(&target, 10).await.unwrap();
    assert!(remaining.is_empty(), "Queue should be empty after delete");

    queue.delete_queue(&target).await.unwrap();
}

async fn check_queue_listing(queue: &dyn MessageQueue) {
    let target = queue.create_queue(&unique_name("listing")).await.unwrap();

    let queues = queue.list_queues().await.expect("Failed to list queues");
    assert!(
        queues.iter().any(|listed| listed.url == target.url),
        "Created queue should be listed"
    );

    queue.delete_queue(&target).await.unwrap();
}

#[tokio::test]
async fn test_in_memory_send_receive_delete() {
    check_send_receive_delete(&InMemoryMessageQueue::new()).await;
}

#[tokio::test]
async fn test_in_memory_queue_listing() {
    check_queue_listing(&InMemoryMessageQueue::new()).await;
}

#[tokio::test]
async fn test_in_memory_empty_queue_receives_nothing() {
    let queue = InMemoryMessageQueue::new();
    let target = queue.create_queue("empty").await.unwrap();

    let messages = queue.receive_messages(&target, 10).await.unwrap();

    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_in_memory_deleted_queue_is_not_found() {
    let queue = InMemoryMessageQueue::new();
    let target = queue.create_queue("gone").await.unwrap();
    queue.delete_queue(&target).await.unwrap();

    let err = queue.send_message(&target, "hello").await.unwrap_err();
    assert!(err.is_kind(ErrorKind::NotFound));

    let err = queue.delete_queue(&target).await.unwrap_err();
    assert!(err.is_kind(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_in_memory_duplicate_queue_is_rejected() {
    let queue = InMemoryMessageQueue::new();
    queue.create_queue("MyQueue").await.unwrap();

    let err = queue.create_queue("MyQueue").await.unwrap_err();

    assert!(err.is_kind(ErrorKind::AlreadyExists));
}

#[tokio::test]
async fn test_in_memory_receive_respects_max_count() {
    let queue = InMemoryMessageQueue::new();
    let target = queue.create_queue("batch").await.unwrap();
    for body in ["one", "two", "three"] {
        queue.send_message(&target, body).await.unwrap();
    }

    let first = queue.receive_messages(&target, 2).await.unwrap();
    let rest = queue.receive_messages(&target, 10).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(rest.len(), 1);
}

#[tokio::test]
#[ignore = "requires LocalStack on localhost:4566"]
async fn test_sqs_send_receive_delete() {
    check_send_receive_delete(&localstack_message_queue().await).await;
}

#[tokio::test]
#[ignore = "requires LocalStack on localhost:4566"]
async fn test_sqs_queue_listing() {
    check_queue_listing(&localstack_message_queue().await).await;
}
