//! Message queue walkthrough
//!
//! Creates a queue, sends one message, receives once, prints what arrived,
//! deletes the first received message and finally the queue. The receive is
//! a single best-effort call; if nothing arrived there is nothing to delete.

use std::sync::Arc;

use async_trait::async_trait;
use service_clients::{MessageQueue, QueueRef, ReceivedMessage, ServiceError, ServiceResult};
use tracing::{info, warn};
use uuid::Uuid;

use crate::orchestrator::{Demo, DemoState};

/// Prefix of generated queue names
pub const QUEUE_PREFIX: &str = "MyQueue";

/// Body of the message sent by the demo
pub const MESSAGE_BODY: &str = "This is my message text.";

/// Messages requested per receive
const RECEIVE_MAX_MESSAGES: i32 = 1;

/// Queue/message lifecycle against a [`MessageQueue`]
pub struct QueueDemo {
    service: Arc<dyn MessageQueue>,
    queue_name: String,
    body: String,
    queue: Option<QueueRef>,
    sent_message_id: Option<String>,
    received: Vec<ReceivedMessage>,
    deleted_receipt_handle: Option<String>,
}

impl QueueDemo {
    /// Creates a demo using a freshly generated queue name
    #[must_use]
    pub fn new(service: Arc<dyn MessageQueue>) -> Self {
        Self::with_names(service, format!("{QUEUE_PREFIX}-{}", Uuid::new_v4()), MESSAGE_BODY)
    }

    /// Creates a demo with an explicit queue name and message body
    #[must_use]
    pub fn with_names(
        service: Arc<dyn MessageQueue>,
        queue_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            service,
            queue_name: queue_name.into(),
            body: body.into(),
            queue: None,
            sent_message_id: None,
            received: Vec::new(),
            deleted_receipt_handle: None,
        }
    }

    /// Name of the queue this run owns
    #[must_use]
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// ID returned by the send step
    #[must_use]
    pub fn sent_message_id(&self) -> Option<&str> {
        self.sent_message_id.as_deref()
    }

    /// Messages returned by the receive step
    #[must_use]
    pub fn received(&self) -> &[ReceivedMessage] {
        &self.received
    }

    /// Receipt handle used by the delete step, if a message was received
    #[must_use]
    pub fn deleted_receipt_handle(&self) -> Option<&str> {
        self.deleted_receipt_handle.as_deref()
    }

    fn queue(&self) -> ServiceResult<QueueRef> {
        self.queue
            .clone()
            .ok_or_else(|| ServiceError::unavailable("Queue URL is not known yet"))
    }

    async fn create_queue(&mut self) -> ServiceResult<()> {
        info!("Creating a new SQS queue called {}", self.queue_name);
        self.queue = Some(self.service.create_queue(&self.queue_name).await?);

        info!("Listing all queues in your account");
        for queue in self.service.list_queues().await? {
            info!("  QueueUrl: {}", queue.url);
        }
        Ok(())
    }

    async fn send(&mut self) -> ServiceResult<()> {
        let queue = self.queue()?;
        info!("Sending a message to {}", queue.name);
        let message_id = self.service.send_message(&queue, &self.body).await?;
        info!("  MessageId: {}", message_id);
        self.sent_message_id = Some(message_id);
        Ok(())
    }

    async fn receive(&mut self) -> ServiceResult<()> {
        let queue = self.queue()?;
        info!("Receiving messages from {}", queue.name);
        self.received = self
            .service
            .receive_messages(&queue, RECEIVE_MAX_MESSAGES)
            .await?;
        Ok(())
    }

    fn log_received(&self) {
        for message in &self.received {
            info!("  Message");
            info!("    MessageId:     {}", message.message_id);
            info!("    ReceiptHandle: {}", message.receipt_handle);
            info!("    MD5OfBody:     {}", message.md5_of_body);
            info!("    Body:          {}", message.body);
            for (name, value) in &message.attributes {
                info!("  Attribute");
                info!("    Name:  {}", name);
                info!("    Value: {}", value);
            }
        }
    }

    async fn delete_first_received(&mut self) -> ServiceResult<()> {
        let queue = self.queue()?;
        let Some(first) = self.received.first() else {
            warn!("No message was received; nothing to delete");
            return Ok(());
        };

        info!("Deleting a message");
        self.service
            .delete_message(&queue, &first.receipt_handle)
            .await?;
        self.deleted_receipt_handle = Some(first.receipt_handle.clone());
        Ok(())
    }

    async fn delete_queue(&self) -> ServiceResult<()> {
        let queue = self.queue()?;
        info!("Deleting the test queue");
        self.service.delete_queue(&queue).await
    }
}

#[async_trait]
impl Demo for QueueDemo {
    fn title(&self) -> &'static str {
        "Getting Started with Amazon SQS"
    }

    async fn enter(&mut self, state: DemoState) -> ServiceResult<()> {
        match state {
            DemoState::ContainerCreated => self.create_queue().await,
            DemoState::ContentWritten => self.send().await,
            DemoState::ContentRead => self.receive().await,
            DemoState::ContentListed => {
                self.log_received();
                Ok(())
            }
            DemoState::ContentDeleted => self.delete_first_received().await,
            DemoState::ContainerDeleted => self.delete_queue().await,
            DemoState::Init | DemoState::Done | DemoState::Failed => Ok(()),
        }
    }
}
