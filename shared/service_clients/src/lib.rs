//! Service clients for the cloud samples
//!
//! This crate wraps the object store and message queue services behind
//! vendor-independent traits, with AWS-backed and in-memory implementations
//! sharing a single error taxonomy.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

/// Error taxonomy shared by both service variants
pub mod error;
/// Bucket and object operations
pub mod object_store;
/// Queue and message operations
pub mod queue;

pub use error::{ErrorKind, ErrorType, ServiceError, ServiceResult};
pub use object_store::{
    BucketRef, InMemoryObjectStore, ObjectMetadata, ObjectRef, ObjectStore, ObjectSummary,
    S3ObjectStore, StoredObject,
};
pub use queue::{
    InMemoryMessageQueue, MessageQueue, QueueRef, ReceiveConfig, ReceivedMessage,
    SqsMessageQueue,
};
