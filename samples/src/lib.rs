//! Object storage and message queue samples
//!
//! Each sample walks one service through a create, write, read, list and
//! delete lifecycle, logging every step and stopping at the first error.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

/// Bucket/object walkthrough
pub mod object_demo;
/// Step sequencing, failure capture and timing
pub mod orchestrator;
/// Queue/message walkthrough
pub mod queue_demo;
/// Temporary upload payload
pub mod sample_file;
/// Tracing subscriber setup
pub mod telemetry;
/// Configuration types
pub mod types;

pub use object_demo::ObjectStoreDemo;
pub use orchestrator::{Demo, DemoOrchestrator, DemoState, Failure, RunReport};
pub use queue_demo::QueueDemo;
