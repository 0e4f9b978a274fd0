//! Linear resource-lifecycle driver
//!
//! Runs a demo through a fixed sequence of states, stopping at the first
//! error. Nothing is retried and nothing already created is cleaned up.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use service_clients::{ServiceError, ServiceResult};
use strum::Display;
use tracing::{error, info, warn};

/// Progress of a demo run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DemoState {
    /// Nothing has run yet
    Init,
    /// Container created and containers enumerated
    ContainerCreated,
    /// Item written or message sent
    ContentWritten,
    /// Item read or messages received
    ContentRead,
    /// Contents enumerated
    ContentListed,
    /// Item or message deleted
    ContentDeleted,
    /// Container deleted
    ContainerDeleted,
    /// Every step succeeded
    Done,
    /// A step reported an error
    Failed,
}

impl DemoState {
    /// States entered by executing a step, in order
    pub const STEPS: [Self; 6] = [
        Self::ContainerCreated,
        Self::ContentWritten,
        Self::ContentRead,
        Self::ContentListed,
        Self::ContentDeleted,
        Self::ContainerDeleted,
    ];

    /// Whether the run has stopped
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// One client's scripted walk through the lifecycle
#[async_trait]
pub trait Demo: Send {
    /// Banner title, e.g. "Getting Started with Amazon S3"
    fn title(&self) -> &'static str;

    /// Executes the client calls that lead into `state`
    ///
    /// Only called with the entries of [`DemoState::STEPS`].
    ///
    /// # Errors
    ///
    /// Returns the first `ServiceError` reported by the client
    async fn enter(&mut self, state: DemoState) -> ServiceResult<()>;
}

/// Why a run stopped early
#[derive(Debug)]
pub struct Failure {
    /// State the run was trying to enter
    pub step: DemoState,
    /// Taxonomy code of the error
    pub code: String,
    /// The reported error
    pub error: ServiceError,
}

/// Outcome of a run
#[derive(Debug)]
pub struct RunReport {
    /// `Done` or `Failed`
    pub state: DemoState,
    /// Last state reached successfully
    pub last_completed: DemoState,
    /// Error detail when the run failed
    pub failure: Option<Failure>,
    /// Wall-clock duration of the whole run
    pub duration: Duration,
}

impl RunReport {
    /// Whether every step succeeded
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.state, DemoState::Done)
    }

    /// Process exit code for this outcome
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Logs the timing summary at warn level
    #[allow(clippy::cast_precision_loss)]
    pub fn log_timing(&self) {
        let nanos = self.duration.as_nanos();
        warn!(state = %self.state, "Duration in nanoseconds: {}", nanos);
        warn!("Duration in milliseconds: {}", self.duration.as_millis());
        warn!("Duration in seconds: {}", self.duration.as_secs());
        warn!(
            "High Precision Duration in milliseconds: {}",
            nanos as f64 / 1_000_000.0
        );
        warn!(
            "High Precision Duration in seconds: {}",
            self.duration.as_secs_f64()
        );
    }
}

/// Drives a [`Demo`] from `Init` to a terminal state
pub struct DemoOrchestrator<D> {
    demo: D,
}

impl<D: Demo> DemoOrchestrator<D> {
    /// Wraps a demo
    #[must_use]
    pub const fn new(demo: D) -> Self {
        Self { demo }
    }

    /// Gives the demo back, e.g. to inspect what it recorded
    pub fn into_inner(self) -> D {
        self.demo
    }

    /// Runs every step in order, stopping at the first error
    pub async fn run(&mut self) -> RunReport {
        let started = Instant::now();
        let mut current = DemoState::Init;

        info!("===========================================");
        info!("{}", self.demo.title());
        info!("===========================================");

        for step in DemoState::STEPS {
            if let Err(error) = self.demo.enter(step).await {
                let code = error.taxonomy_code();
                error!(step = %step, code = %code, "Step {} failed: {}", step, error);
                error.log_detail();

                let report = RunReport {
                    state: DemoState::Failed,
                    last_completed: current,
                    failure: Some(Failure { step, code, error }),
                    duration: started.elapsed(),
                };
                report.log_timing();
                return report;
            }
            current = step;
        }

        let report = RunReport {
            state: DemoState::Done,
            last_completed: current,
            failure: None,
            duration: started.elapsed(),
        };
        report.log_timing();
        report
    }
}
