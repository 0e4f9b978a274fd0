use std::process::ExitCode;
use std::sync::Arc;

use aws_sdk_sqs::Client as SqsClient;
use samples::{telemetry, types::SampleConfig, DemoOrchestrator, QueueDemo};
use service_clients::{ReceiveConfig, SqsMessageQueue};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = SampleConfig::from_env()?;
    telemetry::init(&config);

    let sqs_client = Arc::new(SqsClient::new(&config.aws_config().await));
    let service = Arc::new(SqsMessageQueue::new(
        sqs_client,
        ReceiveConfig {
            visibility_timeout_seconds: None,
            wait_time_seconds: config.receive_wait_time_seconds,
        },
    ));

    let report = DemoOrchestrator::new(QueueDemo::new(service)).run().await;
    Ok(report.exit_code())
}
