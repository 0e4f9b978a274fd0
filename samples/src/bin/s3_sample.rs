use std::process::ExitCode;
use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use samples::{telemetry, types::SampleConfig, DemoOrchestrator, ObjectStoreDemo};
use service_clients::S3ObjectStore;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = SampleConfig::from_env()?;
    telemetry::init(&config);

    let mut failed_regions = Vec::new();
    for region in &config.regions {
        let regional = config.for_region(region);
        info!(region = %region, "Running S3 sample in {}", region);

        let s3_client = Arc::new(S3Client::from_conf(regional.s3_client_config().await));
        let store = Arc::new(S3ObjectStore::new(s3_client));
        let report = DemoOrchestrator::new(ObjectStoreDemo::new(store)).run().await;

        if !report.succeeded() {
            failed_regions.push(region.clone());
        }
    }

    if failed_regions.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    error!("S3 sample failed in: {}", failed_regions.join(", "));
    Ok(ExitCode::FAILURE)
}
