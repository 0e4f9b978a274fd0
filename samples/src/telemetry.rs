//! Logging setup shared by the sample binaries

use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

use crate::types::SampleConfig;

/// Installs the global tracing subscriber
///
/// Uses JSON format for staging/production and the regular format for
/// development. `RUST_LOG` directives override the configured level.
pub fn init(config: &SampleConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.tracing_level()).into())
        .from_env_lossy();

    if config.environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}
