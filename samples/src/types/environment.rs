//! Environment configuration for the samples

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use thiserror::Error;
use tracing::Level;

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Credential profile used when none is configured
pub const DEFAULT_PROFILE: &str = "default";

/// `LocalStack` edge endpoint used in development
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Errors raised while reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `APP_ENV` holds an unknown stage
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// A numeric variable could not be parsed
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// A list variable contained no entries
    #[error("{0} must name at least one region")]
    EmptyRegionList(&'static str),
}

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` holds an unknown value
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidEnvironment(env)),
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&'static str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some(LOCALSTACK_ENDPOINT),
        }
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Explicit configuration handed to client construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleConfig {
    /// Deployment stage
    pub environment: Environment,
    /// Region selecting the service endpoint
    pub region: String,
    /// Named credential profile selecting the identity
    pub credential_profile: String,
    /// Endpoint override, e.g. `LocalStack`
    pub endpoint_url: Option<String>,
    /// Regions the object store sample sweeps
    pub regions: Vec<String>,
    /// Long polling wait for queue receives (in seconds)
    pub receive_wait_time_seconds: i32,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl SampleConfig {
    /// Reads the configuration from the environment
    ///
    /// Recognized variables: `APP_ENV`, `SAMPLE_REGION`, `SAMPLE_PROFILE`,
    /// `SAMPLE_ENDPOINT_URL`, `SAMPLE_REGIONS` (comma separated) and
    /// `SAMPLE_RECEIVE_WAIT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown stage, a non-numeric wait time or
    /// a region list without entries
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env()?;
        let region = non_empty_var("SAMPLE_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        let credential_profile =
            non_empty_var("SAMPLE_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let endpoint_url = non_empty_var("SAMPLE_ENDPOINT_URL").or_else(|| {
            environment
                .override_aws_endpoint_url()
                .map(ToString::to_string)
        });

        let regions = match non_empty_var("SAMPLE_REGIONS") {
            Some(list) => {
                let regions: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|region| !region.is_empty())
                    .map(ToString::to_string)
                    .collect();
                if regions.is_empty() {
                    return Err(ConfigError::EmptyRegionList("SAMPLE_REGIONS"));
                }
                regions
            }
            None => vec![region.clone()],
        };

        let receive_wait_time_seconds = match non_empty_var("SAMPLE_RECEIVE_WAIT_SECS") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                var: "SAMPLE_RECEIVE_WAIT_SECS",
                value,
            })?,
            None => 0,
        };

        Ok(Self {
            environment,
            region,
            credential_profile,
            endpoint_url,
            regions,
            receive_wait_time_seconds,
        })
    }

    /// Returns a copy targeting `region`
    #[must_use]
    pub fn for_region(&self, region: &str) -> Self {
        Self {
            region: region.to_string(),
            ..self.clone()
        }
    }

    /// AWS configuration for the selected region and profile
    ///
    /// Retries are pinned to a single attempt so every failure surfaces
    /// exactly as the service reported it.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard().with_max_attempts(1);

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .profile_name(&self.credential_profile)
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        loader.load().await
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config);

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self.environment, Environment::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Default log level, overridable through `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    }
}
