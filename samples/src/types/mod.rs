/// Environment and sample configuration
pub mod environment;

pub use environment::{ConfigError, Environment, SampleConfig};
