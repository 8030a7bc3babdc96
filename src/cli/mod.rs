//! Support code for the `wit-canon` binary: configuration and log setup.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, LogFormat, LoggingConfig, RuntimeConfig};
pub use logging::{LoggingError, init as init_logging};
