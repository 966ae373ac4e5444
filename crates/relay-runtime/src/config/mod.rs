//! Configuration module for the Relay runtime.
//!
//! This module provides layered configuration loading and validation for
//! command triggers and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CommandsConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, RelayConfig, SpanEventConfig,
};
pub use validation::validate_config;
