//! Runtime error types.

use thiserror::Error;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command class could not be built.
    #[error("Failed to build commands: {0}")]
    Build(#[from] relay_framework::BuildError),

    /// The runtime is already processing events.
    #[error("Runtime is already running")]
    AlreadyRunning,

    /// A shutdown signal handler could not be installed.
    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
