//! Relay Runtime - Orchestration layer for the Relay command framework.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `RelayConfig`)
//! - Logging configuration (`LoggingBuilder`, `SpanEvents`)
//! - The event loop (`RelayRuntime`) that feeds platform events to the
//!   dispatcher and registers commands once the platform is ready
//!
//! ```ignore
//! use relay_runtime::RelayRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = RelayRuntime::builder()
//!         .command(ping_class())
//!         .build()?;
//!
//!     // Hand the sender to the platform library
//!     platform.start(runtime.event_sender());
//!
//!     // Run until Ctrl+C
//!     runtime.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Configuration is read from `relay.toml` (or `config.toml`) in the working
//! directory, overlaid with `RELAY_` environment variables. Nested keys use a
//! double underscore: `RELAY_COMMANDS__PREFIX=?`.

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    CommandsConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig, Profile, RelayConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{EventSender, RelayRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
