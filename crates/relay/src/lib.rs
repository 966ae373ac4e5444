//! # Relay
//!
//! Prefix, slash and hybrid command routing for chat bots.
//!
//! ## Overview
//!
//! A command is described once, as an annotated class, and Relay derives
//! everything else: the descriptor tree, the registration payload sent to
//! the platform, the parser for each invocation style and the typed
//! arguments handed to your handler.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌──────────┐     ┌──────────────────┐
//! │  Platform   │────▶│  Runtime   │────▶│Dispatcher│────▶│ Parser (prefix,  │──▶ handler
//! │  (events)   │     │(event loop)│     │          │     │ slash or hybrid) │
//! └─────────────┘     └────────────┘     └──────────┘     └──────────────────┘
//! ```
//!
//! - **Runtime**: Configuration, logging and the event loop
//! - **Dispatcher**: Resolves `command [group] [subcommand]` paths
//! - **Parsers**: Bind raw options to typed arguments in declaration order
//! - **Handlers**: User-defined async methods (Axum-style)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay::prelude::*;
//!
//! struct Ping;
//!
//! impl Ping {
//!     async fn ping(self: Arc<Self>, _event: CommandEvent) -> String {
//!         "pong".to_string()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = RelayRuntime::builder()
//!         .command(
//!             CommandClass::new(Ping)
//!                 .annotate(Annotation::hybrid_command("ping", "Replies with pong"))
//!                 .method(MethodMeta::new("ping", Ping::ping).main()),
//!         )
//!         .build()?;
//!
//!     platform.start(runtime.event_sender());
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use relay_core as core;
pub use relay_framework as framework;
pub use relay_runtime as runtime;

/// Prelude module for convenient imports.
///
/// This module provides all commonly used types for building command bots:
///
/// ```rust,ignore
/// use relay::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use relay_runtime::{EventSender, RelayConfig, RelayRuntime};

    // Command classes - for describing commands
    pub use relay_framework::{
        Annotation, CommandClass, CommandStyle, GroupClass, MethodMeta,
    };

    // Events and errors - for writing handlers
    pub use relay_framework::{BoxError, CommandEvent, InvokeError};

    // Platform model - for implementing a platform binding
    pub use relay_core::{
        ApiError, ApiResult, Attachment, Bot, BoxedBot, Channel, CommandData, Member,
        OptionType, PlatformEvent, Role, SlashInteraction, SourceEvent, TextMessage, User,
    };
}
