//! # Relay Framework
//!
//! Command routing for chat bots: prefix, slash and hybrid commands.
//!
//! This layer provides:
//! - Annotation vocabulary describing command classes, their entry points,
//!   subcommands, groups and options
//! - Descriptor builders, generic over the command [`Style`]
//! - An immutable [`CommandRegistry`] of built descriptors
//! - Prefix, slash and hybrid parsers that bind raw options to typed
//!   [`Argument`]s in declaration order
//! - Axum-style typed handlers and a [`Dispatcher`] that resolves
//!   `command [group] [subcommand]` paths and invokes them
//! - Registration-time localization of names and descriptions
//!
//! # Example
//!
//! ```rust,ignore
//! struct Ping;
//!
//! impl Ping {
//!     async fn ping(self: Arc<Self>, _event: CommandEvent) -> String {
//!         "pong".to_string()
//!     }
//! }
//!
//! let registry = CommandRegistry::builder()
//!     .command(
//!         CommandClass::new(Ping)
//!             .annotate(Annotation::hybrid_command("ping", "Replies with pong"))
//!             .method(MethodMeta::new("ping", Ping::ping).main()),
//!     )
//!     .build()?;
//! let dispatcher = Dispatcher::new(Arc::new(registry), PrefixTrigger::default());
//! ```

pub mod argument;
pub mod builder;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod localization;
pub mod meta;
pub mod parser;
pub mod registry;
pub mod style;

#[cfg(test)]
mod test_support;

pub use argument::{Argument, ArgumentValue, DeclaredType, FromArgument, InvocationArguments};
pub use builder::{CommandBuilder, HybridCommandBuilder, PrefixCommandBuilder, SlashCommandBuilder};
pub use descriptor::{
    AnyCommand, CommandDescriptor, Localizations, OptionDescriptor, SubcommandDescriptor,
    SubcommandGroupDescriptor,
};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{
    ArgumentError, BoxError, BuildError, BuildResult, DispatchError, DispatchResult, InvokeError,
    InvokeResult, LocalizationError, LocalizationResult,
};
pub use event::{
    CommandEvent, HybridCommandEvent, HybridSource, PrefixCommandEvent, SlashCommandEvent,
};
pub use handler::{EntryPoint, HandleResponse, Handler, Instance};
pub use localization::{
    BundleLocalization, EmptyLocalization, LocalizationFunction, SharedLocalization,
};
pub use meta::{
    Annotated, Annotation, CommandClass, GroupClass, GroupConstructor, MethodMeta, ParamMeta,
};
pub use parser::{
    CommandOptionMapping, CommandParser, CommandPath, HybridCommandParser, HybridOptionMapping,
    PrefixCommandParser, PrefixOptionMapping, PrefixTrigger, SlashCommandParser,
    SlashOptionMapping,
};
pub use registry::{CommandRegistry, RegistryBuilder};
pub use style::{CommandStyle, Hybrid, Prefix, Slash, SlashLike, Style};
