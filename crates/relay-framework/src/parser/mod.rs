//! Event parsers.
//!
//! A parser wraps one inbound event and turns it into handler arguments in
//! three steps:
//!
//! 1. construction decides whether the event is a command at all and exposes
//!    its command name and sub-path;
//! 2. [`CommandParser::bind_properties`] pairs raw option mappings with the
//!    resolved descriptor's declared options, one slot per option;
//! 3. [`CommandParser::build_invocation_arguments`] coerces every bound slot
//!    by its declared type and prepends the style-neutral event.
//!
//! | Parser | Source | Binding |
//! |---|---|---|
//! | [`PrefixCommandParser`] | text message | positional, raw tokens |
//! | [`SlashCommandParser`] | slash interaction | by declared name |
//! | [`HybridCommandParser`] | either | delegates, re-wraps mappings |

mod hybrid;
mod prefix;
mod slash;

pub use hybrid::{HybridCommandParser, HybridOptionMapping, HybridParserSource};
pub use prefix::{PrefixCommandParser, PrefixOptionMapping, PrefixTrigger};
pub use slash::{SlashCommandParser, SlashOptionMapping};

use std::fmt;

use crate::argument::{Argument, InvocationArguments};
use crate::descriptor::OptionDescriptor;
use crate::event::CommandEvent;
use relay_core::{Attachment, Channel, Member, Mentionable, OptionType, Role, User};

// ============================================================================
// CommandPath
// ============================================================================

/// Where in the command tree an event resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommandPath {
    /// The command's own entry point.
    #[default]
    TopLevel,
    /// A direct subcommand.
    Subcommand(String),
    /// A subcommand inside a group.
    SubcommandInGroup {
        /// Group name.
        group: String,
        /// Subcommand name.
        subcommand: String,
    },
}

impl CommandPath {
    /// Number of name tokens the path consumes, counting the command name.
    pub fn depth(&self) -> usize {
        match self {
            Self::TopLevel => 1,
            Self::Subcommand(_) => 2,
            Self::SubcommandInGroup { .. } => 3,
        }
    }

    /// Returns the space separated full name under `command`.
    pub fn qualified(&self, command: &str) -> String {
        match self {
            Self::TopLevel => command.to_string(),
            Self::Subcommand(sub) => format!("{command} {sub}"),
            Self::SubcommandInGroup { group, subcommand } => {
                format!("{command} {group} {subcommand}")
            }
        }
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLevel => f.write_str("top-level"),
            Self::Subcommand(sub) => write!(f, "subcommand {sub}"),
            Self::SubcommandInGroup { group, subcommand } => {
                write!(f, "subcommand {subcommand} in group {group}")
            }
        }
    }
}

// ============================================================================
// Option mappings
// ============================================================================

/// A raw option value as a parser sees it.
///
/// The accessors are lossy: each returns `None` when the value has no view of
/// that kind.
pub trait CommandOptionMapping: fmt::Debug + Clone + Send + Sync {
    /// Returns the option name.
    fn name(&self) -> &str;
    /// Returns the option type.
    fn kind(&self) -> OptionType;
    /// Views the value as a boolean.
    fn as_bool(&self) -> Option<bool>;
    /// Views the value as an integer.
    fn as_long(&self) -> Option<i64>;
    /// Views the value as a floating point number.
    fn as_double(&self) -> Option<f64>;
    /// Returns the value's string form.
    fn as_string(&self) -> Option<String>;
    /// Views the value as a user.
    fn as_user(&self) -> Option<User>;
    /// Views the value as a guild member.
    fn as_member(&self) -> Option<Member>;
    /// Views the value as a channel.
    fn as_channel(&self) -> Option<Channel>;
    /// Views the value as a role.
    fn as_role(&self) -> Option<Role>;
    /// Views the value as a mentionable entity.
    fn as_mentionable(&self) -> Option<Mentionable>;
    /// Views the value as an attachment.
    fn as_attachment(&self) -> Option<Attachment>;

    /// Coerces the value to the declared option type.
    fn to_argument(&self, kind: OptionType) -> Option<Argument> {
        coerce(self, kind)
    }
}

/// The shared coercion table.
///
/// Types outside the table yield `None`.
pub fn coerce<M>(mapping: &M, kind: OptionType) -> Option<Argument>
where
    M: CommandOptionMapping + ?Sized,
{
    match kind {
        OptionType::Boolean => mapping.as_bool().map(Argument::Boolean),
        OptionType::Channel => mapping.as_channel().map(Argument::Channel),
        OptionType::Integer => mapping.as_long().map(Argument::Integer),
        OptionType::Mentionable => mapping.as_mentionable().map(Argument::Mentionable),
        OptionType::Number => mapping.as_double().map(Argument::Number),
        OptionType::String => mapping.as_string().map(Argument::String),
        OptionType::User => mapping.as_user().map(|user| Argument::User {
            user,
            member: mapping.as_member(),
        }),
        OptionType::Role => mapping.as_role().map(Argument::Role),
        OptionType::Attachment
        | OptionType::Subcommand
        | OptionType::SubcommandGroup
        | OptionType::Unknown => None,
    }
}

/// One declared option paired with the mapping bound to it.
#[derive(Debug, Clone)]
pub struct BoundSlot<M> {
    /// Declared option type.
    pub kind: OptionType,
    /// Bound mapping, if the event supplied one.
    pub mapping: Option<M>,
}

impl<M: CommandOptionMapping> BoundSlot<M> {
    fn argument(&self) -> Option<Argument> {
        self.mapping.as_ref().and_then(|m| m.to_argument(self.kind))
    }
}

// ============================================================================
// CommandParser
// ============================================================================

/// Behavior shared by the three parsers.
pub trait CommandParser {
    /// The mapping type this parser produces.
    type Mapping: CommandOptionMapping;

    /// Returns the style-neutral event handed to the handler.
    fn resolve_source_event(&self) -> CommandEvent;

    /// Binds the event's raw options to `options`, declared at `path`.
    fn bind_properties(&mut self, path: &CommandPath, options: &[OptionDescriptor]);

    /// Returns one slot per declared option.
    fn bound_slots(&self) -> &[BoundSlot<Self::Mapping>];

    /// Returns the mappings that were actually bound.
    fn option_mappings(&self) -> Vec<Self::Mapping> {
        self.bound_slots()
            .iter()
            .filter_map(|slot| slot.mapping.clone())
            .collect()
    }

    /// Builds `[event, option 1, .., option n]`.
    ///
    /// Missing values and failed coercions become empty slots; the argument
    /// list always has one slot per declared option.
    fn build_invocation_arguments(&self) -> InvocationArguments {
        let values = self.bound_slots().iter().map(BoundSlot::argument).collect();
        InvocationArguments::new(self.resolve_source_event(), values)
    }
}
