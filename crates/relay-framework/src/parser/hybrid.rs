//! Hybrid command parser.
//!
//! A hybrid command can be triggered by a text message or a slash
//! interaction. The hybrid parser wraps the parser of whichever trigger fired,
//! lets it do the binding, and re-wraps the result so the handler sees one
//! event type and one mapping type either way.

use std::sync::Arc;

use crate::argument::Argument;
use crate::descriptor::OptionDescriptor;
use crate::event::{CommandEvent, HybridCommandEvent, HybridSource};
use crate::parser::{
    BoundSlot, CommandOptionMapping, CommandParser, CommandPath, PrefixCommandParser,
    PrefixOptionMapping, SlashCommandParser, SlashOptionMapping,
};
use relay_core::{Attachment, Channel, Member, Mentionable, OptionType, Role, User};

/// The parser a hybrid parser delegates to.
#[derive(Clone)]
pub enum HybridParserSource {
    /// A text message trigger.
    Prefix(PrefixCommandParser),
    /// A slash interaction trigger.
    Slash(SlashCommandParser),
}

/// Parses either trigger into a hybrid command invocation.
#[derive(Clone)]
pub struct HybridCommandParser {
    source: HybridParserSource,
    slots: Vec<BoundSlot<HybridOptionMapping>>,
}

impl HybridCommandParser {
    /// Wraps a prefix parser.
    pub fn from_prefix(parser: PrefixCommandParser) -> Self {
        Self {
            source: HybridParserSource::Prefix(parser),
            slots: Vec::new(),
        }
    }

    /// Wraps a slash parser.
    pub fn from_slash(parser: SlashCommandParser) -> Self {
        Self {
            source: HybridParserSource::Slash(parser),
            slots: Vec::new(),
        }
    }

    /// Returns the wrapped parser.
    pub fn source_parser(&self) -> &HybridParserSource {
        &self.source
    }
}

impl From<PrefixCommandParser> for HybridCommandParser {
    fn from(parser: PrefixCommandParser) -> Self {
        Self::from_prefix(parser)
    }
}

impl From<SlashCommandParser> for HybridCommandParser {
    fn from(parser: SlashCommandParser) -> Self {
        Self::from_slash(parser)
    }
}

fn rewrap<M, F>(slots: &[BoundSlot<M>], wrap: F) -> Vec<BoundSlot<HybridOptionMapping>>
where
    M: CommandOptionMapping,
    F: Fn(M) -> HybridOptionMapping,
{
    slots
        .iter()
        .map(|slot| BoundSlot {
            kind: slot.kind,
            mapping: slot.mapping.clone().map(&wrap),
        })
        .collect()
}

impl CommandParser for HybridCommandParser {
    type Mapping = HybridOptionMapping;

    fn resolve_source_event(&self) -> CommandEvent {
        let source = match &self.source {
            HybridParserSource::Prefix(parser) => HybridSource::Prefix(parser.prefix_event()),
            HybridParserSource::Slash(parser) => HybridSource::Slash(parser.slash_event()),
        };

        CommandEvent::Hybrid(Arc::new(HybridCommandEvent {
            source,
            options: self.option_mappings(),
        }))
    }

    fn bind_properties(&mut self, path: &CommandPath, options: &[OptionDescriptor]) {
        self.slots = match &mut self.source {
            HybridParserSource::Prefix(parser) => {
                parser.bind_properties(path, options);
                rewrap(parser.bound_slots(), HybridOptionMapping::Prefix)
            }
            HybridParserSource::Slash(parser) => {
                parser.bind_properties(path, options);
                rewrap(parser.bound_slots(), HybridOptionMapping::Slash)
            }
        };
    }

    fn bound_slots(&self) -> &[BoundSlot<HybridOptionMapping>] {
        &self.slots
    }
}

/// A style-neutral option mapping.
#[derive(Debug, Clone)]
pub enum HybridOptionMapping {
    /// Bound from a message token.
    Prefix(PrefixOptionMapping),
    /// Bound from an interaction option.
    Slash(SlashOptionMapping),
}

macro_rules! delegate {
    ($self:ident.$method:ident($($arg:expr),*)) => {
        match $self {
            HybridOptionMapping::Prefix(m) => m.$method($($arg),*),
            HybridOptionMapping::Slash(m) => m.$method($($arg),*),
        }
    };
}

impl CommandOptionMapping for HybridOptionMapping {
    fn name(&self) -> &str {
        delegate!(self.name())
    }

    fn kind(&self) -> OptionType {
        delegate!(self.kind())
    }

    fn as_bool(&self) -> Option<bool> {
        delegate!(self.as_bool())
    }

    fn as_long(&self) -> Option<i64> {
        delegate!(self.as_long())
    }

    fn as_double(&self) -> Option<f64> {
        delegate!(self.as_double())
    }

    fn as_string(&self) -> Option<String> {
        delegate!(self.as_string())
    }

    fn as_user(&self) -> Option<User> {
        delegate!(self.as_user())
    }

    fn as_member(&self) -> Option<Member> {
        delegate!(self.as_member())
    }

    fn as_channel(&self) -> Option<Channel> {
        delegate!(self.as_channel())
    }

    fn as_role(&self) -> Option<Role> {
        delegate!(self.as_role())
    }

    fn as_mentionable(&self) -> Option<Mentionable> {
        delegate!(self.as_mentionable())
    }

    fn as_attachment(&self) -> Option<Attachment> {
        delegate!(self.as_attachment())
    }

    fn to_argument(&self, kind: OptionType) -> Option<Argument> {
        delegate!(self.to_argument(kind))
    }
}
