//! Slash command parser.
//!
//! Slash interactions arrive pre-structured: the platform has already split
//! the command name, the group and subcommand names and the typed option
//! values. Binding reads options by declared name.

use std::sync::Arc;

use crate::argument::Argument;
use crate::descriptor::OptionDescriptor;
use crate::event::{CommandEvent, SlashCommandEvent};
use crate::parser::{BoundSlot, CommandOptionMapping, CommandParser, CommandPath, coerce};
use relay_core::{
    Attachment, BoxedBot, Channel, Member, Mentionable, OptionMapping, OptionType, Role,
    SlashInteraction, User,
};

/// Parses a slash interaction into a slash command invocation.
#[derive(Clone)]
pub struct SlashCommandParser {
    interaction: Arc<SlashInteraction>,
    bot: BoxedBot,
    path: CommandPath,
    slots: Vec<BoundSlot<SlashOptionMapping>>,
}

impl SlashCommandParser {
    /// Creates a parser for `interaction`.
    pub fn new(interaction: Arc<SlashInteraction>, bot: BoxedBot) -> Self {
        Self {
            interaction,
            bot,
            path: CommandPath::TopLevel,
            slots: Vec::new(),
        }
    }

    /// Returns the command name.
    pub fn command_name(&self) -> &str {
        &self.interaction.command_name
    }

    /// Returns the group name, if the interaction targets one.
    pub fn subcommand_group(&self) -> Option<&str> {
        self.interaction.subcommand_group.as_deref()
    }

    /// Returns the subcommand name, if the interaction targets one.
    pub fn subcommand_name(&self) -> Option<&str> {
        self.interaction.subcommand_name.as_deref()
    }

    /// Returns the triggering interaction.
    pub fn interaction(&self) -> &Arc<SlashInteraction> {
        &self.interaction
    }

    /// Returns the path the parser was bound at.
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    pub(crate) fn slash_event(&self) -> SlashCommandEvent {
        SlashCommandEvent {
            interaction: self.interaction.clone(),
            bot: self.bot.clone(),
            path: self.path.clone(),
            options: self.option_mappings(),
        }
    }
}

impl CommandParser for SlashCommandParser {
    type Mapping = SlashOptionMapping;

    fn resolve_source_event(&self) -> CommandEvent {
        CommandEvent::Slash(Arc::new(self.slash_event()))
    }

    fn bind_properties(&mut self, path: &CommandPath, options: &[OptionDescriptor]) {
        self.slots = options
            .iter()
            .map(|option| BoundSlot {
                kind: option.kind(),
                mapping: self
                    .interaction
                    .option(option.name())
                    .cloned()
                    .map(SlashOptionMapping::new),
            })
            .collect();
        self.path = path.clone();
    }

    fn bound_slots(&self) -> &[BoundSlot<SlashOptionMapping>] {
        &self.slots
    }
}

/// An option value delivered with a slash interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SlashOptionMapping(OptionMapping);

impl SlashOptionMapping {
    /// Wraps a platform option mapping.
    pub fn new(mapping: OptionMapping) -> Self {
        Self(mapping)
    }

    /// Returns the platform option mapping.
    pub fn inner(&self) -> &OptionMapping {
        &self.0
    }
}

impl CommandOptionMapping for SlashOptionMapping {
    fn name(&self) -> &str {
        &self.0.name
    }

    fn kind(&self) -> OptionType {
        self.0.kind
    }

    fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    fn as_long(&self) -> Option<i64> {
        self.0.as_long()
    }

    fn as_double(&self) -> Option<f64> {
        self.0.as_double()
    }

    fn as_string(&self) -> Option<String> {
        self.0.as_string()
    }

    fn as_user(&self) -> Option<User> {
        self.0.as_user()
    }

    fn as_member(&self) -> Option<Member> {
        self.0.as_member()
    }

    fn as_channel(&self) -> Option<Channel> {
        self.0.as_channel()
    }

    fn as_role(&self) -> Option<Role> {
        self.0.as_role()
    }

    fn as_mentionable(&self) -> Option<Mentionable> {
        self.0.as_mentionable()
    }

    fn as_attachment(&self) -> Option<Attachment> {
        self.0.as_attachment()
    }

    /// Falls back to the attachment view when the table yields nothing.
    fn to_argument(&self, kind: OptionType) -> Option<Argument> {
        coerce(self, kind).or_else(|| self.as_attachment().map(Argument::Attachment))
    }
}
