//! Inbound platform events.
//!
//! The platform library delivers three kinds of events the command layer
//! cares about: a structured slash interaction, a raw text message and the
//! ready notification sent once the session is established.

use std::sync::Arc;

use crate::entity::{Attachment, Channel, Member, Role, Snowflake, User};
use crate::option::OptionMapping;

/// A slash command interaction.
#[derive(Debug, Clone)]
pub struct SlashInteraction {
    /// Interaction id.
    pub id: Snowflake,
    /// Top-level command name.
    pub command_name: String,
    /// Subcommand group name, if the invocation targets a grouped subcommand.
    pub subcommand_group: Option<String>,
    /// Subcommand name, if the invocation targets a subcommand.
    pub subcommand_name: Option<String>,
    /// Supplied options of the innermost invoked command.
    pub options: Vec<OptionMapping>,
    /// Invoking user.
    pub user: User,
    /// Invoking member, when used inside a guild.
    pub member: Option<Member>,
    /// Channel the interaction was used in.
    pub channel: Channel,
    /// Guild the interaction was used in.
    pub guild_id: Option<Snowflake>,
}

impl SlashInteraction {
    /// Creates an interaction for `command_name` without options.
    pub fn new(command_name: impl Into<String>, user: User, channel: Channel) -> Self {
        Self {
            id: 0,
            command_name: command_name.into(),
            subcommand_group: None,
            subcommand_name: None,
            options: Vec::new(),
            user,
            member: None,
            channel,
            guild_id: None,
        }
    }

    /// Sets the subcommand name.
    pub fn with_subcommand(mut self, name: impl Into<String>) -> Self {
        self.subcommand_name = Some(name.into());
        self
    }

    /// Sets the subcommand group name.
    pub fn with_group(mut self, name: impl Into<String>) -> Self {
        self.subcommand_group = Some(name.into());
        self
    }

    /// Appends a supplied option.
    pub fn with_option(mut self, option: OptionMapping) -> Self {
        self.options.push(option);
        self
    }

    /// Sets the guild context.
    pub fn in_guild(mut self, guild_id: Snowflake, member: Member) -> Self {
        self.guild_id = Some(guild_id);
        self.member = Some(member);
        self
    }

    /// Looks up a supplied option by name.
    pub fn option(&self, name: &str) -> Option<&OptionMapping> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Returns the full invoked path, e.g. `role admin add`.
    pub fn full_command_name(&self) -> String {
        [
            Some(self.command_name.as_str()),
            self.subcommand_group.as_deref(),
            self.subcommand_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A text message received in a channel.
#[derive(Debug, Clone)]
pub struct TextMessage {
    /// Message id.
    pub id: Snowflake,
    /// Author account.
    pub author: User,
    /// Author membership, when sent inside a guild.
    pub member: Option<Member>,
    /// Channel the message was sent in.
    pub channel: Channel,
    /// Guild the message was sent in.
    pub guild_id: Option<Snowflake>,
    /// Raw message text.
    pub content: String,
    /// Users mentioned in the message.
    pub mentioned_users: Vec<User>,
    /// Members mentioned in the message.
    pub mentioned_members: Vec<Member>,
    /// Roles mentioned in the message.
    pub mentioned_roles: Vec<Role>,
    /// Channels mentioned in the message.
    pub mentioned_channels: Vec<Channel>,
    /// Files uploaded with the message.
    pub attachments: Vec<Attachment>,
}

impl TextMessage {
    /// Creates a message with no mentions or attachments.
    pub fn new(author: User, channel: Channel, content: impl Into<String>) -> Self {
        Self {
            id: 0,
            author,
            member: None,
            channel,
            guild_id: None,
            content: content.into(),
            mentioned_users: Vec::new(),
            mentioned_members: Vec::new(),
            mentioned_roles: Vec::new(),
            mentioned_channels: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Records a mentioned user.
    pub fn mentioning_user(mut self, user: User) -> Self {
        self.mentioned_users.push(user);
        self
    }

    /// Records a mentioned member. The member's user is recorded as well.
    pub fn mentioning_member(mut self, member: Member) -> Self {
        if !self.mentioned_users.iter().any(|u| u.id == member.user.id) {
            self.mentioned_users.push(member.user.clone());
        }
        self.mentioned_members.push(member);
        self
    }

    /// Records a mentioned role.
    pub fn mentioning_role(mut self, role: Role) -> Self {
        self.mentioned_roles.push(role);
        self
    }

    /// Records a mentioned channel.
    pub fn mentioning_channel(mut self, channel: Channel) -> Self {
        self.mentioned_channels.push(channel);
        self
    }

    /// Records an uploaded file.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sets the guild context.
    pub fn in_guild(mut self, guild_id: Snowflake, member: Member) -> Self {
        self.guild_id = Some(guild_id);
        self.member = Some(member);
        self
    }
}

/// The event a command invocation originated from.
///
/// This is what the bot replies to.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A slash interaction.
    Slash(Arc<SlashInteraction>),
    /// A text message.
    Message(Arc<TextMessage>),
}

impl SourceEvent {
    /// Returns the user who triggered the event.
    pub fn user(&self) -> &User {
        match self {
            Self::Slash(interaction) => &interaction.user,
            Self::Message(message) => &message.author,
        }
    }

    /// Returns the channel the event happened in.
    pub fn channel(&self) -> &Channel {
        match self {
            Self::Slash(interaction) => &interaction.channel,
            Self::Message(message) => &message.channel,
        }
    }

    /// Returns the guild the event happened in.
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::Slash(interaction) => interaction.guild_id,
            Self::Message(message) => message.guild_id,
        }
    }
}

/// Every event the command layer consumes.
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    /// The session is ready; commands can be registered.
    Ready,
    /// A slash interaction was used.
    SlashCommand(Arc<SlashInteraction>),
    /// A text message was received.
    Message(Arc<TextMessage>),
}

impl PlatformEvent {
    /// Returns a short name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::SlashCommand(_) => "slash_command",
            Self::Message(_) => "message",
        }
    }

    /// Returns the event a reply would answer, if any.
    pub fn source(&self) -> Option<SourceEvent> {
        match self {
            Self::Ready => None,
            Self::SlashCommand(interaction) => Some(SourceEvent::Slash(interaction.clone())),
            Self::Message(message) => Some(SourceEvent::Message(message.clone())),
        }
    }
}

impl From<SlashInteraction> for PlatformEvent {
    fn from(interaction: SlashInteraction) -> Self {
        Self::SlashCommand(Arc::new(interaction))
    }
}

impl From<TextMessage> for PlatformEvent {
    fn from(message: TextMessage) -> Self {
        Self::Message(Arc::new(message))
    }
}
