//! Command events handed to handlers as their first argument.
//!
//! Each parser produces its own event type. Handlers receive the
//! style-neutral [`CommandEvent`], which can reply, report who invoked the
//! command and expose the bound options without the handler knowing which
//! trigger fired it. Style specific details stay reachable through
//! [`CommandEvent::as_prefix`], [`CommandEvent::as_slash`] and
//! [`CommandEvent::as_hybrid`].

use std::fmt;
use std::sync::Arc;

use crate::parser::{
    CommandOptionMapping, CommandPath, HybridOptionMapping, PrefixOptionMapping,
    SlashOptionMapping,
};
use crate::style::CommandStyle;
use relay_core::{
    ApiResult, BoxedBot, Channel, Member, SlashInteraction, Snowflake, SourceEvent, TextMessage,
    User,
};

// ============================================================================
// Prefix
// ============================================================================

/// A prefix command invocation.
#[derive(Clone)]
pub struct PrefixCommandEvent {
    pub(crate) message: Arc<TextMessage>,
    pub(crate) bot: BoxedBot,
    pub(crate) command_name: String,
    pub(crate) path: CommandPath,
    pub(crate) raw_arguments: Vec<String>,
    pub(crate) options: Vec<PrefixOptionMapping>,
}

impl PrefixCommandEvent {
    /// Returns the triggering message.
    pub fn message(&self) -> &Arc<TextMessage> {
        &self.message
    }

    /// Returns the bot that received the message.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// Returns the command name token.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Returns the resolved sub-path.
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    /// Returns every token after the command name, excess tokens included.
    pub fn raw_arguments(&self) -> &[String] {
        &self.raw_arguments
    }

    /// Returns the bound option mappings.
    pub fn options(&self) -> &[PrefixOptionMapping] {
        &self.options
    }

    /// Looks up a bound option by name.
    pub fn option(&self, name: &str) -> Option<&PrefixOptionMapping> {
        self.options.iter().find(|o| o.name() == name)
    }
}

impl fmt::Debug for PrefixCommandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixCommandEvent")
            .field("message", &self.message.id)
            .field("command_name", &self.command_name)
            .field("path", &self.path)
            .field("raw_arguments", &self.raw_arguments)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Slash
// ============================================================================

/// A slash command invocation.
#[derive(Clone)]
pub struct SlashCommandEvent {
    pub(crate) interaction: Arc<SlashInteraction>,
    pub(crate) bot: BoxedBot,
    pub(crate) path: CommandPath,
    pub(crate) options: Vec<SlashOptionMapping>,
}

impl SlashCommandEvent {
    /// Returns the triggering interaction.
    pub fn interaction(&self) -> &Arc<SlashInteraction> {
        &self.interaction
    }

    /// Returns the bot that received the interaction.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// Returns the command name.
    pub fn command_name(&self) -> &str {
        &self.interaction.command_name
    }

    /// Returns the resolved sub-path.
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    /// Returns the bound option mappings.
    pub fn options(&self) -> &[SlashOptionMapping] {
        &self.options
    }

    /// Looks up a bound option by name.
    pub fn option(&self, name: &str) -> Option<&SlashOptionMapping> {
        self.options.iter().find(|o| o.name() == name)
    }
}

impl fmt::Debug for SlashCommandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommandEvent")
            .field("interaction", &self.interaction.id)
            .field("command_name", &self.interaction.command_name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Hybrid
// ============================================================================

/// The trigger a hybrid command was invoked through.
#[derive(Debug, Clone)]
pub enum HybridSource {
    /// A text message.
    Prefix(PrefixCommandEvent),
    /// A slash interaction.
    Slash(SlashCommandEvent),
}

/// A hybrid command invocation.
#[derive(Debug, Clone)]
pub struct HybridCommandEvent {
    pub(crate) source: HybridSource,
    pub(crate) options: Vec<HybridOptionMapping>,
}

impl HybridCommandEvent {
    /// Returns the underlying trigger.
    pub fn source(&self) -> &HybridSource {
        &self.source
    }

    /// Whether the command was invoked through a slash interaction.
    pub fn is_slash(&self) -> bool {
        matches!(self.source, HybridSource::Slash(_))
    }

    /// Returns the bound option mappings.
    pub fn options(&self) -> &[HybridOptionMapping] {
        &self.options
    }

    /// Looks up a bound option by name.
    pub fn option(&self, name: &str) -> Option<&HybridOptionMapping> {
        self.options.iter().find(|o| o.name() == name)
    }

    fn bot(&self) -> &BoxedBot {
        match &self.source {
            HybridSource::Prefix(event) => event.bot(),
            HybridSource::Slash(event) => event.bot(),
        }
    }

    fn command_name(&self) -> &str {
        match &self.source {
            HybridSource::Prefix(event) => event.command_name(),
            HybridSource::Slash(event) => event.command_name(),
        }
    }

    fn path(&self) -> &CommandPath {
        match &self.source {
            HybridSource::Prefix(event) => event.path(),
            HybridSource::Slash(event) => event.path(),
        }
    }

    fn source_event(&self) -> SourceEvent {
        match &self.source {
            HybridSource::Prefix(event) => SourceEvent::Message(event.message.clone()),
            HybridSource::Slash(event) => SourceEvent::Slash(event.interaction.clone()),
        }
    }
}

// ============================================================================
// CommandEvent
// ============================================================================

/// The event every handler receives first.
#[derive(Debug, Clone)]
pub enum CommandEvent {
    /// A prefix command invocation.
    Prefix(Arc<PrefixCommandEvent>),
    /// A slash command invocation.
    Slash(Arc<SlashCommandEvent>),
    /// A hybrid command invocation.
    Hybrid(Arc<HybridCommandEvent>),
}

impl CommandEvent {
    /// Returns the style of the command that was invoked.
    pub fn style(&self) -> CommandStyle {
        match self {
            Self::Prefix(_) => CommandStyle::Prefix,
            Self::Slash(_) => CommandStyle::Slash,
            Self::Hybrid(_) => CommandStyle::Hybrid,
        }
    }

    /// Returns the bot handle.
    pub fn bot(&self) -> &BoxedBot {
        match self {
            Self::Prefix(event) => event.bot(),
            Self::Slash(event) => event.bot(),
            Self::Hybrid(event) => event.bot(),
        }
    }

    /// Returns the platform event the command originated from.
    pub fn source(&self) -> SourceEvent {
        match self {
            Self::Prefix(event) => SourceEvent::Message(event.message.clone()),
            Self::Slash(event) => SourceEvent::Slash(event.interaction.clone()),
            Self::Hybrid(event) => event.source_event(),
        }
    }

    /// Returns the invoking user.
    pub fn user(&self) -> User {
        self.source().user().clone()
    }

    /// Returns the invoking member, inside a guild.
    pub fn member(&self) -> Option<Member> {
        match self.source() {
            SourceEvent::Slash(interaction) => interaction.member.clone(),
            SourceEvent::Message(message) => message.member.clone(),
        }
    }

    /// Returns the channel the command was used in.
    pub fn channel(&self) -> Channel {
        self.source().channel().clone()
    }

    /// Returns the guild the command was used in.
    pub fn guild_id(&self) -> Option<Snowflake> {
        self.source().guild_id()
    }

    /// Returns the top-level command name.
    pub fn command_name(&self) -> &str {
        match self {
            Self::Prefix(event) => event.command_name(),
            Self::Slash(event) => event.command_name(),
            Self::Hybrid(event) => event.command_name(),
        }
    }

    /// Returns the resolved sub-path.
    pub fn path(&self) -> &CommandPath {
        match self {
            Self::Prefix(event) => event.path(),
            Self::Slash(event) => event.path(),
            Self::Hybrid(event) => event.path(),
        }
    }

    /// Returns the fully qualified command name, e.g. `role admin add`.
    pub fn full_command_name(&self) -> String {
        self.path().qualified(self.command_name())
    }

    /// Returns the bound options as style-neutral mappings.
    pub fn options(&self) -> Vec<HybridOptionMapping> {
        match self {
            Self::Prefix(event) => event
                .options()
                .iter()
                .cloned()
                .map(HybridOptionMapping::Prefix)
                .collect(),
            Self::Slash(event) => event
                .options()
                .iter()
                .cloned()
                .map(HybridOptionMapping::Slash)
                .collect(),
            Self::Hybrid(event) => event.options().to_vec(),
        }
    }

    /// Looks up a bound option by name.
    pub fn option(&self, name: &str) -> Option<HybridOptionMapping> {
        self.options().into_iter().find(|o| o.name() == name)
    }

    /// Replies to the invoking event.
    pub async fn reply(&self, content: &str) -> ApiResult<()> {
        self.bot().reply(&self.source(), content, false).await
    }

    /// Replies visibly to the invoking user only, where supported.
    pub async fn reply_ephemeral(&self, content: &str) -> ApiResult<()> {
        self.bot().reply(&self.source(), content, true).await
    }

    /// Returns the prefix event, if this is a prefix invocation.
    pub fn as_prefix(&self) -> Option<&PrefixCommandEvent> {
        match self {
            Self::Prefix(event) => Some(event),
            _ => None,
        }
    }

    /// Returns the slash event, if this is a slash invocation.
    pub fn as_slash(&self) -> Option<&SlashCommandEvent> {
        match self {
            Self::Slash(event) => Some(event),
            _ => None,
        }
    }

    /// Returns the hybrid event, if this is a hybrid invocation.
    pub fn as_hybrid(&self) -> Option<&HybridCommandEvent> {
        match self {
            Self::Hybrid(event) => Some(event),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBot, author, channel};
    use relay_core::OptionMapping;

    fn slash_event(bot: &Arc<MockBot>) -> SlashCommandEvent {
        let interaction = SlashInteraction::new("role", author(), channel())
            .with_group("admin")
            .with_subcommand("add")
            .with_option(OptionMapping::string("note", "hi"));
        SlashCommandEvent {
            interaction: Arc::new(interaction),
            bot: bot.clone(),
            path: CommandPath::SubcommandInGroup {
                group: "admin".into(),
                subcommand: "add".into(),
            },
            options: vec![SlashOptionMapping::new(OptionMapping::string("note", "hi"))],
        }
    }

    #[tokio::test]
    async fn test_reply_goes_to_source() {
        let bot = MockBot::new();
        let event = CommandEvent::Slash(Arc::new(slash_event(&bot)));

        event.reply("done").await.unwrap();
        event.reply_ephemeral("secret").await.unwrap();

        assert_eq!(
            bot.replies(),
            vec![("done".to_string(), false), ("secret".to_string(), true)]
        );
    }

    #[test]
    fn test_hybrid_event_is_style_neutral() {
        let bot = MockBot::new();
        let slash = slash_event(&bot);
        let options = slash
            .options()
            .iter()
            .cloned()
            .map(HybridOptionMapping::Slash)
            .collect();
        let event = CommandEvent::Hybrid(Arc::new(HybridCommandEvent {
            source: HybridSource::Slash(slash),
            options,
        }));

        assert_eq!(event.style(), CommandStyle::Hybrid);
        assert_eq!(event.command_name(), "role");
        assert_eq!(event.full_command_name(), "role admin add");
        assert_eq!(event.user(), author());
        assert!(event.as_hybrid().is_some_and(HybridCommandEvent::is_slash));
        assert_eq!(
            event.option("note").and_then(|o| o.as_string()).as_deref(),
            Some("hi")
        );
        assert!(event.option("missing").is_none());
    }
}
