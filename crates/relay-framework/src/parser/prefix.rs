//! Prefix command parser.
//!
//! ```text
//! "!role admin add <@&7> <@42>"
//!   │ └──────────────────────── tokens: [role, admin, add, <@&7>, <@42>]
//!   └─ trigger
//! ```
//!
//! Token 0 is the command name, tokens 1 and 2 may name a subcommand or a
//! group and its subcommand, and whatever follows the resolved path is bound
//! positionally to the declared options. Values stay raw strings until
//! binding coerces them by the declared type.

use std::sync::Arc;

use crate::argument::Argument;
use crate::descriptor::OptionDescriptor;
use crate::event::{CommandEvent, PrefixCommandEvent};
use crate::parser::{BoundSlot, CommandOptionMapping, CommandParser, CommandPath, coerce};
use relay_core::{
    Attachment, BoxedBot, Channel, Member, Mentionable, OptionType, Role, Snowflake, TextMessage,
    User,
};

// ============================================================================
// Trigger
// ============================================================================

/// What marks a text message as a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTrigger {
    prefix: String,
    when_mention: bool,
}

impl PrefixTrigger {
    /// Creates a trigger. An empty prefix disables prefix matching.
    pub fn new(prefix: impl Into<String>, when_mention: bool) -> Self {
        Self {
            prefix: prefix.into(),
            when_mention,
        }
    }

    /// Returns the prefix literal.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether mentioning the bot works as a prefix.
    pub fn when_mention(&self) -> bool {
        self.when_mention
    }

    /// Returns the command text after the trigger, if `content` starts with one.
    ///
    /// The prefix is tried first, then `<@id> ` and `<@!id> ` of `bot`.
    pub fn strip<'a>(&self, content: &'a str, bot: &User) -> Option<&'a str> {
        if !self.prefix.is_empty()
            && let Some(rest) = content.strip_prefix(self.prefix.as_str())
        {
            return Some(rest);
        }

        if self.when_mention {
            for mention in [format!("<@{}> ", bot.id), format!("<@!{}> ", bot.id)] {
                if let Some(rest) = content.strip_prefix(mention.as_str()) {
                    return Some(rest);
                }
            }
        }

        None
    }
}

impl Default for PrefixTrigger {
    fn default() -> Self {
        Self::new("!", false)
    }
}

/// Splits command text on single spaces, dropping trailing empty tokens.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text.split(' ').map(str::to_string).collect();
    while tokens.last().is_some_and(String::is_empty) {
        tokens.pop();
    }
    tokens
}

// ============================================================================
// Parser
// ============================================================================

/// Parses a text message into a prefix command invocation.
#[derive(Clone)]
pub struct PrefixCommandParser {
    message: Arc<TextMessage>,
    bot: BoxedBot,
    tokens: Vec<String>,
    path: CommandPath,
    slots: Vec<BoundSlot<PrefixOptionMapping>>,
}

impl PrefixCommandParser {
    /// Creates a parser for `message`.
    ///
    /// Messages that do not start with the trigger, or whose command name is
    /// empty, are not commands; every query on such a parser is inert.
    pub fn new(message: Arc<TextMessage>, bot: BoxedBot, trigger: &PrefixTrigger) -> Self {
        let tokens = match trigger.strip(&message.content, bot.self_user()) {
            Some(rest) => {
                let tokens = tokenize(rest);
                if tokens.first().is_some_and(|name| !name.is_empty()) {
                    tokens
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        };

        Self {
            message,
            bot,
            tokens,
            path: CommandPath::TopLevel,
            slots: Vec::new(),
        }
    }

    /// Whether the message is a command invocation.
    pub fn is_command(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Returns the command name.
    pub fn command_name(&self) -> Option<&str> {
        self.token(0)
    }

    /// Returns token `index`.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Returns every token.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns the tokens after the command name.
    pub fn raw_options(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// Returns the triggering message.
    pub fn message(&self) -> &Arc<TextMessage> {
        &self.message
    }

    /// Returns the path the parser was bound at.
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    pub(crate) fn prefix_event(&self) -> PrefixCommandEvent {
        PrefixCommandEvent {
            message: self.message.clone(),
            bot: self.bot.clone(),
            command_name: self.command_name().unwrap_or_default().to_string(),
            path: self.path.clone(),
            raw_arguments: self.raw_options().to_vec(),
            options: self.option_mappings(),
        }
    }
}

impl CommandParser for PrefixCommandParser {
    type Mapping = PrefixOptionMapping;

    fn resolve_source_event(&self) -> CommandEvent {
        CommandEvent::Prefix(Arc::new(self.prefix_event()))
    }

    fn bind_properties(&mut self, path: &CommandPath, options: &[OptionDescriptor]) {
        let values = self.tokens.get(path.depth()..).unwrap_or_default();

        self.slots = options
            .iter()
            .enumerate()
            .map(|(index, option)| BoundSlot {
                kind: option.kind(),
                mapping: values.get(index).map(|raw| PrefixOptionMapping {
                    name: option.name().to_string(),
                    kind: option.kind(),
                    raw: raw.clone(),
                    message: self.message.clone(),
                }),
            })
            .collect();
        self.path = path.clone();
    }

    fn bound_slots(&self) -> &[BoundSlot<PrefixOptionMapping>] {
        &self.slots
    }
}

// ============================================================================
// Option mapping
// ============================================================================

/// A raw token bound to a declared option.
///
/// Entity accessors resolve mention markup or a bare id against the
/// entities the message mentions or carries.
#[derive(Clone)]
pub struct PrefixOptionMapping {
    name: String,
    kind: OptionType,
    raw: String,
    message: Arc<TextMessage>,
}

impl PrefixOptionMapping {
    /// Returns the raw token.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    fn user_id(&self) -> Option<Snowflake> {
        match parse_mention(&self.raw)? {
            Mention::User(id) | Mention::Id(id) => Some(id),
            Mention::Role(_) | Mention::Channel(_) => None,
        }
    }

    fn channel_id(&self) -> Option<Snowflake> {
        match parse_mention(&self.raw)? {
            Mention::Channel(id) | Mention::Id(id) => Some(id),
            Mention::User(_) | Mention::Role(_) => None,
        }
    }

    fn role_id(&self) -> Option<Snowflake> {
        match parse_mention(&self.raw)? {
            Mention::Role(id) | Mention::Id(id) => Some(id),
            Mention::User(_) | Mention::Channel(_) => None,
        }
    }
}

impl std::fmt::Debug for PrefixOptionMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixOptionMapping")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

impl CommandOptionMapping for PrefixOptionMapping {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> OptionType {
        self.kind
    }

    fn as_bool(&self) -> Option<bool> {
        if self.raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if self.raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn as_long(&self) -> Option<i64> {
        self.raw.parse().ok()
    }

    fn as_double(&self) -> Option<f64> {
        self.raw.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn as_string(&self) -> Option<String> {
        Some(self.raw.clone())
    }

    fn as_user(&self) -> Option<User> {
        let id = self.user_id()?;
        self.message
            .mentioned_users
            .iter()
            .find(|u| u.id == id)
            .or_else(|| {
                self.message
                    .mentioned_members
                    .iter()
                    .map(|m| &m.user)
                    .find(|u| u.id == id)
            })
            .cloned()
    }

    fn as_member(&self) -> Option<Member> {
        let id = self.user_id()?;
        self.message
            .mentioned_members
            .iter()
            .find(|m| m.user.id == id)
            .cloned()
    }

    fn as_channel(&self) -> Option<Channel> {
        let id = self.channel_id()?;
        self.message
            .mentioned_channels
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    fn as_role(&self) -> Option<Role> {
        let id = self.role_id()?;
        self.message
            .mentioned_roles
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn as_mentionable(&self) -> Option<Mentionable> {
        match parse_mention(&self.raw)? {
            Mention::User(_) => self
                .as_member()
                .map(Mentionable::Member)
                .or_else(|| self.as_user().map(Mentionable::User)),
            Mention::Role(_) => self.as_role().map(Mentionable::Role),
            Mention::Channel(_) => self.as_channel().map(Mentionable::Channel),
            Mention::Id(_) => self
                .as_member()
                .map(Mentionable::Member)
                .or_else(|| self.as_user().map(Mentionable::User))
                .or_else(|| self.as_role().map(Mentionable::Role))
                .or_else(|| self.as_channel().map(Mentionable::Channel)),
        }
    }

    fn as_attachment(&self) -> Option<Attachment> {
        self.message
            .attachments
            .iter()
            .find(|a| a.filename == self.raw || a.id.to_string() == self.raw)
            .cloned()
    }

    fn to_argument(&self, kind: OptionType) -> Option<Argument> {
        match kind {
            OptionType::Attachment => self.as_attachment().map(Argument::Attachment),
            other => coerce(self, other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mention {
    User(Snowflake),
    Role(Snowflake),
    Channel(Snowflake),
    Id(Snowflake),
}

/// Parses `<@id>`, `<@!id>`, `<@&id>`, `<#id>` or a bare id.
fn parse_mention(raw: &str) -> Option<Mention> {
    let Some(inner) = raw.strip_prefix('<').and_then(|s| s.strip_suffix('>')) else {
        return raw.parse().ok().map(Mention::Id);
    };

    if let Some(id) = inner.strip_prefix("@&") {
        id.parse().ok().map(Mention::Role)
    } else if let Some(id) = inner.strip_prefix("@!") {
        id.parse().ok().map(Mention::User)
    } else if let Some(id) = inner.strip_prefix('@') {
        id.parse().ok().map(Mention::User)
    } else if let Some(id) = inner.strip_prefix('#') {
        id.parse().ok().map(Mention::Channel)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::test_support::{MockBot, author, channel, options};
    use relay_core::Bot;

    fn parser(content: &str, trigger: &PrefixTrigger) -> PrefixCommandParser {
        let message = TextMessage::new(author(), channel(), content);
        PrefixCommandParser::new(Arc::new(message), MockBot::new(), trigger)
    }

    #[test]
    fn test_tokenization() {
        let p = parser("!foo bar baz", &PrefixTrigger::default());
        assert!(p.is_command());
        assert_eq!(p.tokens(), &["foo", "bar", "baz"]);
        assert_eq!(p.command_name(), Some("foo"));
        assert_eq!(p.raw_options(), &["bar", "baz"]);
    }

    #[test]
    fn test_not_a_command() {
        let trigger = PrefixTrigger::default();
        assert!(!parser("hello there", &trigger).is_command());
        assert!(!parser("! ping", &trigger).is_command());
        assert!(!parser("!", &trigger).is_command());

        let p = parser("hello", &trigger);
        assert_eq!(p.command_name(), None);
        assert!(p.raw_options().is_empty());
    }

    #[test]
    fn test_trailing_spaces_dropped() {
        let p = parser("!ping  ", &PrefixTrigger::default());
        assert_eq!(p.tokens(), &["ping"]);

        let p = parser("!say a  b", &PrefixTrigger::default());
        assert_eq!(p.tokens(), &["say", "a", "", "b"]);
    }

    #[test]
    fn test_mention_trigger() {
        let bot_id = MockBot::new().self_user().id;
        let trigger = PrefixTrigger::new("!", true);

        let p = parser(&format!("<@{bot_id}> ping"), &trigger);
        assert_eq!(p.command_name(), Some("ping"));

        let p = parser(&format!("<@!{bot_id}> ping now"), &trigger);
        assert_eq!(p.tokens(), &["ping", "now"]);

        assert!(!parser(&format!("<@{bot_id}>ping"), &trigger).is_command());
        assert!(!parser("<@1> ping", &trigger).is_command());

        let off = PrefixTrigger::new("!", false);
        assert!(!parser(&format!("<@{bot_id}> ping"), &off).is_command());
    }

    #[test]
    fn test_empty_prefix_disables_prefix_matching() {
        let trigger = PrefixTrigger::new("", false);
        assert!(!parser("ping", &trigger).is_command());
    }

    #[test]
    fn test_positional_binding_pads_missing_values() {
        let mut p = parser("!calc 5", &PrefixTrigger::default());
        p.bind_properties(
            &CommandPath::TopLevel,
            &options(&[
                ("a", OptionType::Integer),
                ("b", OptionType::Integer),
                ("c", OptionType::Boolean),
            ]),
        );

        let args = p.build_invocation_arguments();
        assert_eq!(args.arity(), 4);
        assert_eq!(args.values(), &[Some(Argument::Integer(5)), None, None]);
        assert!(matches!(args.event(), CommandEvent::Prefix(_)));
    }

    #[test]
    fn test_binding_skips_path_tokens_and_ignores_excess() {
        let mut p = parser("!role admin add 3 TRUE extra", &PrefixTrigger::default());
        p.bind_properties(
            &CommandPath::SubcommandInGroup {
                group: "admin".into(),
                subcommand: "add".into(),
            },
            &options(&[("n", OptionType::Number), ("flag", OptionType::Boolean)]),
        );

        let args = p.build_invocation_arguments();
        assert_eq!(
            args.values(),
            &[Some(Argument::Number(3.0)), Some(Argument::Boolean(true))]
        );
        let event = args.event().as_prefix().unwrap();
        assert_eq!(event.raw_arguments(), &["admin", "add", "3", "TRUE", "extra"]);
        assert_eq!(event.options().len(), 2);
        assert_eq!(event.option("flag").map(|o| o.raw()), Some("TRUE"));
    }

    #[test]
    fn test_failed_coercion_is_absent() {
        let mut p = parser("!calc five nope", &PrefixTrigger::default());
        p.bind_properties(
            &CommandPath::TopLevel,
            &options(&[("a", OptionType::Integer), ("b", OptionType::Boolean)]),
        );
        assert_eq!(p.build_invocation_arguments().values(), &[None::<Argument>, None]);
    }

    #[test]
    fn test_entity_resolution() {
        let target = User::new(42, "carol");
        let member = Member::new(target.clone(), 1);
        let role = Role::new(7, "mods");
        let general = Channel::text(9, "general");
        let file = Attachment {
            id: 11,
            filename: "log.txt".into(),
            url: "https://cdn.example/log.txt".into(),
            size: 10,
            content_type: None,
        };
        let message = TextMessage::new(author(), channel(), "!inspect <@!42> <@&7> <#9> 42 log.txt")
            .mentioning_member(member.clone())
            .mentioning_role(role.clone())
            .mentioning_channel(general.clone())
            .with_attachment(file.clone());

        let mut p = PrefixCommandParser::new(
            Arc::new(message),
            MockBot::new(),
            &PrefixTrigger::default(),
        );
        p.bind_properties(
            &CommandPath::TopLevel,
            &options(&[
                ("who", OptionType::User),
                ("role", OptionType::Role),
                ("where", OptionType::Channel),
                ("any", OptionType::Mentionable),
                ("file", OptionType::Attachment),
            ]),
        );

        let args = p.build_invocation_arguments();
        assert_eq!(
            args.values(),
            &[
                Some(Argument::User {
                    user: target,
                    member: Some(member.clone())
                }),
                Some(Argument::Role(role)),
                Some(Argument::Channel(general)),
                Some(Argument::Mentionable(Mentionable::Member(member))),
                Some(Argument::Attachment(file)),
            ]
        );
    }

    #[test]
    fn test_unknown_mention_is_absent() {
        let mut p = parser("!kick <@5>", &PrefixTrigger::default());
        p.bind_properties(&CommandPath::TopLevel, &options(&[("who", OptionType::User)]));
        assert_eq!(p.build_invocation_arguments().values(), &[None::<Argument>]);
    }

    #[test]
    fn test_parse_mention() {
        assert_eq!(parse_mention("<@12>"), Some(Mention::User(12)));
        assert_eq!(parse_mention("<@!12>"), Some(Mention::User(12)));
        assert_eq!(parse_mention("<@&12>"), Some(Mention::Role(12)));
        assert_eq!(parse_mention("<#12>"), Some(Mention::Channel(12)));
        assert_eq!(parse_mention("12"), Some(Mention::Id(12)));
        assert_eq!(parse_mention("<:emoji:12>"), None);
        assert_eq!(parse_mention("bob"), None);
    }
}
