//! Event dispatch.
//!
//! Every inbound event is resolved from scratch against the immutable
//! [`CommandRegistry`]:
//!
//! ```text
//! name lookup ─┬─ style registry ─┐
//!              └─ hybrid registry ┴─┬─ entry point ─────────── invoke (top level)
//!                                   ├─ group + subcommand ──── invoke on group object
//!                                   ├─ subcommand ──────────── invoke on command object
//!                                   └─ nothing to resolve ──── Unresolved
//! ```
//!
//! Unknown command, group and subcommand names fail with
//! [`DispatchError::CommandNotFound`]; handler failures are wrapped in
//! [`DispatchError::Invocation`].

use std::sync::Arc;

use tracing::{Instrument, debug, debug_span, warn};

use crate::descriptor::{CommandDescriptor, OptionDescriptor};
use crate::error::{DispatchError, DispatchResult};
use crate::handler::{EntryPoint, Instance};
use crate::parser::{
    CommandParser, CommandPath, HybridCommandParser, PrefixCommandParser, PrefixTrigger,
    SlashCommandParser,
};
use crate::registry::CommandRegistry;
use crate::style::Style;
use relay_core::{BoxedBot, CommandData, PlatformEvent, SlashInteraction, TextMessage};

/// What a dispatch did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran to completion.
    Invoked {
        /// Fully qualified command name.
        command: String,
        /// Resolved path below the command.
        path: CommandPath,
    },
    /// The event is not a command invocation.
    Ignored,
    /// The command exists but the event names neither an entry point nor a
    /// subcommand of it.
    Unresolved {
        /// Top-level command name.
        command: String,
    },
}

impl DispatchOutcome {
    /// Whether a handler was invoked.
    pub fn is_invoked(&self) -> bool {
        matches!(self, Self::Invoked { .. })
    }
}

/// Routes platform events to command handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    trigger: PrefixTrigger,
}

impl Dispatcher {
    /// Creates a dispatcher over a built registry.
    pub fn new(registry: Arc<CommandRegistry>, trigger: PrefixTrigger) -> Self {
        Self { registry, trigger }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Returns the prefix trigger.
    pub fn trigger(&self) -> &PrefixTrigger {
        &self.trigger
    }

    /// Returns the registration payload of every slash and hybrid command.
    pub fn registration_data(&self) -> Vec<CommandData> {
        self.registry.registration_data()
    }

    /// Dispatches one platform event.
    ///
    /// `Ready` is not a command and is always [`DispatchOutcome::Ignored`].
    pub async fn dispatch(
        &self,
        event: &PlatformEvent,
        bot: BoxedBot,
    ) -> DispatchResult<DispatchOutcome> {
        match event {
            PlatformEvent::Ready => Ok(DispatchOutcome::Ignored),
            PlatformEvent::SlashCommand(interaction) => {
                self.dispatch_slash(interaction.clone(), bot).await
            }
            PlatformEvent::Message(message) => self.dispatch_message(message.clone(), bot).await,
        }
    }

    /// Dispatches a slash interaction to a slash command, or failing that, to a
    /// hybrid command of the same name.
    pub async fn dispatch_slash(
        &self,
        interaction: Arc<SlashInteraction>,
        bot: BoxedBot,
    ) -> DispatchResult<DispatchOutcome> {
        let name = interaction.command_name.clone();
        let span = debug_span!("dispatch", trigger = "slash", command = %name);

        async move {
            let group = interaction.subcommand_group.clone();
            let sub = interaction.subcommand_name.clone();
            let parser = SlashCommandParser::new(interaction, bot);

            if let Some(command) = self.registry.slash(&name) {
                return run(command, parser, group.as_deref(), sub.as_deref()).await;
            }
            if let Some(command) = self.registry.hybrid(&name) {
                let parser = HybridCommandParser::from(parser);
                return run(command, parser, group.as_deref(), sub.as_deref()).await;
            }

            Err(DispatchError::CommandNotFound(name))
        }
        .instrument(span)
        .await
    }

    /// Dispatches a text message to a prefix command, or failing that, to a
    /// hybrid command of the same name.
    ///
    /// Messages without the trigger, and messages the bot wrote itself, are
    /// [`DispatchOutcome::Ignored`].
    pub async fn dispatch_message(
        &self,
        message: Arc<TextMessage>,
        bot: BoxedBot,
    ) -> DispatchResult<DispatchOutcome> {
        if message.author.id == bot.self_user().id {
            return Ok(DispatchOutcome::Ignored);
        }

        let parser = PrefixCommandParser::new(message, bot, &self.trigger);
        let Some(name) = parser.command_name().map(str::to_string) else {
            return Ok(DispatchOutcome::Ignored);
        };
        let span = debug_span!("dispatch", trigger = "message", command = %name);

        async move {
            if let Some(command) = self.registry.prefix(&name) {
                let (group, sub) = prefix_sub_path(command, &parser);
                return run(command, parser, group.as_deref(), sub.as_deref()).await;
            }
            if let Some(command) = self.registry.hybrid(&name) {
                let (group, sub) = prefix_sub_path(command, &parser);
                let parser = HybridCommandParser::from(parser);
                return run(command, parser, group.as_deref(), sub.as_deref()).await;
            }

            Err(DispatchError::CommandNotFound(name))
        }
        .instrument(span)
        .await
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// The handler an event resolved to.
struct Target<'a> {
    path: CommandPath,
    entry_point: &'a EntryPoint,
    instance: &'a Instance,
    options: &'a [OptionDescriptor],
}

/// Reads the group and subcommand names from message tokens 1 and 2.
///
/// Token 1 names a group only when token 2 exists and `command` has a group
/// of that name; otherwise it names a plain subcommand.
fn prefix_sub_path<S: Style>(
    command: &CommandDescriptor<S>,
    parser: &PrefixCommandParser,
) -> (Option<String>, Option<String>) {
    match (parser.token(1), parser.token(2)) {
        (Some(group), Some(sub)) if command.group(group).is_some() => {
            (Some(group.to_string()), Some(sub.to_string()))
        }
        (first, _) => (None, first.map(str::to_string)),
    }
}

fn resolve<'a, S: Style>(
    command: &'a CommandDescriptor<S>,
    group: Option<&str>,
    sub: Option<&str>,
) -> DispatchResult<Option<Target<'a>>> {
    if let Some(entry_point) = command.entry_point() {
        return Ok(Some(Target {
            path: CommandPath::TopLevel,
            entry_point,
            instance: command.instance(),
            options: command.options(),
        }));
    }

    match (group, sub) {
        (Some(group_name), Some(sub_name)) => {
            let group = command
                .group(group_name)
                .ok_or_else(|| DispatchError::CommandNotFound(group_name.to_string()))?;
            let subcommand = group
                .subcommand(sub_name)
                .ok_or_else(|| DispatchError::CommandNotFound(sub_name.to_string()))?;

            Ok(Some(Target {
                path: CommandPath::SubcommandInGroup {
                    group: group_name.to_string(),
                    subcommand: sub_name.to_string(),
                },
                entry_point: subcommand.entry_point(),
                instance: group.instance(),
                options: subcommand.options(),
            }))
        }
        (None, Some(sub_name)) => {
            let subcommand = command
                .subcommand(sub_name)
                .ok_or_else(|| DispatchError::CommandNotFound(sub_name.to_string()))?;

            Ok(Some(Target {
                path: CommandPath::Subcommand(sub_name.to_string()),
                entry_point: subcommand.entry_point(),
                instance: command.instance(),
                options: subcommand.options(),
            }))
        }
        _ => Ok(None),
    }
}

async fn run<S, P>(
    command: &CommandDescriptor<S>,
    mut parser: P,
    group: Option<&str>,
    sub: Option<&str>,
) -> DispatchResult<DispatchOutcome>
where
    S: Style,
    P: CommandParser,
{
    let Some(target) = resolve(command, group, sub)? else {
        warn!(
            style = %S::KIND,
            command = command.name(),
            "Command has no entry point and the event names no subcommand"
        );
        return Ok(DispatchOutcome::Unresolved {
            command: command.name().to_string(),
        });
    };

    parser.bind_properties(&target.path, target.options);
    let args = parser.build_invocation_arguments();
    let qualified = target.path.qualified(command.name());

    debug!(
        style = %S::KIND,
        command = %qualified,
        handler = target.entry_point.name(),
        arity = args.arity(),
        "Resolved command"
    );

    target
        .entry_point
        .invoke(Arc::clone(target.instance), args)
        .await
        .map_err(|source| DispatchError::Invocation {
            command: qualified.clone(),
            source,
        })?;

    Ok(DispatchOutcome::Invoked {
        command: qualified,
        path: target.path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvokeError;
    use crate::style::CommandStyle;
    use crate::test_support::{Log, MockBot, author, channel, echo_class, ping_class, role_class};
    use relay_core::{Bot, OptionMapping, OptionType, OptionValue, Role, User};

    fn dispatcher(log: &Log) -> Dispatcher {
        let registry = CommandRegistry::builder()
            .command(ping_class(log))
            .command(echo_class(log))
            .command(role_class(log, CommandStyle::Prefix))
            .command(role_class(log, CommandStyle::Slash))
            .build()
            .unwrap();
        Dispatcher::new(Arc::new(registry), PrefixTrigger::default())
    }

    fn message(content: &str) -> Arc<TextMessage> {
        Arc::new(TextMessage::new(author(), channel(), content))
    }

    #[tokio::test]
    async fn test_prefix_top_level() {
        let log = Log::default();
        let bot = MockBot::new();

        let outcome = dispatcher(&log)
            .dispatch_message(message("!ping"), bot.clone())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Invoked {
                command: "ping".into(),
                path: CommandPath::TopLevel,
            }
        );
        assert_eq!(log.entries(), vec!["ping:prefix"]);
        assert_eq!(bot.replies(), vec![("pong".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_slash_top_level() {
        let log = Log::default();
        let interaction = SlashInteraction::new("ping", author(), channel());

        let outcome = dispatcher(&log)
            .dispatch(&PlatformEvent::from(interaction), MockBot::new())
            .await
            .unwrap();

        assert!(outcome.is_invoked());
        assert_eq!(log.entries(), vec!["ping:slash"]);
    }

    #[tokio::test]
    async fn test_falls_through_to_hybrid() {
        let log = Log::default();
        let dispatcher = dispatcher(&log);

        let bot = MockBot::new();
        let interaction = SlashInteraction::new("say", author(), channel())
            .with_option(OptionMapping::string("text", "hi"))
            .with_option(OptionMapping::integer("times", 2));
        dispatcher
            .dispatch_slash(Arc::new(interaction), bot.clone())
            .await
            .unwrap();
        assert_eq!(bot.replies(), vec![("hi hi".to_string(), false)]);

        let bot = MockBot::new();
        dispatcher
            .dispatch_message(message("!say hi 2 true"), bot.clone())
            .await
            .unwrap();
        assert_eq!(bot.replies(), vec![("HI HI".to_string(), false)]);

        assert_eq!(
            log.entries(),
            vec![
                r#"echo:hybrid:Some("hi"):Some(2):None"#,
                r#"echo:hybrid:Some("hi"):Some(2):Some(true)"#,
            ]
        );
    }

    #[tokio::test]
    async fn test_slash_group_runs_on_group_object() {
        let log = Log::default();
        let interaction = SlashInteraction::new("role", author(), channel())
            .with_group("admin")
            .with_subcommand("add")
            .with_option(OptionMapping::new(
                "role",
                OptionType::Role,
                OptionValue::Role(Role::new(7, "mods")),
            ));

        let outcome = dispatcher(&log)
            .dispatch_slash(Arc::new(interaction), MockBot::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Invoked {
                command: "role admin add".into(),
                path: CommandPath::SubcommandInGroup {
                    group: "admin".into(),
                    subcommand: "add".into(),
                },
            }
        );
        assert_eq!(log.entries(), vec!["admin.add:mods:-"]);
    }

    #[tokio::test]
    async fn test_prefix_group_and_subcommand() {
        let log = Log::default();
        let dispatcher = dispatcher(&log);

        let content = "!role admin add <@&7> <@42>";
        let message = TextMessage::new(author(), channel(), content)
            .mentioning_role(Role::new(7, "mods"))
            .mentioning_user(User::new(42, "bob"));
        let outcome = dispatcher
            .dispatch_message(Arc::new(message), MockBot::new())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            DispatchOutcome::Invoked { ref command, .. } if command == "role admin add"
        ));

        let outcome = dispatcher
            .dispatch_message(self::message("!role list"), MockBot::new())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            DispatchOutcome::Invoked { path: CommandPath::Subcommand(ref sub), .. } if sub == "list"
        ));

        assert_eq!(log.entries(), vec!["admin.add:mods:bob", "role.list"]);
    }

    #[tokio::test]
    async fn test_unknown_names_fail() {
        let log = Log::default();
        let dispatcher = dispatcher(&log);

        for (content, missing) in [
            ("!zzz", "zzz"),
            ("!role nope", "nope"),
            ("!role admin nope", "nope"),
        ] {
            let err = dispatcher
                .dispatch_message(message(content), MockBot::new())
                .await
                .unwrap_err();
            assert!(err.is_not_found());
            assert!(matches!(err, DispatchError::CommandNotFound(ref name) if name == missing));
        }

        let interaction = SlashInteraction::new("role", author(), channel())
            .with_group("owner")
            .with_subcommand("add");
        let err = dispatcher
            .dispatch_slash(Arc::new(interaction), MockBot::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::CommandNotFound(ref name) if name == "owner"));

        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_to_resolve() {
        let log = Log::default();
        let outcome = dispatcher(&log)
            .dispatch_message(message("!role"), MockBot::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Unresolved {
                command: "role".into()
            }
        );
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_events() {
        let log = Log::default();
        let dispatcher = dispatcher(&log);
        let bot = MockBot::new();

        let plain = dispatcher
            .dispatch_message(message("hello there"), bot.clone())
            .await
            .unwrap();
        assert_eq!(plain, DispatchOutcome::Ignored);

        let own = TextMessage::new(bot.self_user().clone(), channel(), "!ping");
        let own = dispatcher
            .dispatch_message(Arc::new(own), bot.clone())
            .await
            .unwrap();
        assert_eq!(own, DispatchOutcome::Ignored);

        let ready = dispatcher
            .dispatch(&PlatformEvent::Ready, bot.clone())
            .await
            .unwrap();
        assert_eq!(ready, DispatchOutcome::Ignored);

        assert!(log.entries().is_empty());
        assert!(bot.replies().is_empty());
    }

    #[tokio::test]
    async fn test_handler_failure_is_wrapped() {
        let log = Log::default();
        let err = dispatcher(&log)
            .dispatch_message(message("!role admin remove"), MockBot::new())
            .await
            .unwrap_err();

        match err {
            DispatchError::Invocation { command, source } => {
                assert_eq!(command, "role admin remove");
                assert!(matches!(source, InvokeError::Argument(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registration_data() {
        let log = Log::default();
        let names: Vec<_> = dispatcher(&log)
            .registration_data()
            .into_iter()
            .map(|data| data.name)
            .collect();
        assert_eq!(names, vec!["ping", "role", "say"]);
    }
}
