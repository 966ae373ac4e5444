//! Shared fixtures for unit tests.

use std::any::Any;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::descriptor::OptionDescriptor;
use crate::event::{CommandEvent, PrefixCommandEvent};
use crate::meta::{Annotation, CommandClass, GroupClass, MethodMeta};
use crate::parser::CommandPath;
use crate::style::CommandStyle;
use relay_core::{
    ApiResult, Bot, Channel, CommandData, OptionType, Role, SourceEvent, TextMessage, User,
};

// ============================================================================
// Bot and entities
// ============================================================================

pub(crate) struct MockBot {
    user: User,
    replies: Mutex<Vec<(String, bool)>>,
    registrations: Mutex<Vec<Vec<CommandData>>>,
}

impl MockBot {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            user: User::bot(999, "relay"),
            replies: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn replies(&self) -> Vec<(String, bool)> {
        self.replies.lock().unwrap().clone()
    }

    pub(crate) fn registrations(&self) -> Vec<Vec<CommandData>> {
        self.registrations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for MockBot {
    fn self_user(&self) -> &User {
        &self.user
    }

    async fn update_commands(&self, commands: Vec<CommandData>) -> ApiResult<()> {
        self.registrations.lock().unwrap().push(commands);
        Ok(())
    }

    async fn reply(&self, _source: &SourceEvent, content: &str, ephemeral: bool) -> ApiResult<()> {
        self.replies
            .lock()
            .unwrap()
            .push((content.to_string(), ephemeral));
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub(crate) fn author() -> User {
    User::new(1, "alice")
}

pub(crate) fn channel() -> Channel {
    Channel::text(10, "general")
}

pub(crate) fn prefix_event() -> CommandEvent {
    CommandEvent::Prefix(Arc::new(PrefixCommandEvent {
        message: Arc::new(TextMessage::new(author(), channel(), "!ping")),
        bot: MockBot::new(),
        command_name: "ping".to_string(),
        path: CommandPath::TopLevel,
        raw_arguments: Vec::new(),
        options: Vec::new(),
    }))
}

pub(crate) fn options(declared: &[(&str, OptionType)]) -> Vec<OptionDescriptor> {
    declared
        .iter()
        .map(|(name, kind)| OptionDescriptor {
            kind: *kind,
            name: name.to_string(),
            description: None,
            required: false,
            autocomplete: false,
            choices: Vec::new(),
        })
        .collect()
}

// ============================================================================
// Sample commands
// ============================================================================

/// Records handler calls across command and group objects.
#[derive(Debug, Clone, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub(crate) struct Ping {
    log: Log,
}

impl Ping {
    async fn ping(self: Arc<Self>, event: CommandEvent) -> String {
        self.log.push(format!("ping:{}", event.style()));
        "pong".to_string()
    }
}

/// `ping`, prefix and slash, named after its entry point.
pub(crate) fn ping_class(log: &Log) -> CommandClass {
    CommandClass::new(Ping { log: log.clone() })
        .annotate(Annotation::prefix_command("", "Replies with pong"))
        .annotate(Annotation::slash_command("", "Replies with pong"))
        .method(MethodMeta::new("ping", Ping::ping).main())
}

pub(crate) struct Echo {
    log: Log,
}

impl Echo {
    async fn echo(
        self: Arc<Self>,
        event: CommandEvent,
        text: Option<String>,
        times: Option<i64>,
        loud: Option<bool>,
    ) -> Option<String> {
        self.log.push(format!(
            "echo:{}:{text:?}:{times:?}:{loud:?}",
            event.style()
        ));
        let text = text?;
        let text = if loud == Some(true) {
            text.to_uppercase()
        } else {
            text
        };
        let times = usize::try_from(times.unwrap_or(1)).unwrap_or(1);
        Some(vec![text; times].join(" "))
    }
}

/// `say`, hybrid, with three inferred options.
pub(crate) fn echo_class(log: &Log) -> CommandClass {
    let style = CommandStyle::Hybrid;
    CommandClass::new(Echo { log: log.clone() })
        .annotate(Annotation::hybrid_command("say", "Repeat text"))
        .method(
            MethodMeta::new("echo", Echo::echo)
                .main()
                .param(0, [Annotation::option(style, "text", "Text"), Annotation::Required])
                .param(1, [Annotation::option(style, "times", "Repetitions")])
                .param(2, [Annotation::option(style, "loud", "Shout")]),
        )
}

pub(crate) struct RoleCommand {
    log: Log,
}

impl RoleCommand {
    async fn list(self: Arc<Self>, _event: CommandEvent) {
        self.log.push("role.list");
    }
}

pub(crate) struct AdminGroup {
    log: Log,
}

impl AdminGroup {
    async fn add(
        self: Arc<Self>,
        _event: CommandEvent,
        role: Option<Role>,
        user: Option<User>,
    ) {
        self.log.push(format!(
            "admin.add:{}:{}",
            role.map_or_else(|| "-".to_string(), |r| r.name),
            user.map_or_else(|| "-".to_string(), |u| u.name),
        ));
    }

    async fn remove(self: Arc<Self>, _event: CommandEvent, role: Role) {
        self.log.push(format!("admin.remove:{}", role.name));
    }
}

/// `role`: no entry point, subcommand `list` and group `admin { add, remove }`.
pub(crate) fn role_class(log: &Log, style: CommandStyle) -> CommandClass {
    let group_log = log.clone();
    CommandClass::new(RoleCommand { log: log.clone() })
        .annotate(Annotation::command(style, "role", "Role tools"))
        .annotate(Annotation::GuildOnly)
        .method(
            MethodMeta::new("list", RoleCommand::list)
                .annotate(Annotation::subcommand(style, "", "List roles")),
        )
        .group(
            GroupClass::with_constructor(move || {
                Ok::<_, std::convert::Infallible>(AdminGroup {
                    log: group_log.clone(),
                })
            })
            .annotate(Annotation::group(style, "admin", "Admin tools"))
            .method(
                MethodMeta::new("add", AdminGroup::add)
                    .annotate(Annotation::subcommand(style, "", "Grant a role"))
                    .param(
                        0,
                        [
                            Annotation::typed_option(style, OptionType::Role, "role", "Role"),
                            Annotation::Required,
                        ],
                    )
                    .param(1, [Annotation::option(style, "user", "Member")]),
            )
            .method(
                MethodMeta::new("remove", AdminGroup::remove)
                    .annotate(Annotation::subcommand(style, "", "Revoke a role"))
                    .param(
                        0,
                        [Annotation::typed_option(style, OptionType::Role, "role", "Role")],
                    ),
            ),
        )
}
