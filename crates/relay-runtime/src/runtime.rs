//! Main runtime orchestration.
//!
//! The runtime owns the dispatcher and an inbound event queue. A platform
//! library pushes `(PlatformEvent, BoxedBot)` pairs through an
//! [`EventSender`]; the runtime handles each one on its own task.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use relay_runtime::RelayRuntime;
//!
//! let runtime = RelayRuntime::builder()
//!     .config_file("config/relay.toml")
//!     .command(ping_class())
//!     .build()?;
//!
//! platform.on_event(runtime.event_sender());
//! runtime.run().await?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, debug_span, error, info, trace, warn};

use crate::config::{ConfigLoader, RelayConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use relay_core::{BoxedBot, PlatformEvent};
use relay_framework::{
    CommandClass, CommandRegistry, DispatchError, DispatchOutcome, Dispatcher, PrefixTrigger,
    RegistryBuilder,
};

type Inbound = (PlatformEvent, BoxedBot);

// =============================================================================
// EventSender
// =============================================================================

/// Delivers platform events to a [`RelayRuntime`].
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl EventSender {
    /// Queues an event. Returns `false` once the runtime has been dropped.
    pub fn send(&self, event: impl Into<PlatformEvent>, bot: BoxedBot) -> bool {
        self.tx.send((event.into(), bot)).is_ok()
    }
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("closed", &self.tx.is_closed())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// EventHandler
// =============================================================================

/// Per-event behavior, shared by every spawned event task.
#[derive(Clone)]
struct EventHandler {
    dispatcher: Arc<Dispatcher>,
    reply_on_unknown: bool,
    tracker: TaskTracker,
}

impl EventHandler {
    async fn handle(&self, event: PlatformEvent, bot: BoxedBot) {
        match event {
            PlatformEvent::Ready => self.register_commands(bot),
            event => self.dispatch(event, bot).await,
        }
    }

    /// Submits registration data without waiting for the platform's answer.
    fn register_commands(&self, bot: BoxedBot) {
        let commands = self.dispatcher.registration_data();
        let count = commands.len();

        self.tracker.spawn(async move {
            match bot.update_commands(commands).await {
                Ok(()) => info!(count, "Command registration submitted"),
                Err(e) => error!(error = %e, "Platform rejected command registration"),
            }
        });
    }

    async fn dispatch(&self, event: PlatformEvent, bot: BoxedBot) {
        match self.dispatcher.dispatch(&event, Arc::clone(&bot)).await {
            Ok(DispatchOutcome::Invoked { command, .. }) => {
                debug!(command = %command, "Command completed");
            }
            Ok(DispatchOutcome::Ignored) => {
                trace!(event = event.event_name(), "Event ignored");
            }
            Ok(DispatchOutcome::Unresolved { command }) => {
                self.reply_unknown(&event, &bot, &command).await;
            }
            Err(DispatchError::CommandNotFound(name)) => {
                warn!(name = %name, "Unknown command");
                self.reply_unknown(&event, &bot, &name).await;
            }
            Err(e) => error!(error = %e, "Command failed"),
        }
    }

    async fn reply_unknown(&self, event: &PlatformEvent, bot: &BoxedBot, name: &str) {
        if !self.reply_on_unknown {
            return;
        }
        let Some(source) = event.source() else {
            return;
        };

        let content = format!("Unknown command: {name}");
        if let Err(e) = bot.reply(&source, &content, true).await {
            warn!(error = %e, "Failed to send unknown command reply");
        }
    }
}

// =============================================================================
// RelayRuntime
// =============================================================================

/// The Relay runtime: configuration, dispatcher and event loop.
pub struct RelayRuntime {
    config: RelayConfig,
    handler: EventHandler,
    sender: EventSender,
    /// Taken while running.
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Inbound>>>,
}

impl RelayRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from loaded configuration and a built registry.
    ///
    /// Logging is left untouched; see [`logging::init_from_config`].
    pub fn from_config(config: RelayConfig, registry: CommandRegistry) -> Self {
        let trigger = PrefixTrigger::new(
            config.commands.prefix.clone(),
            config.commands.when_mention,
        );
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), trigger));
        let (tx, rx) = mpsc::unbounded_channel();

        info!(
            commands = dispatcher.registry().len(),
            prefix = %config.commands.prefix,
            when_mention = config.commands.when_mention,
            "Runtime initialized from configuration"
        );

        Self {
            handler: EventHandler {
                dispatcher,
                reply_on_unknown: config.commands.reply_on_unknown,
                tracker: TaskTracker::new(),
            },
            config,
            sender: EventSender { tx },
            receiver: Mutex::new(Some(rx)),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.handler.dispatcher
    }

    /// Returns a handle for delivering events.
    pub fn event_sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Returns whether the event loop is running.
    pub fn is_running(&self) -> bool {
        self.receiver.lock().is_none()
    }

    /// Handles one event on the calling task.
    ///
    /// Errors are logged, never returned. Command registration triggered by
    /// `Ready` continues in the background.
    pub async fn handle_event(&self, event: PlatformEvent, bot: BoxedBot) {
        let span = debug_span!("event", kind = event.event_name());
        self.handler.handle(event, bot).instrument(span).await;
    }

    /// Runs the event loop until a shutdown signal is received.
    pub async fn run(&self) -> RuntimeResult<()> {
        let shutdown = shutdown_signal()?;
        info!("Relay runtime is now running. Press Ctrl+C to stop.");
        self.run_until(shutdown).await
    }

    /// Runs the event loop until `shutdown` completes.
    ///
    /// Events already queued are handled before shutdown is observed, and
    /// in-flight events finish before this returns.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let Some(mut receiver) = self.receiver.lock().take() else {
            warn!("Runtime is already running");
            return Err(RuntimeError::AlreadyRunning);
        };
        let tracker = &self.handler.tracker;

        info!("Starting Relay runtime");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                inbound = receiver.recv() => {
                    let Some((event, bot)) = inbound else {
                        break;
                    };
                    let handler = self.handler.clone();
                    let span = debug_span!("event", kind = event.event_name());
                    tracker.spawn(async move { handler.handle(event, bot).await }.instrument(span));
                }
                () = &mut shutdown => break,
            }
        }

        info!(in_flight = tracker.len(), "Stopping Relay runtime");
        tracker.close();
        tracker.wait().await;
        tracker.reopen();

        *self.receiver.lock() = Some(receiver);
        info!("Runtime stopped");

        Ok(())
    }
}

impl fmt::Debug for RelayRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayRuntime")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
fn shutdown_signal() -> RuntimeResult<impl Future<Output = ()>> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(RuntimeError::Signal)?;

        Ok(async move {
            tokio::select! {
                () = ctrl_c() => info!("Received Ctrl+C, shutting down"),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            }
        })
    }

    #[cfg(not(unix))]
    {
        Ok(async {
            ctrl_c().await;
            info!("Received Ctrl+C, shutting down");
        })
    }
}

async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `RelayRuntime`.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = RelayRuntime::builder()
///     .profile("production")
///     .command(ping_class())
///     .hybrid(echo_class())
///     .build()?;
/// ```
#[derive(Debug)]
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    registry: RegistryBuilder,
    init_logging: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            registry: RegistryBuilder::default(),
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: RelayConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Overrides a single configuration value by dotted key.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Skips installing the global log subscriber.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Adds a command class under every style it is annotated with.
    pub fn command(mut self, class: CommandClass) -> Self {
        self.registry = self.registry.command(class);
        self
    }

    /// Adds several command classes.
    pub fn commands(mut self, classes: impl IntoIterator<Item = CommandClass>) -> Self {
        self.registry = self.registry.commands(classes);
        self
    }

    /// Adds a command class as a prefix command.
    pub fn prefix(mut self, class: CommandClass) -> Self {
        self.registry = self.registry.prefix(class);
        self
    }

    /// Adds a command class as a slash command.
    pub fn slash(mut self, class: CommandClass) -> Self {
        self.registry = self.registry.slash(class);
        self
    }

    /// Adds a command class as a hybrid command.
    pub fn hybrid(mut self, class: CommandClass) -> Self {
        self.registry = self.registry.hybrid(class);
        self
    }

    /// Loads and validates configuration, initializes logging and builds
    /// every command.
    pub fn build(self) -> RuntimeResult<RelayRuntime> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let registry = self.registry.build()?;
        Ok(RelayRuntime::from_config(config, registry))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    use async_trait::async_trait;
    use relay_core::{ApiResult, Bot, Channel, CommandData, SourceEvent, TextMessage, User};
    use relay_framework::{Annotation, BoxError, CommandEvent, MethodMeta};
    use tokio::sync::oneshot;
    use tokio_test::assert_ok;

    struct RecordingBot {
        user: User,
        replies: std::sync::Mutex<Vec<(String, bool)>>,
        registrations: std::sync::Mutex<Vec<Vec<String>>>,
    }

    impl RecordingBot {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                user: User::bot(999, "relay"),
                replies: Default::default(),
                registrations: Default::default(),
            })
        }

        fn replies(&self) -> Vec<(String, bool)> {
            let mut replies = self.replies.lock().unwrap().clone();
            replies.sort();
            replies
        }

        fn registrations(&self) -> Vec<Vec<String>> {
            self.registrations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Bot for RecordingBot {
        fn self_user(&self) -> &User {
            &self.user
        }

        async fn update_commands(&self, commands: Vec<CommandData>) -> ApiResult<()> {
            let names = commands.into_iter().map(|c| c.name).collect();
            self.registrations.lock().unwrap().push(names);
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

    struct Ping;

    impl Ping {
        async fn ping(self: Arc<Self>, _event: CommandEvent) -> String {
            "pong".to_string()
        }

        async fn fail(self: Arc<Self>, _event: CommandEvent) -> Result<(), BoxError> {
            Err("boom".into())
        }
    }

    fn ping_class() -> CommandClass {
        CommandClass::new(Ping)
            .annotate(Annotation::prefix_command("", "Replies with pong"))
            .annotate(Annotation::slash_command("", "Replies with pong"))
            .method(MethodMeta::new("ping", Ping::ping).main())
    }

    fn fail_class() -> CommandClass {
        CommandClass::new(Ping)
            .annotate(Annotation::prefix_command("fail", "Always fails"))
            .method(MethodMeta::new("fail", Ping::fail).main())
    }

    fn runtime(config: RelayConfig) -> RelayRuntime {
        let registry = CommandRegistry::builder()
            .command(ping_class())
            .command(fail_class())
            .build()
            .unwrap();
        RelayRuntime::from_config(config, registry)
    }

    fn message(content: &str) -> TextMessage {
        TextMessage::new(User::new(1, "alice"), Channel::text(10, "general"), content)
    }

    #[tokio::test]
    async fn test_event_loop_handles_queued_events() {
        let runtime = runtime(RelayConfig::default());
        let bot = RecordingBot::new();
        let sender = runtime.event_sender();

        assert!(sender.send(PlatformEvent::Ready, bot.clone()));
        assert!(sender.send(message("!ping"), bot.clone()));
        assert!(sender.send(message("!nope"), bot.clone()));
        assert!(sender.send(message("just chatting"), bot.clone()));

        assert_ok!(runtime.run_until(async {}).await);

        assert_eq!(
            bot.replies(),
            vec![
                ("Unknown command: nope".to_string(), true),
                ("pong".to_string(), false),
            ]
        );
        assert_eq!(bot.registrations(), vec![vec!["ping".to_string()]]);
        assert!(!runtime.is_running());
    }

    #[tokio::test]
    async fn test_unknown_reply_can_be_disabled() {
        let mut config = RelayConfig::default();
        config.commands.reply_on_unknown = false;
        let runtime = runtime(config);
        let bot = RecordingBot::new();

        runtime
            .handle_event(message("!nope").into(), bot.clone())
            .await;
        assert!(bot.replies().is_empty());
    }

    #[tokio::test]
    async fn test_handler_failure_is_contained() {
        let runtime = runtime(RelayConfig::default());
        let bot = RecordingBot::new();

        runtime.handle_event(message("!fail").into(), bot.clone()).await;
        runtime.handle_event(message("!ping").into(), bot.clone()).await;
        assert_eq!(bot.replies(), vec![("pong".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_run_twice_concurrently() {
        let runtime = runtime(RelayConfig::default());
        let (tx, rx) = oneshot::channel::<()>();

        let (first, second) = tokio::join!(
            runtime.run_until(async {
                let _ = rx.await;
            }),
            async {
                let result = runtime.run_until(async {}).await;
                let _ = tx.send(());
                result
            }
        );

        assert_ok!(first);
        assert!(matches!(second, Err(RuntimeError::AlreadyRunning)));
        assert_ok!(runtime.run_until(async {}).await);
    }

    #[test]
    fn test_builder() {
        let dir = std::env::temp_dir().join(format!("relay-runtime-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut config = RelayConfig::default();
        config.commands.prefix = "?".into();
        let runtime = RelayRuntime::builder()
            .search_path(&dir)
            .without_env()
            .without_logging()
            .merge(config)
            .command(ping_class())
            .build()
            .unwrap();
        assert_eq!(runtime.dispatcher().trigger().prefix(), "?");
        assert_eq!(runtime.dispatcher().registry().len(), 2);

        let err = RelayRuntime::builder()
            .search_path(&dir)
            .without_env()
            .without_logging()
            .hybrid(ping_class())
            .build()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Build(_)));

        let mut config = RelayConfig::default();
        config.commands.prefix = String::new();
        let err = RelayRuntime::builder()
            .search_path(&dir)
            .without_env()
            .without_logging()
            .merge(config)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
    }
}
