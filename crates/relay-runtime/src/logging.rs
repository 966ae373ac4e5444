//! Logging setup for the Relay runtime.
//!
//! Every dispatch runs inside a `dispatch` span carrying the trigger and the
//! command name, so span events are the quickest way to follow one command
//! through resolution, binding and invocation.
//!
//! # From configuration
//!
//! ```rust,ignore
//! use relay_runtime::{config::load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! # By hand
//!
//! ```rust,ignore
//! use relay_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .level(tracing::Level::DEBUG)
//!     .directive("relay_framework=trace")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{Level, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    /// No span events.
    pub const NONE: Self = Self::new(false, false, false, false);

    /// One line when a span opens, one with its timings when it closes.
    pub const LIFECYCLE: Self = Self::new(true, false, false, true);

    /// Every span event.
    pub const FULL: Self = Self::new(true, true, true, true);

    /// Enter and exit only.
    pub const ACTIVE: Self = Self::new(false, true, true, false);

    pub const fn new(new: bool, enter: bool, exit: bool, close: bool) -> Self {
        Self {
            new,
            enter,
            exit,
            close,
        }
    }

    fn to_fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self::new(config.new, config.enter, config.exit, config.close)
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

// =============================================================================
// LoggingBuilder
// =============================================================================

/// Builds and installs the global `tracing` subscriber.
#[derive(Debug)]
pub struct LoggingBuilder {
    level: Level,
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    target: bool,
    thread_ids: bool,
    file_location: bool,
    file_path: Option<PathBuf>,
    max_files: usize,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Compact output to stdout at INFO.
    pub fn new() -> Self {
        Self {
            level: Level::INFO,
            directives: Vec::new(),
            span_events: SpanEvents::NONE,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            target: true,
            thread_ids: false,
            file_location: false,
            file_path: None,
            max_files: 5,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.to_tracing_level(),
            directives: config
                .filters
                .iter()
                .map(|(module, level)| format!("{module}={level}"))
                .collect(),
            span_events: SpanEvents::from(&config.span_events),
            format: config.format,
            output: config.output,
            thread_ids: config.thread_ids,
            file_location: config.file_location,
            file_path: config.file_path.clone(),
            max_files: usize::try_from(config.max_files).unwrap_or(usize::MAX),
            ..Self::new()
        }
    }

    /// Base level, used when `RUST_LOG` is unset.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a filter directive such as `relay_framework=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Includes the module path of each event.
    pub fn target(mut self, enabled: bool) -> Self {
        self.target = enabled;
        self
    }

    pub fn thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Includes the source file and line of each event.
    pub fn file_location(mut self, enabled: bool) -> Self {
        self.file_location = enabled;
        self
    }

    /// Writes to a daily-rotated file at `path` and selects file output.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self.output = LogOutput::File;
        self
    }

    /// Number of rotated files to keep.
    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    /// `RUST_LOG`, when set, replaces the base level. Module directives are
    /// added on top either way.
    fn build_filter(&self) -> EnvFilter {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()));

        self.directives
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(filter, EnvFilter::add_directive)
    }

    fn file_appender(&self, path: &Path) -> Option<RollingFileAppender> {
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let prefix = path.file_name().unwrap_or_else(|| OsStr::new("relay.log"));

        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(prefix.to_string_lossy())
            .max_log_files(self.max_files.max(1))
            .build(directory)
            .ok()
    }

    /// Formatting layer for the configured format, writing to `writer`.
    fn fmt_layer<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(self.span_events.to_fmt_span())
            .with_target(self.target)
            .with_thread_ids(self.thread_ids)
            .with_file(self.file_location)
            .with_line_number(self.file_location);

        match self.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Full => layer.boxed(),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Full | LogFormat::Json => layer.boxed(),
        }
    }

    /// Installs the subscriber, ignoring failure.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber. Fails if one is already installed.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let mut fallback = false;
        let layer = match self.output {
            LogOutput::Stdout => self.fmt_layer(std::io::stdout),
            LogOutput::Stderr => self.fmt_layer(std::io::stderr),
            LogOutput::File => match self.file_path.as_deref().and_then(|p| self.file_appender(p)) {
                Some(appender) => self.fmt_layer(appender),
                None => {
                    fallback = true;
                    self.fmt_layer(std::io::stdout)
                }
            },
        };

        tracing_subscriber::registry()
            .with(layer)
            .with(self.build_filter())
            .try_init()?;

        if fallback {
            warn!(path = ?self.file_path, "Cannot open log file, logging to stdout");
        }
        #[cfg(not(feature = "json-log"))]
        if self.format == LogFormat::Json {
            warn!("JSON logs need the `json-log` feature, using the full format");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_span_event_presets() {
        assert_eq!(SpanEvents::NONE.to_fmt_span(), FmtSpan::NONE);
        assert_eq!(
            SpanEvents::LIFECYCLE.to_fmt_span(),
            FmtSpan::NEW | FmtSpan::CLOSE
        );
        assert_eq!(SpanEvents::FULL.to_fmt_span(), FmtSpan::FULL);
        assert_eq!(SpanEvents::ACTIVE.to_fmt_span(), FmtSpan::ACTIVE);
    }

    #[test]
    fn test_from_config() {
        let mut config = LoggingConfig {
            level: LogLevel::Warn,
            thread_ids: true,
            ..Default::default()
        };
        config.span_events.close = true;
        config
            .filters
            .insert("relay_framework".into(), LogLevel::Trace);

        let builder = LoggingBuilder::from_config(&config);
        assert_eq!(builder.level, Level::WARN);
        assert_eq!(builder.directives, vec!["relay_framework=trace"]);
        assert_eq!(builder.span_events, SpanEvents { close: true, ..SpanEvents::NONE });
        assert!(builder.thread_ids);
        assert!(builder.target);
        assert!(!builder.file_location);
    }

    #[test]
    fn test_file_selects_file_output() {
        let builder = LoggingBuilder::new().file("logs/relay.log").max_files(3);
        assert_eq!(builder.output, LogOutput::File);
        assert_eq!(builder.file_path.as_deref(), Some(Path::new("logs/relay.log")));
        assert_eq!(builder.max_files, 3);
    }
}
