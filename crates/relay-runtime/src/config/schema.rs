//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RelayConfig {
    /// Command trigger settings.
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandsConfig {
    /// Literal that starts a prefix command.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Whether mentioning the bot also starts a prefix command.
    #[serde(default)]
    pub when_mention: bool,

    /// Whether unknown commands get an ephemeral reply.
    #[serde(default = "default_reply_on_unknown")]
    pub reply_on_unknown: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            when_mention: false,
            reply_on_unknown: default_reply_on_unknown(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_reply_on_unknown() -> bool {
    true
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Base log level. `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, required for file output.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Number of daily log files to keep.
    #[serde(default = "default_max_files")]
    pub max_files: u32,

    /// Span lifecycle events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `relay_framework = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            max_files: default_max_files(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: BTreeMap::new(),
        }
    }
}

fn default_max_files() -> u32 {
    5
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name as used in filter directives.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single line, abbreviated.
    #[default]
    Compact,
    /// Single line with all fields.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// Newline-delimited JSON. Needs the `json-log` feature.
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Span lifecycle events to log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}
