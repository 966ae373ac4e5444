//! Error types for the Relay framework.
//!
//! Errors fall into three stages:
//!
//! - [`BuildError`]: raised while turning command classes into descriptors at
//!   startup. Any of these should abort startup.
//! - [`DispatchError`]: raised while routing one inbound event. The event is
//!   dropped but the dispatcher keeps serving.
//! - [`InvokeError`]: raised by the handler call itself, wrapped into
//!   [`DispatchError::Invocation`].

use std::path::PathBuf;

use thiserror::Error;

use crate::argument::DeclaredType;
use crate::style::CommandStyle;
use relay_core::ApiError;

/// Boxed error type accepted from user code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Build-time errors
// ============================================================================

/// Errors raised while building command descriptors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The class lacks the command annotation the builder looks for.
    #[error("{class} is not annotated as a {expected} command")]
    AnnotationNotFound {
        /// Offending class.
        class: String,
        /// Expected annotation.
        expected: String,
    },

    /// A required property could not be determined.
    #[error("{class}: {message}")]
    PropertyNotFound {
        /// Offending class.
        class: String,
        /// What is missing.
        message: String,
    },

    /// An option parameter has no explicit type and its declared type is not
    /// in the inference table.
    #[error(
        "{class}::{method}: cannot infer option type of '{option}' from declared type {declared}"
    )]
    UnresolvedOptionType {
        /// Offending class.
        class: String,
        /// Method declaring the parameter.
        method: String,
        /// Option name.
        option: String,
        /// Declared parameter type.
        declared: DeclaredType,
    },

    /// A subcommand group object could not be constructed.
    #[error("{class}: failed to instantiate subcommand group: {source}")]
    GroupInstantiation {
        /// Group class.
        class: String,
        /// Constructor failure.
        #[source]
        source: BoxError,
    },

    /// A command has an entry point as well as subcommands or groups.
    #[error("{class}: command '{command}' mixes an entry point with subcommands or groups")]
    ConflictingShape {
        /// Offending class.
        class: String,
        /// Command name.
        command: String,
    },

    /// Two entries in one scope share a name.
    #[error("duplicate {style} name '{name}' in {scope}")]
    DuplicateName {
        /// Style of the registry or descriptor.
        style: CommandStyle,
        /// Where the collision happened.
        scope: String,
        /// Colliding name.
        name: String,
    },
}

impl BuildError {
    /// Creates a property-not-found error.
    pub fn property_not_found(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            class: class.into(),
            message: message.into(),
        }
    }
}

/// Result type for descriptor building.
pub type BuildResult<T> = Result<T, BuildError>;

// ============================================================================
// Invocation errors
// ============================================================================

/// Errors converting a bound argument into a handler parameter.
#[derive(Debug, Clone, Error)]
pub enum ArgumentError {
    /// A non-optional parameter received no value.
    #[error("missing value for required argument {index}")]
    Missing {
        /// Zero-based option index.
        index: usize,
    },

    /// The bound value has a different kind than the parameter.
    #[error("argument {index}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Zero-based option index.
        index: usize,
        /// Parameter kind.
        expected: &'static str,
        /// Bound value kind.
        found: &'static str,
    },
}

/// Errors raised while invoking a handler.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The stored handler object is not of the type the handler expects.
    #[error("handler receiver mismatch: expected '{expected}'")]
    ReceiverMismatch {
        /// Expected receiver type.
        expected: &'static str,
    },

    /// An argument could not be converted.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// Sending the handler's reply failed.
    #[error("failed to send reply: {0}")]
    Reply(#[from] ApiError),
}

impl InvokeError {
    /// Wraps a handler failure.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }
}

/// Result type for handler invocation.
pub type InvokeResult<T> = Result<T, InvokeError>;

// ============================================================================
// Dispatch errors
// ============================================================================

/// Errors raised while dispatching one event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No command, subcommand or group with the given name.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// The resolved handler failed.
    #[error("command '{command}' failed: {source}")]
    Invocation {
        /// Fully qualified command name.
        command: String,
        /// Handler failure.
        #[source]
        source: InvokeError,
    },
}

impl DispatchError {
    /// Whether this error is a lookup miss rather than a handler failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CommandNotFound(_))
    }
}

/// Result type for dispatch.
pub type DispatchResult<T> = Result<T, DispatchError>;

// ============================================================================
// Localization errors
// ============================================================================

/// Errors loading localization bundles.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// The bundle file could not be read.
    #[error("failed to read bundle {}: {source}", path.display())]
    Io {
        /// Bundle path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The bundle file is not valid JSON.
    #[error("failed to parse bundle {}: {source}", path.display())]
    Json {
        /// Bundle path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The bundle's root is not a JSON object.
    #[error("bundle {} is not a JSON object", path.display())]
    NotAnObject {
        /// Bundle path.
        path: PathBuf,
    },
}

/// Result type for localization loading.
pub type LocalizationResult<T> = Result<T, LocalizationError>;
