//! Command styles and their capabilities.
//!
//! The three styles share almost all of their structure. Instead of three
//! parallel type hierarchies, descriptors and builders are generic over a
//! [`Style`] marker whose constants switch the few behaviors that differ.

use std::fmt;

/// Runtime tag of a command style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandStyle {
    /// Triggered by a text message starting with a prefix or a mention.
    Prefix,
    /// Triggered by a structured slash interaction.
    Slash,
    /// Triggered either way.
    Hybrid,
}

impl CommandStyle {
    /// Returns the lower-case style name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Slash => "slash",
            Self::Hybrid => "hybrid",
        }
    }

    /// Whether commands of this style are registered with the platform.
    pub fn is_registered(self) -> bool {
        matches!(self, Self::Slash | Self::Hybrid)
    }
}

impl fmt::Display for CommandStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set of a command style.
pub trait Style: fmt::Debug + Clone + Copy + Default + Send + Sync + 'static {
    /// Runtime tag.
    const KIND: CommandStyle;
    /// Name/description localization maps and a localization function are built.
    const LOCALIZED: bool;
    /// The autocomplete flag on options is honored.
    const AUTOCOMPLETE: bool;
    /// Attachment parameters infer the `ATTACHMENT` option type.
    const INFERS_ATTACHMENT: bool;
    /// An empty description is stored as absent.
    const OPTIONAL_DESCRIPTION: bool;
}

/// Styles that are registered with the platform as slash commands.
pub trait SlashLike: Style {}

/// Prefix style marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefix;

/// Slash style marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slash;

/// Hybrid style marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hybrid;

impl Style for Prefix {
    const KIND: CommandStyle = CommandStyle::Prefix;
    const LOCALIZED: bool = false;
    const AUTOCOMPLETE: bool = false;
    const INFERS_ATTACHMENT: bool = false;
    const OPTIONAL_DESCRIPTION: bool = true;
}

impl Style for Slash {
    const KIND: CommandStyle = CommandStyle::Slash;
    const LOCALIZED: bool = true;
    const AUTOCOMPLETE: bool = true;
    const INFERS_ATTACHMENT: bool = true;
    const OPTIONAL_DESCRIPTION: bool = false;
}

impl Style for Hybrid {
    const KIND: CommandStyle = CommandStyle::Hybrid;
    const LOCALIZED: bool = true;
    const AUTOCOMPLETE: bool = false;
    const INFERS_ATTACHMENT: bool = false;
    const OPTIONAL_DESCRIPTION: bool = false;
}

impl SlashLike for Slash {}
impl SlashLike for Hybrid {}
