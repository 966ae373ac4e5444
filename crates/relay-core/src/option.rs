//! Option types and the option values carried by slash interactions.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::entity::{Attachment, Channel, Member, Mentionable, Role, User};

/// Semantic type of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// A subcommand (registration only).
    Subcommand,
    /// A subcommand group (registration only).
    SubcommandGroup,
    /// Free text.
    String,
    /// 64-bit signed integer.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A user or guild member.
    User,
    /// A channel.
    Channel,
    /// A role.
    Role,
    /// A user or a role.
    Mentionable,
    /// A floating point number.
    Number,
    /// An uploaded file.
    Attachment,
    /// Not resolved yet.
    Unknown,
}

impl OptionType {
    /// Returns the numeric code the platform uses for this type.
    pub fn code(self) -> i8 {
        match self {
            Self::Subcommand => 1,
            Self::SubcommandGroup => 2,
            Self::String => 3,
            Self::Integer => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Mentionable => 9,
            Self::Number => 10,
            Self::Attachment => 11,
            Self::Unknown => -1,
        }
    }

    /// Returns the upper-case name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subcommand => "SUB_COMMAND",
            Self::SubcommandGroup => "SUB_COMMAND_GROUP",
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::User => "USER",
            Self::Channel => "CHANNEL",
            Self::Role => "ROLE",
            Self::Mentionable => "MENTIONABLE",
            Self::Number => "NUMBER",
            Self::Attachment => "ATTACHMENT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether options of this type may offer fixed choices.
    pub fn supports_choices(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

/// Value of one option as delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Text value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
    /// Floating point value.
    Number(f64),
    /// A user, with membership data when invoked inside a guild.
    User {
        /// The resolved user.
        user: User,
        /// The resolved member, if any.
        member: Option<Member>,
    },
    /// A channel.
    Channel(Channel),
    /// A role.
    Role(Role),
    /// An uploaded file.
    Attachment(Attachment),
}

/// One option supplied with a slash interaction.
///
/// Accessors are lossy in the same way the platform library's are: each one
/// returns `None` when the value cannot be viewed as the requested kind.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionMapping {
    /// Option name.
    pub name: String,
    /// Declared option type.
    pub kind: OptionType,
    /// Supplied value.
    pub value: OptionValue,
}

impl OptionMapping {
    /// Creates an option mapping.
    pub fn new(name: impl Into<String>, kind: OptionType, value: OptionValue) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }

    /// Creates a `STRING` option.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, OptionType::String, OptionValue::String(value.into()))
    }

    /// Creates an `INTEGER` option.
    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, OptionType::Integer, OptionValue::Integer(value))
    }

    /// Creates a `BOOLEAN` option.
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, OptionType::Boolean, OptionValue::Boolean(value))
    }

    /// Creates a `NUMBER` option.
    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, OptionType::Number, OptionValue::Number(value))
    }

    /// Creates a `USER` option.
    pub fn user(name: impl Into<String>, user: User, member: Option<Member>) -> Self {
        Self::new(name, OptionType::User, OptionValue::User { user, member })
    }

    /// Creates a `CHANNEL` option.
    pub fn channel(name: impl Into<String>, channel: Channel) -> Self {
        Self::new(name, OptionType::Channel, OptionValue::Channel(channel))
    }

    /// Creates an `ATTACHMENT` option.
    pub fn attachment(name: impl Into<String>, attachment: Attachment) -> Self {
        Self::new(
            name,
            OptionType::Attachment,
            OptionValue::Attachment(attachment),
        )
    }

    /// Returns the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            OptionValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as an integer. Entities yield their id.
    pub fn as_long(&self) -> Option<i64> {
        match &self.value {
            OptionValue::Integer(n) => Some(*n),
            OptionValue::User { user, .. } => i64::try_from(user.id).ok(),
            OptionValue::Channel(channel) => i64::try_from(channel.id).ok(),
            OptionValue::Role(role) => i64::try_from(role.id).ok(),
            OptionValue::Attachment(attachment) => i64::try_from(attachment.id).ok(),
            _ => None,
        }
    }

    /// Returns the value as a floating point number.
    pub fn as_double(&self) -> Option<f64> {
        match self.value {
            OptionValue::Number(n) => Some(n),
            OptionValue::Integer(n) => Some(n as f64),
            _ => None,
        }
    }

    /// Returns the raw string form of the value.
    pub fn as_string(&self) -> Option<String> {
        Some(match &self.value {
            OptionValue::String(s) => s.clone(),
            OptionValue::Integer(n) => n.to_string(),
            OptionValue::Boolean(b) => b.to_string(),
            OptionValue::Number(n) => n.to_string(),
            OptionValue::User { user, .. } => user.id.to_string(),
            OptionValue::Channel(channel) => channel.id.to_string(),
            OptionValue::Role(role) => role.id.to_string(),
            OptionValue::Attachment(attachment) => attachment.id.to_string(),
        })
    }

    /// Returns the value as a user.
    pub fn as_user(&self) -> Option<User> {
        match &self.value {
            OptionValue::User { user, .. } => Some(user.clone()),
            _ => None,
        }
    }

    /// Returns the value as a guild member.
    pub fn as_member(&self) -> Option<Member> {
        match &self.value {
            OptionValue::User { member, .. } => member.clone(),
            _ => None,
        }
    }

    /// Returns the value as a channel.
    pub fn as_channel(&self) -> Option<Channel> {
        match &self.value {
            OptionValue::Channel(channel) => Some(channel.clone()),
            _ => None,
        }
    }

    /// Returns the value as a role.
    pub fn as_role(&self) -> Option<Role> {
        match &self.value {
            OptionValue::Role(role) => Some(role.clone()),
            _ => None,
        }
    }

    /// Returns the value as a mentionable entity.
    pub fn as_mentionable(&self) -> Option<Mentionable> {
        match &self.value {
            OptionValue::User {
                member: Some(member),
                ..
            } => Some(Mentionable::Member(member.clone())),
            OptionValue::User { user, .. } => Some(Mentionable::User(user.clone())),
            OptionValue::Role(role) => Some(Mentionable::Role(role.clone())),
            OptionValue::Channel(channel) => Some(Mentionable::Channel(channel.clone())),
            _ => None,
        }
    }

    /// Returns the value as an attachment.
    pub fn as_attachment(&self) -> Option<Attachment> {
        match &self.value {
            OptionValue::Attachment(attachment) => Some(attachment.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_codes() {
        assert_eq!(OptionType::String.code(), 3);
        assert_eq!(OptionType::Attachment.code(), 11);
        assert_eq!(
            serde_json::to_string(&OptionType::Boolean).unwrap(),
            "5"
        );
    }

    #[test]
    fn test_lossy_accessors() {
        let number = OptionMapping::integer("count", 3);
        assert_eq!(number.as_long(), Some(3));
        assert_eq!(number.as_double(), Some(3.0));
        assert_eq!(number.as_string().as_deref(), Some("3"));
        assert_eq!(number.as_bool(), None);
        assert!(number.as_user().is_none());

        let user = User::new(5, "bob");
        let member = Member::new(user.clone(), 1);
        let mapping = OptionMapping::user("target", user.clone(), Some(member.clone()));
        assert_eq!(mapping.as_user(), Some(user));
        assert_eq!(mapping.as_member(), Some(member.clone()));
        assert_eq!(mapping.as_mentionable(), Some(Mentionable::Member(member)));
        assert_eq!(mapping.as_long(), Some(5));
    }
}
