//! Platform entities referenced by events and option values.
//!
//! These are plain data snapshots: the platform library hands them over with
//! each event and nothing here keeps them in sync afterwards.

use serde::{Deserialize, Serialize};

/// Platform-wide unique identifier.
pub type Snowflake = u64;

/// A platform user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: Snowflake,
    /// Account name.
    pub name: String,
    /// Whether the account belongs to a bot.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Creates a human user.
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bot: false,
        }
    }

    /// Creates a bot account.
    pub fn bot(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bot: true,
        }
    }

    /// Returns the mention markup for this user, `<@id>`.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A user in the context of one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The underlying account.
    pub user: User,
    /// Guild the membership belongs to.
    pub guild_id: Snowflake,
    /// Guild-specific nickname.
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Member {
    /// Creates a membership without a nickname.
    pub fn new(user: User, guild_id: Snowflake) -> Self {
        Self {
            user,
            guild_id,
            nickname: None,
        }
    }

    /// Returns the nickname if set, otherwise the account name.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user.name)
    }
}

/// Kind of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Guild text channel.
    #[default]
    Text,
    /// Guild voice channel.
    Voice,
    /// Direct message channel.
    Private,
    /// Thread inside a text channel.
    Thread,
}

/// A channel messages and interactions happen in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel id.
    pub id: Snowflake,
    /// Channel name.
    pub name: String,
    /// Channel kind.
    #[serde(default)]
    pub kind: ChannelKind,
}

impl Channel {
    /// Creates a guild text channel.
    pub fn text(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ChannelKind::Text,
        }
    }

    /// Returns the mention markup for this channel, `<#id>`.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id.
    pub id: Snowflake,
    /// Role name.
    pub name: String,
}

impl Role {
    /// Creates a role.
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the mention markup for this role, `<@&id>`.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

/// Anything that can be mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mentionable {
    /// A user outside of a guild context.
    User(User),
    /// A guild member.
    Member(Member),
    /// A guild role.
    Role(Role),
    /// A channel.
    Channel(Channel),
}

impl Mentionable {
    /// Returns the id of the mentioned entity.
    pub fn id(&self) -> Snowflake {
        match self {
            Self::User(user) => user.id,
            Self::Member(member) => member.user.id,
            Self::Role(role) => role.id,
            Self::Channel(channel) => channel.id,
        }
    }

    /// Returns the mention markup of the entity.
    pub fn mention(&self) -> String {
        match self {
            Self::User(user) => user.mention(),
            Self::Member(member) => member.user.mention(),
            Self::Role(role) => role.mention(),
            Self::Channel(channel) => channel.mention(),
        }
    }
}

/// A file uploaded with a message or an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment id.
    pub id: Snowflake,
    /// Original file name.
    pub filename: String,
    /// Download URL.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, if the platform reported one.
    #[serde(default)]
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_markup() {
        assert_eq!(User::new(42, "alice").mention(), "<@42>");
        assert_eq!(Channel::text(7, "general").mention(), "<#7>");
        assert_eq!(Role::new(9, "mods").mention(), "<@&9>");
    }

    #[test]
    fn test_member_display_name() {
        let mut member = Member::new(User::new(1, "alice"), 100);
        assert_eq!(member.display_name(), "alice");

        member.nickname = Some("Al".into());
        assert_eq!(member.display_name(), "Al");
        assert_eq!(Mentionable::Member(member).id(), 1);
    }
}
