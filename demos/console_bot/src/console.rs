//! A [`Bot`] that talks to the terminal.
//!
//! Plain lines become text messages. Lines starting with `/` become slash
//! interactions:
//!
//! ```text
//! /say text:hello times:2
//! /note add text:milk
//! ```
//!
//! Bare words after the command name form the `[group] subcommand` path;
//! `name:value` pairs become options typed from their value.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use relay::core::{
    ApiResult, Bot, Channel, CommandData, OptionMapping, PlatformEvent, SlashInteraction,
    SourceEvent, TextMessage, User,
};
use tracing::info;

pub struct ConsoleBot {
    user: User,
}

impl ConsoleBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            user: User::bot(1, "relay"),
        })
    }
}

#[async_trait]
impl Bot for ConsoleBot {
    fn self_user(&self) -> &User {
        &self.user
    }

    async fn update_commands(&self, commands: Vec<CommandData>) -> ApiResult<()> {
        let names: Vec<String> = commands.into_iter().map(|c| c.name).collect();
        info!(commands = %names.join(", "), "Slash commands registered");
        Ok(())
    }

    async fn reply(&self, source: &SourceEvent, content: &str, ephemeral: bool) -> ApiResult<()> {
        let marker = if ephemeral { " (only you)" } else { "" };
        println!("[{} -> {}{marker}] {content}", self.user.name, source.user().name);
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Turns one input line into a platform event.
pub fn parse_line(line: &str, author: &User, channel: &Channel) -> Option<PlatformEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Some(TextMessage::new(author.clone(), channel.clone(), line).into());
    };

    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?;
    let mut interaction = SlashInteraction::new(name, author.clone(), channel.clone());
    let mut path = Vec::new();

    for token in tokens {
        match token.split_once(':') {
            Some((key, value)) => interaction = interaction.with_option(typed_option(key, value)),
            None => path.push(token),
        }
    }

    interaction = match path.as_slice() {
        [] => interaction,
        [sub] => interaction.with_subcommand(*sub),
        [group, sub, ..] => interaction.with_group(*group).with_subcommand(*sub),
    };

    Some(interaction.into())
}

fn typed_option(name: &str, value: &str) -> OptionMapping {
    if let Ok(n) = value.parse::<i64>() {
        OptionMapping::integer(name, n)
    } else if let Ok(b) = value.parse::<bool>() {
        OptionMapping::boolean(name, b)
    } else if let Ok(x) = value.parse::<f64>() {
        OptionMapping::number(name, x)
    } else {
        OptionMapping::string(name, value)
    }
}
