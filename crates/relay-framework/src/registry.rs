//! The command registry.
//!
//! One name → descriptor map per style, built once from command classes and
//! read-only afterwards. The dispatcher shares it behind an `Arc`, so
//! concurrent dispatches need no locking.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::info;

use crate::builder::CommandBuilder;
use crate::descriptor::{AnyCommand, CommandDescriptor};
use crate::error::{BuildError, BuildResult};
use crate::meta::CommandClass;
use crate::style::{CommandStyle, Hybrid, Prefix, Slash, Style};
use relay_core::CommandData;

type CommandMap<S> = HashMap<String, Arc<CommandDescriptor<S>>>;

/// Built descriptors of every style, keyed by command name.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    prefix: CommandMap<Prefix>,
    slash: CommandMap<Slash>,
    hybrid: CommandMap<Hybrid>,
}

impl CommandRegistry {
    /// Creates a registry builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up a prefix command.
    pub fn prefix(&self, name: &str) -> Option<&Arc<CommandDescriptor<Prefix>>> {
        self.prefix.get(name)
    }

    /// Looks up a slash command.
    pub fn slash(&self, name: &str) -> Option<&Arc<CommandDescriptor<Slash>>> {
        self.slash.get(name)
    }

    /// Looks up a hybrid command.
    pub fn hybrid(&self, name: &str) -> Option<&Arc<CommandDescriptor<Hybrid>>> {
        self.hybrid.get(name)
    }

    /// Returns the number of commands of `style`.
    pub fn count(&self, style: CommandStyle) -> usize {
        match style {
            CommandStyle::Prefix => self.prefix.len(),
            CommandStyle::Slash => self.slash.len(),
            CommandStyle::Hybrid => self.hybrid.len(),
        }
    }

    /// Returns the total number of commands.
    pub fn len(&self) -> usize {
        self.prefix.len() + self.slash.len() + self.hybrid.len()
    }

    /// Whether the registry holds no commands.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every command, ordered by style and then by name.
    pub fn commands(&self) -> Vec<AnyCommand> {
        let mut commands: Vec<AnyCommand> = self
            .prefix
            .values()
            .cloned()
            .map(AnyCommand::Prefix)
            .chain(self.slash.values().cloned().map(AnyCommand::Slash))
            .chain(self.hybrid.values().cloned().map(AnyCommand::Hybrid))
            .collect();
        commands.sort_by(|a, b| {
            (a.style() as u8, a.name()).cmp(&(b.style() as u8, b.name()))
        });
        commands
    }

    /// Returns the registration payload of every slash and hybrid command.
    pub fn registration_data(&self) -> Vec<CommandData> {
        self.commands()
            .iter()
            .filter_map(AnyCommand::to_command_data)
            .collect()
    }
}

/// Collects command classes and builds a [`CommandRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    prefix: Vec<CommandClass>,
    slash: Vec<CommandClass>,
    hybrid: Vec<CommandClass>,
    unstyled: Vec<CommandClass>,
}

impl RegistryBuilder {
    /// Adds a class under every style it is annotated with.
    pub fn command(mut self, class: CommandClass) -> Self {
        let styles = class.styles();
        if styles.is_empty() {
            self.unstyled.push(class);
            return self;
        }
        for style in styles {
            match style {
                CommandStyle::Prefix => self.prefix.push(class.clone()),
                CommandStyle::Slash => self.slash.push(class.clone()),
                CommandStyle::Hybrid => self.hybrid.push(class.clone()),
            }
        }
        self
    }

    /// Adds several classes.
    pub fn commands(self, classes: impl IntoIterator<Item = CommandClass>) -> Self {
        classes.into_iter().fold(self, Self::command)
    }

    /// Adds a class as a prefix command.
    pub fn prefix(mut self, class: CommandClass) -> Self {
        self.prefix.push(class);
        self
    }

    /// Adds a class as a slash command.
    pub fn slash(mut self, class: CommandClass) -> Self {
        self.slash.push(class);
        self
    }

    /// Adds a class as a hybrid command.
    pub fn hybrid(mut self, class: CommandClass) -> Self {
        self.hybrid.push(class);
        self
    }

    /// Builds every class. The first failure aborts the build.
    pub fn build(self) -> BuildResult<CommandRegistry> {
        if let Some(class) = self.unstyled.first() {
            return Err(BuildError::AnnotationNotFound {
                class: class.type_name().to_string(),
                expected: "prefix, slash or hybrid".to_string(),
            });
        }

        let registry = CommandRegistry {
            prefix: build_style(&self.prefix)?,
            slash: build_style(&self.slash)?,
            hybrid: build_style(&self.hybrid)?,
        };

        info!(
            prefix = registry.prefix.len(),
            slash = registry.slash.len(),
            hybrid = registry.hybrid.len(),
            "Command registry built"
        );

        Ok(registry)
    }
}

fn build_style<S: Style>(classes: &[CommandClass]) -> BuildResult<CommandMap<S>> {
    let builder = CommandBuilder::<S>::new();
    let mut map = HashMap::with_capacity(classes.len());

    for class in classes {
        let descriptor = builder.build(class)?;
        match map.entry(descriptor.name().to_string()) {
            Entry::Occupied(entry) => {
                return Err(BuildError::DuplicateName {
                    style: S::KIND,
                    scope: "registry".to_string(),
                    name: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(descriptor));
            }
        }
    }

    Ok(map)
}
