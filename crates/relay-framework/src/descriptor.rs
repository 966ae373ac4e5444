//! The command descriptor tree.
//!
//! ```text
//! CommandDescriptor<S>
//! ├── entry point + options            (directly invokable command)
//! ├── subcommands: name → SubcommandDescriptor<S>
//! └── groups: name → SubcommandGroupDescriptor<S>
//!                    └── subcommands: name → SubcommandDescriptor<S>
//! ```
//!
//! Descriptors are produced by [`CommandBuilder`](crate::builder::CommandBuilder)
//! once at startup and are never mutated afterwards. Slash-like descriptors
//! convert to platform registration data through
//! [`CommandDescriptor::to_command_data`].

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::handler::{EntryPoint, Instance};
use crate::localization::{self, LocalizationFunction, SharedLocalization};
use crate::style::{CommandStyle, Hybrid, Prefix, Slash, SlashLike, Style};
use relay_core::{
    Choice, CommandData, LocalizationMap, OptionData, OptionType, SubcommandData,
    SubcommandGroupData,
};

// ============================================================================
// Options
// ============================================================================

/// One declared command option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    pub(crate) kind: OptionType,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) required: bool,
    pub(crate) autocomplete: bool,
    pub(crate) choices: Vec<Choice>,
}

impl OptionDescriptor {
    /// Returns the resolved option type. Never [`OptionType::Unknown`].
    pub fn kind(&self) -> OptionType {
        self.kind
    }

    /// Returns the option name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, absent for undocumented prefix options.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether a value must be supplied.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether values are suggested through autocomplete.
    pub fn is_autocomplete(&self) -> bool {
        self.autocomplete
    }

    /// Returns the fixed choices in declaration order.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    fn to_option_data(&self, function: &dyn LocalizationFunction, key: &str) -> OptionData {
        let choices = self
            .choices
            .iter()
            .map(|choice| {
                let choice_key = format!("{key}.choices.{}.name", choice.name);
                Choice {
                    name: choice.name.clone(),
                    name_localizations: localization::resolve(
                        function,
                        &choice_key,
                        &choice.name_localizations,
                    ),
                    value: choice.value.clone(),
                }
            })
            .collect();

        OptionData {
            kind: self.kind,
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            name_localizations: function.localize(&format!("{key}.name")),
            description_localizations: function.localize(&format!("{key}.description")),
            required: self.required,
            autocomplete: self.autocomplete,
            choices,
        }
    }
}

/// Explicit name and description translations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Localizations {
    /// Translated names.
    pub name: LocalizationMap,
    /// Translated descriptions.
    pub description: LocalizationMap,
}

impl Localizations {
    /// Whether neither map has entries.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }
}

fn options_data(
    options: &[OptionDescriptor],
    function: &dyn LocalizationFunction,
    prefix: &str,
) -> Vec<OptionData> {
    options
        .iter()
        .map(|option| option.to_option_data(function, &format!("{prefix}.options.{}", option.name)))
        .collect()
}

// ============================================================================
// Subcommands and groups
// ============================================================================

/// A subcommand of a command or of a group.
pub struct SubcommandDescriptor<S: Style> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) entry_point: EntryPoint,
    pub(crate) options: Vec<OptionDescriptor>,
    pub(crate) localizations: Localizations,
    pub(crate) _style: PhantomData<S>,
}

impl<S: Style> SubcommandDescriptor<S> {
    /// Returns the subcommand name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the bound handler.
    pub fn entry_point(&self) -> &EntryPoint {
        &self.entry_point
    }

    /// Returns the options in declaration order.
    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    /// Returns the explicit translations.
    pub fn localizations(&self) -> &Localizations {
        &self.localizations
    }
}

impl<S: SlashLike> SubcommandDescriptor<S> {
    fn to_subcommand_data(&self, function: &dyn LocalizationFunction, key: &str) -> SubcommandData {
        SubcommandData {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            name_localizations: localization::resolve(
                function,
                &format!("{key}.name"),
                &self.localizations.name,
            ),
            description_localizations: localization::resolve(
                function,
                &format!("{key}.description"),
                &self.localizations.description,
            ),
            options: options_data(&self.options, function, key),
        }
    }
}

impl<S: Style> Clone for SubcommandDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            entry_point: self.entry_point.clone(),
            options: self.options.clone(),
            localizations: self.localizations.clone(),
            _style: PhantomData,
        }
    }
}

impl<S: Style> fmt::Debug for SubcommandDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubcommandDescriptor")
            .field("style", &S::KIND)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("entry_point", &self.entry_point.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A subcommand group owning its own handler object.
pub struct SubcommandGroupDescriptor<S: Style> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) instance: Instance,
    pub(crate) subcommands: BTreeMap<String, SubcommandDescriptor<S>>,
    pub(crate) localizations: Localizations,
}

impl<S: Style> SubcommandGroupDescriptor<S> {
    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the group's handler object.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Looks up a subcommand by name.
    pub fn subcommand(&self, name: &str) -> Option<&SubcommandDescriptor<S>> {
        self.subcommands.get(name)
    }

    /// Returns the subcommands ordered by name.
    pub fn subcommands(&self) -> impl Iterator<Item = &SubcommandDescriptor<S>> {
        self.subcommands.values()
    }

    /// Returns the explicit translations.
    pub fn localizations(&self) -> &Localizations {
        &self.localizations
    }
}

impl<S: SlashLike> SubcommandGroupDescriptor<S> {
    fn to_group_data(&self, function: &dyn LocalizationFunction, key: &str) -> SubcommandGroupData {
        SubcommandGroupData {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            name_localizations: localization::resolve(
                function,
                &format!("{key}.name"),
                &self.localizations.name,
            ),
            description_localizations: localization::resolve(
                function,
                &format!("{key}.description"),
                &self.localizations.description,
            ),
            subcommands: self
                .subcommands
                .values()
                .map(|sub| sub.to_subcommand_data(function, &format!("{key}.{}", sub.name)))
                .collect(),
        }
    }
}

impl<S: Style> Clone for SubcommandGroupDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            instance: Arc::clone(&self.instance),
            subcommands: self.subcommands.clone(),
            localizations: self.localizations.clone(),
        }
    }
}

impl<S: Style> fmt::Debug for SubcommandGroupDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubcommandGroupDescriptor")
            .field("style", &S::KIND)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("subcommands", &self.subcommands)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A fully built command of style `S`.
pub struct CommandDescriptor<S: Style> {
    pub(crate) class_name: &'static str,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) instance: Instance,
    pub(crate) entry_point: Option<EntryPoint>,
    pub(crate) options: Vec<OptionDescriptor>,
    pub(crate) guild_only: bool,
    pub(crate) nsfw: bool,
    pub(crate) localizations: Localizations,
    pub(crate) localization_function: SharedLocalization,
    pub(crate) subcommands: BTreeMap<String, SubcommandDescriptor<S>>,
    pub(crate) groups: BTreeMap<String, SubcommandGroupDescriptor<S>>,
}

impl<S: Style> CommandDescriptor<S> {
    /// Returns the style of this descriptor.
    pub fn style(&self) -> CommandStyle {
        S::KIND
    }

    /// Returns the name of the class the command was built from.
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// Returns the command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the command's handler object.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Returns the top-level entry point, if the command is directly invokable.
    pub fn entry_point(&self) -> Option<&EntryPoint> {
        self.entry_point.as_ref()
    }

    /// Returns the top-level options in declaration order.
    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    /// Whether the command is only usable inside guilds.
    pub fn is_guild_only(&self) -> bool {
        self.guild_only
    }

    /// Whether the command is age restricted.
    pub fn is_nsfw(&self) -> bool {
        self.nsfw
    }

    /// Returns the explicit translations.
    pub fn localizations(&self) -> &Localizations {
        &self.localizations
    }

    /// Returns the registration-time localization function.
    pub fn localization_function(&self) -> &SharedLocalization {
        &self.localization_function
    }

    /// Looks up a direct subcommand by name.
    pub fn subcommand(&self, name: &str) -> Option<&SubcommandDescriptor<S>> {
        self.subcommands.get(name)
    }

    /// Returns the direct subcommands ordered by name.
    pub fn subcommands(&self) -> impl Iterator<Item = &SubcommandDescriptor<S>> {
        self.subcommands.values()
    }

    /// Looks up a subcommand group by name.
    pub fn group(&self, name: &str) -> Option<&SubcommandGroupDescriptor<S>> {
        self.groups.get(name)
    }

    /// Returns the subcommand groups ordered by name.
    pub fn groups(&self) -> impl Iterator<Item = &SubcommandGroupDescriptor<S>> {
        self.groups.values()
    }

    /// Whether the command has subcommands or groups.
    pub fn has_children(&self) -> bool {
        !self.subcommands.is_empty() || !self.groups.is_empty()
    }
}

impl<S: SlashLike> CommandDescriptor<S> {
    /// Converts the command into its platform registration payload.
    ///
    /// The localization function is consulted for every name and
    /// description; explicit maps override it per locale.
    pub fn to_command_data(&self) -> CommandData {
        let function = self.localization_function.as_ref();
        let key = self.name.as_str();

        CommandData {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            name_localizations: localization::resolve(
                function,
                &format!("{key}.name"),
                &self.localizations.name,
            ),
            description_localizations: localization::resolve(
                function,
                &format!("{key}.description"),
                &self.localizations.description,
            ),
            options: options_data(&self.options, function, key),
            subcommands: self
                .subcommands
                .values()
                .map(|sub| sub.to_subcommand_data(function, &format!("{key}.{}", sub.name)))
                .collect(),
            subcommand_groups: self
                .groups
                .values()
                .map(|group| group.to_group_data(function, &format!("{key}.{}", group.name)))
                .collect(),
            guild_only: self.guild_only,
            nsfw: self.nsfw,
        }
    }
}

impl<S: Style> Clone for CommandDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            class_name: self.class_name,
            name: self.name.clone(),
            description: self.description.clone(),
            instance: Arc::clone(&self.instance),
            entry_point: self.entry_point.clone(),
            options: self.options.clone(),
            guild_only: self.guild_only,
            nsfw: self.nsfw,
            localizations: self.localizations.clone(),
            localization_function: Arc::clone(&self.localization_function),
            subcommands: self.subcommands.clone(),
            groups: self.groups.clone(),
        }
    }
}

impl<S: Style> fmt::Debug for CommandDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("style", &S::KIND)
            .field("class_name", &self.class_name)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("entry_point", &self.entry_point.as_ref().map(EntryPoint::name))
            .field("options", &self.options)
            .field("guild_only", &self.guild_only)
            .field("nsfw", &self.nsfw)
            .field("subcommands", &self.subcommands)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// AnyCommand
// ============================================================================

/// A descriptor of any style.
#[derive(Debug, Clone)]
pub enum AnyCommand {
    /// Prefix command.
    Prefix(Arc<CommandDescriptor<Prefix>>),
    /// Slash command.
    Slash(Arc<CommandDescriptor<Slash>>),
    /// Hybrid command.
    Hybrid(Arc<CommandDescriptor<Hybrid>>),
}

impl AnyCommand {
    /// Returns the style tag.
    pub fn style(&self) -> CommandStyle {
        match self {
            Self::Prefix(_) => CommandStyle::Prefix,
            Self::Slash(_) => CommandStyle::Slash,
            Self::Hybrid(_) => CommandStyle::Hybrid,
        }
    }

    /// Returns the command name.
    pub fn name(&self) -> &str {
        match self {
            Self::Prefix(cmd) => cmd.name(),
            Self::Slash(cmd) => cmd.name(),
            Self::Hybrid(cmd) => cmd.name(),
        }
    }

    /// Returns the registration payload of slash-like commands.
    pub fn to_command_data(&self) -> Option<CommandData> {
        match self {
            Self::Prefix(_) => None,
            Self::Slash(cmd) => Some(cmd.to_command_data()),
            Self::Hybrid(cmd) => Some(cmd.to_command_data()),
        }
    }
}

