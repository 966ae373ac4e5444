//! Command registration payloads.
//!
//! These are submitted in bulk to [`Bot::update_commands`](crate::Bot::update_commands)
//! once the session is ready. Field names follow the platform's wire format.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::option::OptionType;

/// A platform locale tag such as `en-US` or `de`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Creates a locale from its tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the locale tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl Borrow<str> for Locale {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Translations of one string, keyed by locale.
pub type LocalizationMap = BTreeMap<Locale, String>;

/// Value of a fixed option choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    /// Text choice.
    String(String),
    /// Integer choice.
    Integer(i64),
    /// Floating point choice.
    Number(f64),
}

impl ChoiceValue {
    /// Returns the option type this value belongs to.
    pub fn option_type(&self) -> OptionType {
        match self {
            Self::String(_) => OptionType::String,
            Self::Integer(_) => OptionType::Integer,
            Self::Number(_) => OptionType::Number,
        }
    }
}

/// A fixed choice offered for an option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    /// Label shown to the user.
    pub name: String,
    /// Localized labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: LocalizationMap,
    /// Value passed to the command.
    pub value: ChoiceValue,
}

impl Choice {
    /// Creates a choice without localizations.
    pub fn new(name: impl Into<String>, value: ChoiceValue) -> Self {
        Self {
            name: name.into(),
            name_localizations: LocalizationMap::new(),
            value,
        }
    }
}

/// Registration payload of one option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionData {
    /// Option type.
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Option name.
    pub name: String,
    /// Option description.
    pub description: String,
    /// Localized names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: LocalizationMap,
    /// Localized descriptions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description_localizations: LocalizationMap,
    /// Whether a value must be supplied.
    pub required: bool,
    /// Whether values are suggested through autocomplete.
    pub autocomplete: bool,
    /// Fixed choices.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

/// Registration payload of one subcommand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcommandData {
    /// Subcommand name.
    pub name: String,
    /// Subcommand description.
    pub description: String,
    /// Localized names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: LocalizationMap,
    /// Localized descriptions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description_localizations: LocalizationMap,
    /// Options of the subcommand.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionData>,
}

/// Registration payload of one subcommand group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcommandGroupData {
    /// Group name.
    pub name: String,
    /// Group description.
    pub description: String,
    /// Localized names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: LocalizationMap,
    /// Localized descriptions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description_localizations: LocalizationMap,
    /// Subcommands inside the group.
    pub subcommands: Vec<SubcommandData>,
}

/// Registration payload of one top-level command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandData {
    /// Command name.
    pub name: String,
    /// Command description.
    pub description: String,
    /// Localized names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: LocalizationMap,
    /// Localized descriptions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description_localizations: LocalizationMap,
    /// Top-level options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionData>,
    /// Subcommands.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SubcommandData>,
    /// Subcommand groups.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcommand_groups: Vec<SubcommandGroupData>,
    /// Whether the command is only available inside guilds.
    pub guild_only: bool,
    /// Whether the command is age restricted.
    pub nsfw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_value_serializes_untagged() {
        let choice = Choice::new("small", ChoiceValue::Integer(1));
        let json = serde_json::to_value(&choice).unwrap();
        assert_eq!(json, serde_json::json!({"name": "small", "value": 1}));
        assert_eq!(choice.value.option_type(), OptionType::Integer);
    }

    #[test]
    fn test_option_data_uses_type_code() {
        let option = OptionData {
            kind: OptionType::User,
            name: "target".into(),
            description: "who".into(),
            name_localizations: LocalizationMap::new(),
            description_localizations: LocalizationMap::from([(
                Locale::from("de"),
                "wer".to_string(),
            )]),
            required: true,
            autocomplete: false,
            choices: Vec::new(),
        };
        let json = serde_json::to_value(&option).unwrap();
        assert_eq!(json["type"], 6);
        assert_eq!(json["description_localizations"]["de"], "wer");
        assert!(json.get("choices").is_none());
    }
}
