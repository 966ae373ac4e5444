//! Descriptor builders.
//!
//! [`CommandBuilder<S>`] turns a [`CommandClass`] into a
//! [`CommandDescriptor<S>`]. It only looks at annotations tagged with its own
//! style, so one class can carry prefix, slash and hybrid metadata side by
//! side and be built once per style.
//!
//! Building is a pure function of the class metadata: no I/O, and two builds
//! of the same class produce equal trees. The only user code it runs is the
//! constructor of each subcommand group.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::debug;

use crate::descriptor::{
    CommandDescriptor, Localizations, OptionDescriptor, SubcommandDescriptor,
    SubcommandGroupDescriptor,
};
use crate::error::{BuildError, BuildResult};
use crate::localization::{self, SharedLocalization};
use crate::meta::{Annotated, Annotation, CommandClass, GroupClass, MethodMeta, ParamMeta};
use crate::style::{Hybrid, Prefix, Slash, Style};
use relay_core::{Choice, ChoiceValue, OptionType};

/// Builds prefix command descriptors.
pub type PrefixCommandBuilder = CommandBuilder<Prefix>;
/// Builds slash command descriptors.
pub type SlashCommandBuilder = CommandBuilder<Slash>;
/// Builds hybrid command descriptors.
pub type HybridCommandBuilder = CommandBuilder<Hybrid>;

/// Builds descriptors of style `S`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBuilder<S: Style> {
    _style: PhantomData<S>,
}

impl<S: Style> CommandBuilder<S> {
    /// Creates a builder.
    pub fn new() -> Self {
        Self {
            _style: PhantomData,
        }
    }

    /// Builds the descriptor of `class`.
    pub fn build(&self, class: &CommandClass) -> BuildResult<CommandDescriptor<S>> {
        let class_name = class.type_name();

        let (explicit_name, description) = class
            .find_annotation(|a| match a {
                Annotation::Command {
                    style,
                    name,
                    description,
                } if *style == S::KIND => Some((name.as_str(), description.as_str())),
                _ => None,
            })
            .ok_or_else(|| BuildError::AnnotationNotFound {
                class: class_name.to_string(),
                expected: S::KIND.to_string(),
            })?;

        for method in class.methods() {
            check_params(class_name, method)?;
        }

        let main = class
            .methods()
            .iter()
            .find(|m| m.has_annotation(|a| matches!(a, Annotation::MainCommand)));

        let name = match (explicit_name.is_empty(), main) {
            (false, _) => explicit_name.to_string(),
            (true, Some(main)) => main.name().to_string(),
            (true, None) => {
                return Err(BuildError::property_not_found(
                    class_name,
                    "could not find command name in annotation or pick up a method name",
                ));
            }
        };

        let options = match main {
            Some(main) => self.build_options(class_name, main)?,
            None => Vec::new(),
        };

        let subcommands = self.build_subcommands(class_name, class.methods(), &name)?;

        let mut groups = BTreeMap::new();
        for group_class in class.groups() {
            if let Some(group) = self.build_group(group_class, &name)? {
                if subcommands.contains_key(&group.name) || groups.contains_key(&group.name) {
                    return Err(BuildError::DuplicateName {
                        style: S::KIND,
                        scope: format!("command '{name}'"),
                        name: group.name,
                    });
                }
                groups.insert(group.name.clone(), group);
            }
        }

        if main.is_some() && (!subcommands.is_empty() || !groups.is_empty()) {
            return Err(BuildError::ConflictingShape {
                class: class_name.to_string(),
                command: name,
            });
        }

        let localizations = if S::LOCALIZED {
            let mut localizations = localizations_of(class);
            if let Some(main) = main {
                let fallback = localizations_of(main);
                if localizations.name.is_empty() {
                    localizations.name = fallback.name;
                }
                if localizations.description.is_empty() {
                    localizations.description = fallback.description;
                }
            }
            localizations
        } else {
            Localizations::default()
        };

        let localization_function: SharedLocalization = if S::LOCALIZED {
            class
                .find_annotation(|a| match a {
                    Annotation::LocalizationFunction(function) => Some(function.clone()),
                    _ => None,
                })
                .unwrap_or_else(localization::empty)
        } else {
            localization::empty()
        };

        let descriptor = CommandDescriptor {
            class_name,
            name,
            description: description_of::<S>(description),
            instance: class.instance().clone(),
            entry_point: main.map(|m| m.entry_point().clone()),
            options,
            guild_only: class.has_annotation(|a| matches!(a, Annotation::GuildOnly)),
            nsfw: class.has_annotation(|a| matches!(a, Annotation::Nsfw)),
            localizations,
            localization_function,
            subcommands,
            groups,
        };

        debug!(
            style = %S::KIND,
            command = %descriptor.name,
            class = class_name,
            options = descriptor.options.len(),
            subcommands = descriptor.subcommands.len(),
            groups = descriptor.groups.len(),
            "Built command descriptor"
        );

        Ok(descriptor)
    }

    fn build_subcommands(
        &self,
        class_name: &str,
        methods: &[MethodMeta],
        scope: &str,
    ) -> BuildResult<BTreeMap<String, SubcommandDescriptor<S>>> {
        let mut subcommands = BTreeMap::new();

        for method in methods {
            let Some((explicit_name, description)) = method.find_annotation(|a| match a {
                Annotation::Subcommand {
                    style,
                    name,
                    description,
                } if *style == S::KIND => Some((name.as_str(), description.as_str())),
                _ => None,
            }) else {
                continue;
            };

            let name = if explicit_name.is_empty() {
                method.name().to_string()
            } else {
                explicit_name.to_string()
            };

            if subcommands.contains_key(&name) {
                return Err(BuildError::DuplicateName {
                    style: S::KIND,
                    scope: format!("command '{scope}'"),
                    name,
                });
            }

            let subcommand = SubcommandDescriptor {
                name: name.clone(),
                description: description_of::<S>(description),
                entry_point: method.entry_point().clone(),
                options: self.build_options(class_name, method)?,
                localizations: if S::LOCALIZED {
                    localizations_of(method)
                } else {
                    Localizations::default()
                },
                _style: PhantomData,
            };
            subcommands.insert(name, subcommand);
        }

        Ok(subcommands)
    }

    fn build_group(
        &self,
        group: &GroupClass,
        command: &str,
    ) -> BuildResult<Option<SubcommandGroupDescriptor<S>>> {
        let Some((name, description)) = group.find_annotation(|a| match a {
            Annotation::SubcommandGroup {
                style,
                name,
                description,
            } if *style == S::KIND => Some((name.as_str(), description.as_str())),
            _ => None,
        }) else {
            return Ok(None);
        };

        let class_name = group.type_name();
        if name.is_empty() {
            return Err(BuildError::property_not_found(
                class_name,
                "subcommand group annotation has no name",
            ));
        }

        for method in group.methods() {
            check_params(class_name, method)?;
        }

        let instance = group
            .instantiate()
            .map_err(|source| BuildError::GroupInstantiation {
                class: class_name.to_string(),
                source,
            })?;

        let subcommands =
            self.build_subcommands(class_name, group.methods(), &format!("{command} {name}"))?;

        Ok(Some(SubcommandGroupDescriptor {
            name: name.to_string(),
            description: description_of::<S>(description),
            instance,
            subcommands,
            localizations: if S::LOCALIZED {
                localizations_of(group)
            } else {
                Localizations::default()
            },
        }))
    }

    fn build_options(
        &self,
        class_name: &str,
        method: &MethodMeta,
    ) -> BuildResult<Vec<OptionDescriptor>> {
        method
            .params()
            .iter()
            .enumerate()
            .map(|(index, param)| self.build_option(class_name, method, index, param))
            .collect()
    }

    fn build_option(
        &self,
        class_name: &str,
        method: &MethodMeta,
        index: usize,
        param: &ParamMeta,
    ) -> BuildResult<OptionDescriptor> {
        let (kind, name, description) = param
            .find_annotation(|a| match a {
                Annotation::Option {
                    style,
                    kind,
                    name,
                    description,
                } if *style == S::KIND => Some((*kind, name.as_str(), description.as_str())),
                _ => None,
            })
            .ok_or_else(|| {
                BuildError::property_not_found(
                    class_name,
                    format!(
                        "parameter {index} of method '{}' has no {} option annotation",
                        method.name(),
                        S::KIND
                    ),
                )
            })?;

        let kind = match kind {
            OptionType::Unknown => param
                .declared()
                .infer_option_type(S::INFERS_ATTACHMENT)
                .ok_or_else(|| BuildError::UnresolvedOptionType {
                    class: class_name.to_string(),
                    method: method.name().to_string(),
                    option: name.to_string(),
                    declared: param.declared(),
                })?,
            explicit => explicit,
        };

        let choices = param
            .annotations()
            .iter()
            .filter_map(|a| match a {
                Annotation::ChoiceString { name, value } => {
                    Some(Choice::new(name, ChoiceValue::String(value.clone())))
                }
                Annotation::ChoiceLong { name, value } => {
                    Some(Choice::new(name, ChoiceValue::Integer(*value)))
                }
                Annotation::ChoiceDouble { name, value } => {
                    Some(Choice::new(name, ChoiceValue::Number(*value)))
                }
                _ => None,
            })
            .collect();

        Ok(OptionDescriptor {
            kind,
            name: name.to_string(),
            description: description_of::<S>(description),
            required: param.has_annotation(|a| matches!(a, Annotation::Required)),
            autocomplete: S::AUTOCOMPLETE
                && param.has_annotation(|a| matches!(a, Annotation::AutoComplete)),
            choices,
        })
    }
}

fn check_params(class_name: &str, method: &MethodMeta) -> BuildResult<()> {
    match method.stray_params().first() {
        Some(index) => Err(BuildError::property_not_found(
            class_name,
            format!(
                "method '{}' has no parameter at index {index}",
                method.name()
            ),
        )),
        None => Ok(()),
    }
}

fn description_of<S: Style>(description: &str) -> Option<String> {
    if description.is_empty() && S::OPTIONAL_DESCRIPTION {
        None
    } else {
        Some(description.to_string())
    }
}

fn localizations_of(annotated: &impl Annotated) -> Localizations {
    Localizations {
        name: annotated
            .find_annotation(|a| match a {
                Annotation::NameLocalizations(map) => Some(map.clone()),
                _ => None,
            })
            .unwrap_or_default(),
        description: annotated
            .find_annotation(|a| match a {
                Annotation::DescriptionLocalizations(map) => Some(map.clone()),
                _ => None,
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::DeclaredType;
    use crate::event::CommandEvent;
    use crate::localization::BundleLocalization;
    use crate::style::CommandStyle;
    use crate::test_support::{Log, echo_class, ping_class, role_class};
    use relay_core::{Attachment, Locale, Role};
    use std::sync::Arc;

    #[derive(Default)]
    struct Upload;

    impl Upload {
        async fn upload(self: Arc<Self>, _event: CommandEvent, _file: Option<Attachment>) {}
        async fn tag(self: Arc<Self>, _event: CommandEvent, _role: Option<Role>) {}
    }

    fn upload_class(style: CommandStyle) -> CommandClass {
        CommandClass::new(Upload)
            .annotate(Annotation::command(style, "", "Upload a file"))
            .method(
                MethodMeta::new("upload", Upload::upload)
                    .main()
                    .param(0, [Annotation::option(style, "file", "The file")]),
            )
    }

    #[test]
    fn test_explicit_name_wins() {
        let log = Log::default();
        let cmd = SlashCommandBuilder::new().build(&echo_class(&log)).unwrap_err();
        assert!(matches!(cmd, BuildError::AnnotationNotFound { .. }));

        let cmd = HybridCommandBuilder::new().build(&echo_class(&log)).unwrap();
        assert_eq!(cmd.name(), "say");
        assert_eq!(cmd.entry_point().map(|e| e.name()), Some("echo"));
    }

    #[test]
    fn test_name_from_entry_point() {
        let log = Log::default();
        let cmd = SlashCommandBuilder::new().build(&ping_class(&log)).unwrap();
        assert_eq!(cmd.name(), "ping");
        assert_eq!(cmd.description(), Some("Replies with pong"));
        assert!(cmd.options().is_empty());
        assert!(!cmd.has_children());
    }

    #[test]
    fn test_missing_name_fails() {
        let class = CommandClass::new(Upload).annotate(Annotation::slash_command("", "nothing"));
        let err = SlashCommandBuilder::new().build(&class).unwrap_err();
        assert!(matches!(err, BuildError::PropertyNotFound { .. }));
        assert!(err.to_string().contains("Upload"));
    }

    #[test]
    fn test_option_inference() {
        let log = Log::default();
        let cmd = HybridCommandBuilder::new().build(&echo_class(&log)).unwrap();
        let kinds: Vec<_> = cmd.options().iter().map(|o| o.kind()).collect();
        assert_eq!(
            kinds,
            vec![OptionType::String, OptionType::Integer, OptionType::Boolean]
        );
        assert!(cmd.options()[0].is_required());
        assert!(!cmd.options()[1].is_required());
    }

    #[test]
    fn test_attachment_inference_is_slash_only() {
        let cmd = SlashCommandBuilder::new()
            .build(&upload_class(CommandStyle::Slash))
            .unwrap();
        assert_eq!(cmd.options()[0].kind(), OptionType::Attachment);

        let err = HybridCommandBuilder::new()
            .build(&upload_class(CommandStyle::Hybrid))
            .unwrap_err();
        match err {
            BuildError::UnresolvedOptionType {
                option, declared, ..
            } => {
                assert_eq!(option, "file");
                assert_eq!(declared, DeclaredType::Attachment);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_type_wins() {
        let class = CommandClass::new(Upload)
            .annotate(Annotation::prefix_command("tag", ""))
            .method(MethodMeta::new("tag", Upload::tag).main().param(
                0,
                [Annotation::typed_option(
                    CommandStyle::Prefix,
                    OptionType::Role,
                    "role",
                    "",
                )],
            ));
        let cmd = PrefixCommandBuilder::new().build(&class).unwrap();
        assert_eq!(cmd.options()[0].kind(), OptionType::Role);
        assert_eq!(cmd.options()[0].description(), None);
        assert_eq!(cmd.description(), None);
    }

    #[test]
    fn test_choices_and_autocomplete() {
        let build = |style: CommandStyle| {
            CommandClass::new(Upload)
                .annotate(Annotation::command(style, "tag", "Tag"))
                .method(MethodMeta::new("tag", Upload::tag).main().param(
                    0,
                    [
                        Annotation::typed_option(style, OptionType::String, "role", "Role"),
                        Annotation::AutoComplete,
                        Annotation::choice_string("Mods", "mods"),
                        Annotation::choice_long("Ten", 10),
                        Annotation::choice_double("Half", 0.5),
                    ],
                ))
        };

        let slash = SlashCommandBuilder::new()
            .build(&build(CommandStyle::Slash))
            .unwrap();
        let option = &slash.options()[0];
        assert!(option.is_autocomplete());
        let names: Vec<_> = option.choices().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mods", "Ten", "Half"]);
        assert_eq!(option.choices()[1].value, ChoiceValue::Integer(10));

        let hybrid = HybridCommandBuilder::new()
            .build(&build(CommandStyle::Hybrid))
            .unwrap();
        assert!(!hybrid.options()[0].is_autocomplete());
    }

    #[test]
    fn test_groups_and_subcommands() {
        let log = Log::default();
        let cmd = SlashCommandBuilder::new()
            .build(&role_class(&log, CommandStyle::Slash))
            .unwrap();

        assert_eq!(cmd.name(), "role");
        assert!(cmd.entry_point().is_none());
        assert!(cmd.is_guild_only());
        assert!(cmd.subcommand("list").is_some());

        let admin = cmd.group("admin").unwrap();
        let names: Vec<_> = admin.subcommands().map(|s| s.name()).collect();
        assert_eq!(names, vec!["add", "remove"]);
        assert_eq!(admin.subcommand("add").unwrap().options().len(), 2);
    }

    #[test]
    fn test_group_instantiation_failure() {
        let class = CommandClass::new(Upload)
            .annotate(Annotation::slash_command("files", "Files"))
            .group(
                GroupClass::with_constructor(|| Err::<Upload, _>("disk unavailable"))
                    .annotate(Annotation::group(CommandStyle::Slash, "admin", "Admin")),
            );
        let err = SlashCommandBuilder::new().build(&class).unwrap_err();
        assert!(matches!(err, BuildError::GroupInstantiation { .. }));
        assert!(err.to_string().contains("disk unavailable"));
    }

    #[test]
    fn test_duplicate_subcommand_names() {
        let class = CommandClass::new(Upload)
            .annotate(Annotation::slash_command("files", "Files"))
            .method(MethodMeta::new("upload", Upload::upload).annotate(Annotation::subcommand(
                CommandStyle::Slash,
                "put",
                "Put",
            )))
            .method(MethodMeta::new("tag", Upload::tag).annotate(Annotation::subcommand(
                CommandStyle::Slash,
                "put",
                "Put again",
            )));
        let err = SlashCommandBuilder::new().build(&class).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateName { ref name, .. } if name == "put"));
    }

    #[test]
    fn test_entry_point_with_subcommands_conflicts() {
        let class = upload_class(CommandStyle::Slash).method(
            MethodMeta::new("tag", Upload::tag)
                .annotate(Annotation::subcommand(CommandStyle::Slash, "", "Tag"))
                .param(0, [Annotation::typed_option(CommandStyle::Slash, OptionType::Role, "role", "Role")]),
        );
        let err = SlashCommandBuilder::new().build(&class).unwrap_err();
        assert!(matches!(err, BuildError::ConflictingShape { .. }));
    }

    #[test]
    fn test_unannotated_parameter_fails() {
        let class = CommandClass::new(Upload)
            .annotate(Annotation::slash_command("", "Upload"))
            .method(MethodMeta::new("upload", Upload::upload).main());
        let err = SlashCommandBuilder::new().build(&class).unwrap_err();
        assert!(err.to_string().contains("no slash option annotation"));

        let class = upload_class(CommandStyle::Slash)
            .method(MethodMeta::new("tag", Upload::tag).param(3, [Annotation::Required]));
        let err = SlashCommandBuilder::new().build(&class).unwrap_err();
        assert!(err.to_string().contains("no parameter at index 3"));
    }

    #[test]
    fn test_build_is_repeatable() {
        let log = Log::default();
        let class = role_class(&log, CommandStyle::Hybrid);
        let builder = HybridCommandBuilder::new();
        let first = builder.build(&class).unwrap();
        let second = builder.build(&class).unwrap();

        assert_eq!(first.name(), second.name());
        assert_eq!(first.description(), second.description());
        assert_eq!(first.options(), second.options());
        assert_eq!(first.to_command_data(), second.to_command_data());
    }

    #[test]
    fn test_localizations_only_for_slash_like() {
        let function = BundleLocalization::new().with_bundle(
            "de",
            [
                ("ping.name", "ping-de"),
                ("ping.description", "Antwortet mit pong"),
            ],
        );
        let class = |style: CommandStyle| {
            CommandClass::new(Upload)
                .annotate(Annotation::command(style, "ping", "Replies with pong"))
                .annotate(Annotation::name_localizations([("de", "anpingen")]))
                .annotate(Annotation::LocalizationFunction(Arc::new(function.clone())))
                .method(MethodMeta::new("ping", Upload::upload).main().param(
                    0,
                    [Annotation::typed_option(style, OptionType::String, "file", "File")],
                ))
        };

        let prefix = PrefixCommandBuilder::new()
            .build(&class(CommandStyle::Prefix))
            .unwrap();
        assert!(prefix.localizations().is_empty());

        let slash = SlashCommandBuilder::new()
            .build(&class(CommandStyle::Slash))
            .unwrap();
        let data = slash.to_command_data();
        let de = Locale::from("de");
        assert_eq!(data.name_localizations.get(&de).map(String::as_str), Some("anpingen"));
        assert_eq!(
            data.description_localizations.get(&de).map(String::as_str),
            Some("Antwortet mit pong")
        );
        assert_eq!(data.options.len(), 1);
        assert!(data.options[0].name_localizations.is_empty());
    }

    #[test]
    fn test_registration_data_shape() {
        let log = Log::default();
        let cmd = SlashCommandBuilder::new()
            .build(&role_class(&log, CommandStyle::Slash))
            .unwrap();
        let data = cmd.to_command_data();

        assert!(data.guild_only);
        assert!(data.options.is_empty());
        assert_eq!(data.subcommands.len(), 1);
        assert_eq!(data.subcommand_groups.len(), 1);
        assert_eq!(data.subcommand_groups[0].subcommands[0].name, "add");

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["subcommand_groups"][0]["subcommands"][0]["options"][0]["type"], 8);
    }
}
