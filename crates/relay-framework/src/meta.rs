//! Command metadata: the annotation vocabulary and the values it decorates.
//!
//! A command type is described once at startup as a [`CommandClass`]: the
//! handler object, its class-level [`Annotation`]s, its methods
//! ([`MethodMeta`]) and any nested subcommand groups ([`GroupClass`]).
//! Builders read nothing but this data, so building is a pure function of it.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Moderation;
//!
//! impl Moderation {
//!     async fn kick(self: Arc<Self>, event: CommandEvent, target: Option<Member>) -> String { .. }
//! }
//!
//! #[derive(Default)]
//! struct Roles;
//!
//! impl Roles {
//!     async fn add(self: Arc<Self>, event: CommandEvent, role: Option<Role>) { .. }
//! }
//!
//! let class = CommandClass::new(Moderation)
//!     .annotate(Annotation::slash_command("mod", "Moderation tools"))
//!     .annotate(Annotation::GuildOnly)
//!     .method(
//!         MethodMeta::new("kick", Moderation::kick)
//!             .annotate(Annotation::subcommand(CommandStyle::Slash, "", "Kick a member"))
//!             .param(0, [Annotation::option(CommandStyle::Slash, "target", "Who"), Annotation::Required]),
//!     )
//!     .group(
//!         GroupClass::of::<Roles>()
//!             .annotate(Annotation::group(CommandStyle::Slash, "roles", "Role tools"))
//!             .method(
//!                 MethodMeta::new("add", Roles::add)
//!                     .annotate(Annotation::subcommand(CommandStyle::Slash, "", "Grant a role"))
//!                     .param(0, [Annotation::typed_option(CommandStyle::Slash, OptionType::Role, "role", "Which")]),
//!             ),
//!     );
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::argument::DeclaredType;
use crate::error::BoxError;
use crate::handler::{EntryPoint, Handler, Instance};
use crate::localization::SharedLocalization;
use crate::style::CommandStyle;
use relay_core::{Locale, LocalizationMap, OptionType};

// ============================================================================
// Annotation
// ============================================================================

/// One piece of declarative command metadata.
///
/// Style-tagged variants are only seen by the builder of that style.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// Marks a class as a command. An empty name defers to the entry point's name.
    Command {
        /// Command style.
        style: CommandStyle,
        /// Explicit command name, or empty.
        name: String,
        /// Command description.
        description: String,
    },
    /// Marks a method as the command's top-level entry point.
    MainCommand,
    /// Marks a method as a subcommand. An empty name defers to the method name.
    Subcommand {
        /// Command style.
        style: CommandStyle,
        /// Explicit subcommand name, or empty.
        name: String,
        /// Subcommand description.
        description: String,
    },
    /// Marks a nested class as a subcommand group.
    SubcommandGroup {
        /// Command style.
        style: CommandStyle,
        /// Group name.
        name: String,
        /// Group description.
        description: String,
    },
    /// Marks a parameter as a command option.
    Option {
        /// Command style.
        style: CommandStyle,
        /// Explicit type, or [`OptionType::Unknown`] to infer it.
        kind: OptionType,
        /// Option name.
        name: String,
        /// Option description.
        description: String,
    },
    /// The option must be supplied.
    Required,
    /// The option offers autocomplete suggestions.
    AutoComplete,
    /// A fixed text choice.
    ChoiceString {
        /// Choice label.
        name: String,
        /// Choice value.
        value: String,
    },
    /// A fixed integer choice.
    ChoiceLong {
        /// Choice label.
        name: String,
        /// Choice value.
        value: i64,
    },
    /// A fixed floating point choice.
    ChoiceDouble {
        /// Choice label.
        name: String,
        /// Choice value.
        value: f64,
    },
    /// The command is only usable inside guilds.
    GuildOnly,
    /// The command is age restricted.
    Nsfw,
    /// Explicit name translations.
    NameLocalizations(LocalizationMap),
    /// Explicit description translations.
    DescriptionLocalizations(LocalizationMap),
    /// Function used to translate registration strings.
    LocalizationFunction(SharedLocalization),
}

impl Annotation {
    /// Creates a command annotation.
    pub fn command(
        style: CommandStyle,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::Command {
            style,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Creates a prefix command annotation.
    pub fn prefix_command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::command(CommandStyle::Prefix, name, description)
    }

    /// Creates a slash command annotation.
    pub fn slash_command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::command(CommandStyle::Slash, name, description)
    }

    /// Creates a hybrid command annotation.
    pub fn hybrid_command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::command(CommandStyle::Hybrid, name, description)
    }

    /// Creates a subcommand annotation.
    pub fn subcommand(
        style: CommandStyle,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::Subcommand {
            style,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Creates a subcommand group annotation.
    pub fn group(
        style: CommandStyle,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::SubcommandGroup {
            style,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Creates an option annotation whose type is inferred.
    pub fn option(
        style: CommandStyle,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::typed_option(style, OptionType::Unknown, name, description)
    }

    /// Creates an option annotation with an explicit type.
    pub fn typed_option(
        style: CommandStyle,
        kind: OptionType,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::Option {
            style,
            kind,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Creates a text choice.
    pub fn choice_string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ChoiceString {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates an integer choice.
    pub fn choice_long(name: impl Into<String>, value: i64) -> Self {
        Self::ChoiceLong {
            name: name.into(),
            value,
        }
    }

    /// Creates a floating point choice.
    pub fn choice_double(name: impl Into<String>, value: f64) -> Self {
        Self::ChoiceDouble {
            name: name.into(),
            value,
        }
    }

    /// Creates explicit name translations.
    pub fn name_localizations<L, V>(entries: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<Locale>,
        V: Into<String>,
    {
        Self::NameLocalizations(collect_map(entries))
    }

    /// Creates explicit description translations.
    pub fn description_localizations<L, V>(entries: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<Locale>,
        V: Into<String>,
    {
        Self::DescriptionLocalizations(collect_map(entries))
    }
}

fn collect_map<L, V>(entries: impl IntoIterator<Item = (L, V)>) -> LocalizationMap
where
    L: Into<Locale>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(l, v)| (l.into(), v.into()))
        .collect()
}

/// Read access to an annotation list.
pub trait Annotated {
    /// Returns the annotations in declaration order.
    fn annotations(&self) -> &[Annotation];

    /// Returns the first annotation `f` maps to `Some`.
    fn find_annotation<'a, T>(&'a self, f: impl FnMut(&'a Annotation) -> Option<T>) -> Option<T> {
        self.annotations().iter().find_map(f)
    }

    /// Whether any annotation satisfies `f`.
    fn has_annotation(&self, f: impl FnMut(&Annotation) -> bool) -> bool {
        self.annotations().iter().any(f)
    }
}

// ============================================================================
// Parameters and methods
// ============================================================================

/// Metadata of one handler parameter.
#[derive(Debug, Clone)]
pub struct ParamMeta {
    declared: DeclaredType,
    annotations: Vec<Annotation>,
}

impl ParamMeta {
    /// Creates an unannotated parameter.
    pub fn new(declared: DeclaredType) -> Self {
        Self {
            declared,
            annotations: Vec::new(),
        }
    }

    /// Returns the declared semantic type.
    pub fn declared(&self) -> DeclaredType {
        self.declared
    }
}

impl Annotated for ParamMeta {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// Metadata of one declared method.
///
/// Parameter types are taken from the handler's signature; annotate them by
/// index with [`param`](Self::param).
#[derive(Debug, Clone)]
pub struct MethodMeta {
    name: String,
    annotations: Vec<Annotation>,
    params: Vec<ParamMeta>,
    stray_params: Vec<usize>,
    entry_point: EntryPoint,
}

impl MethodMeta {
    /// Describes `handler` as a method called `name`.
    pub fn new<R, T, H>(name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<R, T>,
        R: Send + Sync + 'static,
        T: 'static,
    {
        let name = name.into();
        let entry_point = EntryPoint::new(name.clone(), handler);
        let params = entry_point
            .declared_types()
            .iter()
            .copied()
            .map(ParamMeta::new)
            .collect();

        Self {
            name,
            annotations: Vec::new(),
            params,
            stray_params: Vec::new(),
            entry_point,
        }
    }

    /// Adds a method annotation.
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Marks the method as the command's entry point.
    pub fn main(self) -> Self {
        self.annotate(Annotation::MainCommand)
    }

    /// Annotates the option parameter at `index` (zero-based, after the event).
    pub fn param(mut self, index: usize, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        match self.params.get_mut(index) {
            Some(param) => param.annotations.extend(annotations),
            None => self.stray_params.push(index),
        }
        self
    }

    /// Returns the method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameters.
    pub fn params(&self) -> &[ParamMeta] {
        &self.params
    }

    /// Returns parameter indices that were annotated but do not exist.
    pub fn stray_params(&self) -> &[usize] {
        &self.stray_params
    }

    /// Returns the erased handler.
    pub fn entry_point(&self) -> &EntryPoint {
        &self.entry_point
    }
}

impl Annotated for MethodMeta {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Constructor of a subcommand group object.
pub type GroupConstructor = Arc<dyn Fn() -> Result<Instance, BoxError> + Send + Sync>;

/// Metadata of a nested subcommand group class.
#[derive(Clone)]
pub struct GroupClass {
    type_name: &'static str,
    annotations: Vec<Annotation>,
    methods: Vec<MethodMeta>,
    constructor: GroupConstructor,
}

impl GroupClass {
    /// Describes a group constructed through `T::default()`.
    pub fn of<T>() -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::with_constructor(|| Ok::<_, BoxError>(T::default()))
    }

    /// Describes a group constructed by a fallible function.
    pub fn with_constructor<T, E, F>(constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name::<T>(),
            annotations: Vec::new(),
            methods: Vec::new(),
            constructor: Arc::new(move || {
                constructor()
                    .map(|group| Arc::new(group) as Instance)
                    .map_err(Into::into)
            }),
        }
    }

    /// Adds a class annotation.
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Adds a method.
    pub fn method(mut self, method: MethodMeta) -> Self {
        self.methods.push(method);
        self
    }

    /// Returns the type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the methods.
    pub fn methods(&self) -> &[MethodMeta] {
        &self.methods
    }

    /// Constructs a fresh group object.
    pub fn instantiate(&self) -> Result<Instance, BoxError> {
        (self.constructor)()
    }
}

impl Annotated for GroupClass {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl fmt::Debug for GroupClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupClass")
            .field("type_name", &self.type_name)
            .field("annotations", &self.annotations)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Metadata of a command class.
#[derive(Clone)]
pub struct CommandClass {
    type_name: &'static str,
    instance: Instance,
    annotations: Vec<Annotation>,
    methods: Vec<MethodMeta>,
    groups: Vec<GroupClass>,
}

impl CommandClass {
    /// Describes a command whose handler object is `instance`.
    pub fn new<T>(instance: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::from_arc(Arc::new(instance))
    }

    /// Describes a command whose handler object is already shared.
    pub fn from_arc<T>(instance: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            type_name: type_name::<T>(),
            instance,
            annotations: Vec::new(),
            methods: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Adds a class annotation.
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Adds a method.
    pub fn method(mut self, method: MethodMeta) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a nested group class.
    pub fn group(mut self, group: GroupClass) -> Self {
        self.groups.push(group);
        self
    }

    /// Returns the type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the shared handler object.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Returns the methods.
    pub fn methods(&self) -> &[MethodMeta] {
        &self.methods
    }

    /// Returns the nested group classes.
    pub fn groups(&self) -> &[GroupClass] {
        &self.groups
    }

    /// Returns the styles this class is annotated as.
    pub fn styles(&self) -> Vec<CommandStyle> {
        let mut styles = Vec::new();
        for annotation in &self.annotations {
            if let Annotation::Command { style, .. } = annotation
                && !styles.contains(style)
            {
                styles.push(*style);
            }
        }
        styles
    }
}

impl Annotated for CommandClass {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl fmt::Debug for CommandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandClass")
            .field("type_name", &self.type_name)
            .field("annotations", &self.annotations)
            .field("methods", &self.methods)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CommandEvent;

    #[derive(Default)]
    struct Greeter;

    impl Greeter {
        async fn greet(self: Arc<Self>, _event: CommandEvent, _name: Option<String>, _loud: Option<bool>) {}
    }

    #[test]
    fn test_params_follow_signature() {
        let method = MethodMeta::new("greet", Greeter::greet)
            .param(1, [Annotation::option(CommandStyle::Slash, "loud", "Shout")])
            .param(5, [Annotation::Required]);

        assert_eq!(method.params().len(), 2);
        assert_eq!(method.params()[0].declared(), DeclaredType::String);
        assert!(method.params()[0].annotations().is_empty());
        assert_eq!(method.params()[1].annotations().len(), 1);
        assert_eq!(method.stray_params(), &[5]);
    }

    #[test]
    fn test_class_styles() {
        let class = CommandClass::new(Greeter)
            .annotate(Annotation::slash_command("greet", ""))
            .annotate(Annotation::GuildOnly)
            .annotate(Annotation::prefix_command("greet", ""))
            .annotate(Annotation::slash_command("again", ""));

        assert_eq!(class.styles(), vec![CommandStyle::Slash, CommandStyle::Prefix]);
        assert!(class.has_annotation(|a| matches!(a, Annotation::GuildOnly)));
        assert!(class.type_name().ends_with("Greeter"));
    }

    #[test]
    fn test_group_constructor_failure() {
        let group = GroupClass::with_constructor(|| Err::<Greeter, _>("no database"));
        let err = group.instantiate().err().unwrap();
        assert_eq!(err.to_string(), "no database");

        assert!(GroupClass::of::<Greeter>().instantiate().is_ok());
    }
}
