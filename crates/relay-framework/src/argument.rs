//! Typed invocation arguments.
//!
//! Parsers turn raw option mappings into [`Argument`] values, one slot per
//! declared option. Handler parameters then pull their value out of the slot
//! through [`FromArgument`], which is also how the builder learns each
//! parameter's declared type for option type inference.
//!
//! ```rust,ignore
//! async fn ban(
//!     self: Arc<Self>,
//!     event: CommandEvent,
//!     target: Member,             // required, absence is an error
//!     reason: Option<String>,     // optional
//!     days: Option<i64>,
//! ) -> Result<String, BoxError> { ... }
//! ```

use std::fmt;

use crate::error::ArgumentError;
use crate::event::CommandEvent;
use relay_core::{Attachment, Channel, Member, Mentionable, OptionType, Role, User};

/// A coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `BOOLEAN` value.
    Boolean(bool),
    /// `INTEGER` value.
    Integer(i64),
    /// `NUMBER` value.
    Number(f64),
    /// `STRING` value.
    String(String),
    /// `USER` value, with membership data when available.
    User {
        /// The user.
        user: User,
        /// The member, inside a guild.
        member: Option<Member>,
    },
    /// `CHANNEL` value.
    Channel(Channel),
    /// `ROLE` value.
    Role(Role),
    /// `MENTIONABLE` value.
    Mentionable(Mentionable),
    /// `ATTACHMENT` value.
    Attachment(Attachment),
}

impl Argument {
    /// Returns a short name of the value's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::User { .. } => "user",
            Self::Channel(_) => "channel",
            Self::Role(_) => "role",
            Self::Mentionable(_) => "mentionable",
            Self::Attachment(_) => "attachment",
        }
    }
}

/// Semantic type of a handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// `bool`
    Boolean,
    /// [`Channel`]
    Channel,
    /// `i64`
    Integer,
    /// [`Mentionable`]
    Mentionable,
    /// `f64`
    Number,
    /// `String`
    String,
    /// [`User`]
    User,
    /// [`Member`]
    Member,
    /// [`Attachment`]
    Attachment,
    /// Any type outside the inference table.
    Other(&'static str),
}

impl DeclaredType {
    /// Infers the option type for a parameter of this declared type.
    ///
    /// `attachments` enables the attachment row of the table, which only the
    /// slash style uses.
    pub fn infer_option_type(self, attachments: bool) -> Option<OptionType> {
        match self {
            Self::Boolean => Some(OptionType::Boolean),
            Self::Channel => Some(OptionType::Channel),
            Self::Integer => Some(OptionType::Integer),
            Self::Mentionable => Some(OptionType::Mentionable),
            Self::Number => Some(OptionType::Number),
            Self::String => Some(OptionType::String),
            Self::User | Self::Member => Some(OptionType::User),
            Self::Attachment if attachments => Some(OptionType::Attachment),
            Self::Attachment | Self::Other(_) => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

// ============================================================================
// Parameter extraction
// ============================================================================

/// Types a bound argument slot can be viewed as.
///
/// `extract` returns `Ok(None)` when the value is present but has no view of
/// this kind that is meaningful (a user outside a guild viewed as a member),
/// and `Err(found)` when the kinds do not match at all.
pub trait ArgumentValue: Sized {
    /// Declared type used for option type inference.
    const DECLARED: DeclaredType;
    /// Name used in mismatch errors.
    const NAME: &'static str;

    /// Views the argument as this type.
    fn extract(argument: Argument) -> Result<Option<Self>, &'static str>;
}

/// Handler parameters that can be produced from an argument slot.
pub trait FromArgument: Sized {
    /// Declared type used for option type inference.
    fn declared_type() -> DeclaredType;

    /// Converts the slot at `index` into the parameter.
    fn from_argument(index: usize, argument: Option<Argument>) -> Result<Self, ArgumentError>;
}

impl<T: ArgumentValue> FromArgument for Option<T> {
    fn declared_type() -> DeclaredType {
        T::DECLARED
    }

    fn from_argument(index: usize, argument: Option<Argument>) -> Result<Self, ArgumentError> {
        match argument {
            None => Ok(None),
            Some(argument) => T::extract(argument).map_err(|found| ArgumentError::TypeMismatch {
                index,
                expected: T::NAME,
                found,
            }),
        }
    }
}

macro_rules! impl_required_argument {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromArgument for $ty {
                fn declared_type() -> DeclaredType {
                    <$ty as ArgumentValue>::DECLARED
                }

                fn from_argument(
                    index: usize,
                    argument: Option<Argument>,
                ) -> Result<Self, ArgumentError> {
                    <Option<$ty> as FromArgument>::from_argument(index, argument)?
                        .ok_or(ArgumentError::Missing { index })
                }
            }
        )*
    };
}

impl_required_argument!(
    bool,
    i64,
    f64,
    String,
    User,
    Member,
    Channel,
    Role,
    Mentionable,
    Attachment,
    Argument,
);

impl ArgumentValue for bool {
    const DECLARED: DeclaredType = DeclaredType::Boolean;
    const NAME: &'static str = "boolean";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::Boolean(b) => Ok(Some(b)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for i64 {
    const DECLARED: DeclaredType = DeclaredType::Integer;
    const NAME: &'static str = "integer";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::Integer(n) => Ok(Some(n)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for f64 {
    const DECLARED: DeclaredType = DeclaredType::Number;
    const NAME: &'static str = "number";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::Number(n) => Ok(Some(n)),
            Argument::Integer(n) => Ok(Some(n as f64)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for String {
    const DECLARED: DeclaredType = DeclaredType::String;
    const NAME: &'static str = "string";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::String(s) => Ok(Some(s)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for User {
    const DECLARED: DeclaredType = DeclaredType::User;
    const NAME: &'static str = "user";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::User { user, .. } => Ok(Some(user)),
            Argument::Mentionable(Mentionable::User(user)) => Ok(Some(user)),
            Argument::Mentionable(Mentionable::Member(member)) => Ok(Some(member.user)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for Member {
    const DECLARED: DeclaredType = DeclaredType::Member;
    const NAME: &'static str = "member";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::User { member, .. } => Ok(member),
            Argument::Mentionable(Mentionable::Member(member)) => Ok(Some(member)),
            Argument::Mentionable(Mentionable::User(_)) => Ok(None),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for Channel {
    const DECLARED: DeclaredType = DeclaredType::Channel;
    const NAME: &'static str = "channel";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::Channel(channel) => Ok(Some(channel)),
            Argument::Mentionable(Mentionable::Channel(channel)) => Ok(Some(channel)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for Role {
    const DECLARED: DeclaredType = DeclaredType::Other("Role");
    const NAME: &'static str = "role";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::Role(role) => Ok(Some(role)),
            Argument::Mentionable(Mentionable::Role(role)) => Ok(Some(role)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for Mentionable {
    const DECLARED: DeclaredType = DeclaredType::Mentionable;
    const NAME: &'static str = "mentionable";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::Mentionable(m) => Ok(Some(m)),
            Argument::User {
                member: Some(member),
                ..
            } => Ok(Some(Mentionable::Member(member))),
            Argument::User { user, .. } => Ok(Some(Mentionable::User(user))),
            Argument::Role(role) => Ok(Some(Mentionable::Role(role))),
            Argument::Channel(channel) => Ok(Some(Mentionable::Channel(channel))),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for Attachment {
    const DECLARED: DeclaredType = DeclaredType::Attachment;
    const NAME: &'static str = "attachment";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        match argument {
            Argument::Attachment(attachment) => Ok(Some(attachment)),
            other => Err(other.kind_name()),
        }
    }
}

impl ArgumentValue for Argument {
    const DECLARED: DeclaredType = DeclaredType::Other("Argument");
    const NAME: &'static str = "argument";

    fn extract(argument: Argument) -> Result<Option<Self>, &'static str> {
        Ok(Some(argument))
    }
}

// ============================================================================
// InvocationArguments
// ============================================================================

/// The full argument list of one handler call.
///
/// Slot 0 is always the event; slots `1..=n` are the declared options in
/// declaration order, `None` where no value was supplied or coercion failed.
#[derive(Debug, Clone)]
pub struct InvocationArguments {
    event: CommandEvent,
    values: Vec<Option<Argument>>,
}

impl InvocationArguments {
    /// Creates an argument list.
    pub fn new(event: CommandEvent, values: Vec<Option<Argument>>) -> Self {
        Self { event, values }
    }

    /// Returns the event (argument 0).
    pub fn event(&self) -> &CommandEvent {
        &self.event
    }

    /// Returns the option slots.
    pub fn values(&self) -> &[Option<Argument>] {
        &self.values
    }

    /// Returns the option slot at `index` (zero-based, not counting the event).
    pub fn value(&self, index: usize) -> Option<&Argument> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Total argument count including the event.
    pub fn arity(&self) -> usize {
        self.values.len() + 1
    }

    /// Splits into the event and the option slots.
    pub fn into_parts(self) -> (CommandEvent, Vec<Option<Argument>>) {
        (self.event, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_table() {
        assert_eq!(
            DeclaredType::Boolean.infer_option_type(false),
            Some(OptionType::Boolean)
        );
        assert_eq!(
            DeclaredType::Member.infer_option_type(false),
            Some(OptionType::User)
        );
        assert_eq!(
            DeclaredType::Number.infer_option_type(false),
            Some(OptionType::Number)
        );
        assert_eq!(DeclaredType::Attachment.infer_option_type(false), None);
        assert_eq!(
            DeclaredType::Attachment.infer_option_type(true),
            Some(OptionType::Attachment)
        );
        assert_eq!(DeclaredType::Other("Role").infer_option_type(true), None);
    }

    #[test]
    fn test_optional_parameter_accepts_absence() {
        let value = <Option<String>>::from_argument(0, None).unwrap();
        assert_eq!(value, None);

        let value = <Option<i64>>::from_argument(1, Some(Argument::Integer(7))).unwrap();
        assert_eq!(value, Some(7));
    }

    #[test]
    fn test_required_parameter_rejects_absence() {
        let err = String::from_argument(2, None).unwrap_err();
        assert!(matches!(err, ArgumentError::Missing { index: 2 }));
    }

    #[test]
    fn test_type_mismatch() {
        let err = <Option<bool>>::from_argument(0, Some(Argument::String("yes".into())))
            .unwrap_err();
        assert!(matches!(
            err,
            ArgumentError::TypeMismatch {
                expected: "boolean",
                found: "string",
                ..
            }
        ));
    }

    #[test]
    fn test_member_view_of_user() {
        let user = User::new(1, "alice");
        let outside = Argument::User {
            user: user.clone(),
            member: None,
        };
        assert_eq!(<Option<Member>>::from_argument(0, Some(outside)).unwrap(), None);

        let member = Member::new(user.clone(), 10);
        let inside = Argument::User {
            user,
            member: Some(member.clone()),
        };
        assert_eq!(Member::from_argument(0, Some(inside.clone())).unwrap(), member);
        assert_eq!(
            Mentionable::from_argument(0, Some(inside)).unwrap(),
            Mentionable::Member(member)
        );
    }

    #[test]
    fn test_declared_types() {
        assert_eq!(<Option<User>>::declared_type(), DeclaredType::User);
        assert_eq!(<Attachment>::declared_type(), DeclaredType::Attachment);
        assert_eq!(
            <Option<Argument>>::declared_type(),
            DeclaredType::Other("Argument")
        );
    }
}
