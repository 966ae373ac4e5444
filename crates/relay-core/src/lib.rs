//! # Relay Core
//!
//! The platform model consumed by the Relay command framework.
//!
//! Relay does not talk to a chat platform itself. A platform library owns the
//! gateway session and hands Relay its events; Relay hands back registration
//! payloads and replies through the [`Bot`] handle. This crate pins down the
//! shape of that boundary:
//!
//! - **Entities**: [`User`], [`Member`], [`Channel`], [`Role`], [`Mentionable`], [`Attachment`]
//! - **Options**: [`OptionType`] and the lossy [`OptionMapping`] accessors
//! - **Events**: [`SlashInteraction`], [`TextMessage`], [`PlatformEvent`], [`SourceEvent`]
//! - **Registration**: [`CommandData`] and its parts, [`Locale`], [`LocalizationMap`]
//! - **Bot handle**: [`Bot`], [`BoxedBot`], [`ApiError`]
//!
//! ```text
//! ┌──────────────────┐  PlatformEvent  ┌─────────┐
//! │ platform library │────────────────▶│  relay  │
//! │  (gateway, REST) │◀────────────────│         │
//! └──────────────────┘ CommandData,    └─────────┘
//!                      replies via Bot
//! ```

pub mod bot;
pub mod entity;
pub mod error;
pub mod event;
pub mod option;
pub mod registration;

pub use bot::{Bot, BoxedBot, downcast_bot};
pub use entity::{Attachment, Channel, ChannelKind, Member, Mentionable, Role, Snowflake, User};
pub use error::{ApiError, ApiResult};
pub use event::{PlatformEvent, SlashInteraction, SourceEvent, TextMessage};
pub use option::{OptionMapping, OptionType, OptionValue};
pub use registration::{
    Choice, ChoiceValue, CommandData, Locale, LocalizationMap, OptionData, SubcommandData,
    SubcommandGroupData,
};
