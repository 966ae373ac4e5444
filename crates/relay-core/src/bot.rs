//! The bot handle supplied by the platform library.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::entity::User;
use crate::error::ApiResult;
use crate::event::SourceEvent;
use crate::registration::CommandData;

/// A connected bot session.
///
/// The command layer only needs three things from it: its own identity (for
/// mention triggers), bulk command registration, and replies.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns the bot's own account.
    fn self_user(&self) -> &User;

    /// Replaces the globally registered slash commands.
    async fn update_commands(&self, commands: Vec<CommandData>) -> ApiResult<()>;

    /// Replies to the event a command was invoked from.
    ///
    /// `ephemeral` replies are visible to the invoking user only; platforms
    /// without that notion send a normal reply.
    async fn reply(&self, source: &SourceEvent, content: &str, ephemeral: bool) -> ApiResult<()>;

    /// Converts the bot to `Arc<dyn Any>` for downcasting.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Type-erased bot handle.
pub type BoxedBot = Arc<dyn Bot>;

/// Downcasts a boxed bot to a concrete implementation.
pub fn downcast_bot<B: Bot + 'static>(bot: &BoxedBot) -> Option<Arc<B>> {
    Arc::clone(bot).as_any().downcast::<B>().ok()
}
