//! DisplayGateway port - Interface for showing prompts on the chat platform.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::conversation_context::InteractionToken;
use crate::domain::conversation::OutgoingMessage;
use crate::domain::foundation::{ChannelId, DomainError, MessageId};

/// Reference to a message the bot has sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub channel: ChannelId,
    pub message: MessageId,
}

/// Port for sending and editing displayable messages.
///
/// Every method may fail with a transport error (`ErrorCode::DisplayFailed`). Callers in the conversation engine
/// log these and keep going; a failed edit leaves a stale prompt on screen.
#[async_trait]
pub trait DisplayGateway: Send + Sync {
    async fn send(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, DomainError>;

    /// Replaces content and controls of an existing message.
    async fn edit(
        &self,
        handle: &MessageHandle,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, DomainError>;

    async fn delete(&self, handle: &MessageHandle) -> Result<(), DomainError>;

    async fn add_reaction(&self, handle: &MessageHandle, emoji: &str) -> Result<(), DomainError>;

    async fn clear_reactions(&self, handle: &MessageHandle) -> Result<(), DomainError>;

    /// Acknowledges a command interaction that asked for deferred handling.
    async fn acknowledge(&self, token: &InteractionToken) -> Result<(), DomainError>;
}
