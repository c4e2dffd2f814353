//! Identity context of a conversation: who started it and where.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, UserId, ValidationError};

/// Opaque token of a command interaction awaiting acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionToken(String);

impl InteractionToken {
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ValidationError::empty_field("interaction_token"));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Initiating user, reply channel and pending acknowledgement, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    pub owner: UserId,
    pub channel: ChannelId,
    /// Set for slash-command style triggers that must be acknowledged
    /// before the first prompt is sent.
    pub deferred: Option<InteractionToken>,
    /// The bot's own account; its events (e.g. reactions it adds while
    /// rendering) never count as responses.
    pub bot: Option<UserId>,
}

impl ConversationContext {
    pub fn new(owner: UserId, channel: ChannelId) -> Self {
        Self {
            owner,
            channel,
            deferred: None,
            bot: None,
        }
    }

    pub fn with_deferred(mut self, token: InteractionToken) -> Self {
        self.deferred = Some(token);
        self
    }

    pub fn with_bot_user(mut self, bot: UserId) -> Self {
        self.bot = Some(bot);
        self
    }

    pub fn is_owner(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    pub fn is_bot(&self, user: &UserId) -> bool {
        self.bot.as_ref() == Some(user)
    }
}
