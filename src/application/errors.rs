//! Errors surfaced to flow code by listeners and controllers.

use thiserror::Error;

use crate::domain::foundation::{ChannelId, DomainError, ErrorCode, UserId, ValidationError};

/// Failures a conversation can report to the code driving it.
///
/// Transport problems during a round are logged, not returned; only
/// problems the caller must fix (bad prompts, misuse of an ended
/// conversation) show up here.
#[derive(Debug, Clone, Error)]
pub enum ConversationError {
    /// The prompt cannot be rendered by the chosen listener.
    #[error("Invalid prompt for {listener} listener: {reason}")]
    InvalidPrompt {
        listener: &'static str,
        reason: String,
    },

    /// More options than the listener can display.
    #[error("Too many options for {listener} listener: {count} (max {max})")]
    TooManyOptions {
        listener: &'static str,
        count: usize,
        max: usize,
    },

    /// Anyone may answer, but the bot's own echoed events cannot be told
    /// apart from answers because the context has no bot user.
    #[error("The {listener} listener accepts anyone and needs the bot user on the context")]
    MissingBotUser { listener: &'static str },

    /// The conversation has already ended.
    #[error("Conversation is no longer active")]
    Inactive,

    /// The user already has a wizard running in this channel.
    #[error("User {user} already has an active conversation in {channel}")]
    AlreadyActive { user: UserId, channel: ChannelId },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl From<ConversationError> for DomainError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::Domain(inner) => inner,
            ConversationError::Inactive => {
                DomainError::new(ErrorCode::ConversationInactive, err.to_string())
            }
            ConversationError::AlreadyActive { .. } => {
                DomainError::new(ErrorCode::ConversationAlreadyActive, err.to_string())
            }
            other => DomainError::new(ErrorCode::ValidationFailed, other.to_string()),
        }
    }
}
