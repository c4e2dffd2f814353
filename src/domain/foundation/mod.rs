//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, lifecycle helpers and error types
//! that the conversation engine is built on.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ChannelId, ConversationId, MessageId, SubscriptionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
