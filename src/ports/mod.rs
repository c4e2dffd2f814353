//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the conversation engine and the chat platform. Adapters implement them.
//!
//! - `DisplayGateway` - Send, edit and delete prompt messages
//! - `InteractionBus` - Subscribe to inbound clicks, selections, reactions, messages
//! - `ConversationContext` - Initiating user, reply channel, deferred acknowledgement

mod conversation_context;
mod display_gateway;
mod interaction_bus;

pub use conversation_context::{ConversationContext, InteractionToken};
pub use display_gateway::{DisplayGateway, MessageHandle};
pub use interaction_bus::{
    Attachment, InteractionBus, InteractionEvent, InteractionFilter, InteractionHandler,
    InteractionKind, InteractionPayload, Subscription,
};
