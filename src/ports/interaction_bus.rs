//! InteractionBus port - Interface for subscribing to inbound chat events.
//!
//! The chat transport delivers button clicks, menu selections, reactions and
//! messages on its own worker tasks. Listeners register short-lived
//! subscriptions for the duration of a single round and dispose them when
//! the round resolves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{
    ChannelId, DomainError, MessageId, SubscriptionId, Timestamp, UserId,
};

/// Class of inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    ControlActivated,
    MenuSelected,
    ReactionAdded,
    ReactionRemoved,
    MessageSent,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractionKind::ControlActivated => "control_activated",
            InteractionKind::MenuSelected => "menu_selected",
            InteractionKind::ReactionAdded => "reaction_added",
            InteractionKind::ReactionRemoved => "reaction_removed",
            InteractionKind::MessageSent => "message_sent",
        };
        write!(f, "{}", s)
    }
}

/// File uploaded alongside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

/// Kind-specific data of an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    Control { control_id: String },
    Menu { menu_id: String, values: Vec<String> },
    Reaction { emoji: String },
    Message { text: String, attachments: Vec<Attachment> },
}

/// One inbound event from the chat gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub user: UserId,
    pub channel: ChannelId,
    /// Message the interaction targets; `None` for freshly sent messages.
    pub message: Option<MessageId>,
    pub payload: InteractionPayload,
    pub received_at: Timestamp,
}

impl InteractionEvent {
    fn build(
        kind: InteractionKind,
        user: UserId,
        channel: ChannelId,
        message: Option<MessageId>,
        payload: InteractionPayload,
    ) -> Self {
        Self {
            kind,
            user,
            channel,
            message,
            payload,
            received_at: Timestamp::now(),
        }
    }

    /// A button on `message` was clicked.
    pub fn control_activated(
        user: UserId,
        channel: ChannelId,
        message: MessageId,
        control_id: impl Into<String>,
    ) -> Self {
        Self::build(
            InteractionKind::ControlActivated,
            user,
            channel,
            Some(message),
            InteractionPayload::Control {
                control_id: control_id.into(),
            },
        )
    }

    /// Values were picked from a dropdown on `message`.
    pub fn menu_selected(
        user: UserId,
        channel: ChannelId,
        message: MessageId,
        menu_id: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self::build(
            InteractionKind::MenuSelected,
            user,
            channel,
            Some(message),
            InteractionPayload::Menu {
                menu_id: menu_id.into(),
                values,
            },
        )
    }

    /// A reaction was added to (or removed from) `message`.
    pub fn reaction(
        added: bool,
        user: UserId,
        channel: ChannelId,
        message: MessageId,
        emoji: impl Into<String>,
    ) -> Self {
        let kind = if added {
            InteractionKind::ReactionAdded
        } else {
            InteractionKind::ReactionRemoved
        };
        Self::build(
            kind,
            user,
            channel,
            Some(message),
            InteractionPayload::Reaction {
                emoji: emoji.into(),
            },
        )
    }

    /// A message was posted in `channel`.
    pub fn message_sent(user: UserId, channel: ChannelId, text: impl Into<String>) -> Self {
        Self::build(
            InteractionKind::MessageSent,
            user,
            channel,
            None,
            InteractionPayload::Message {
                text: text.into(),
                attachments: Vec::new(),
            },
        )
    }

    /// Adds an attachment to a message event; no-op for other kinds.
    pub fn with_attachment(mut self, filename: impl Into<String>, url: impl Into<String>) -> Self {
        if let InteractionPayload::Message { attachments, .. } = &mut self.payload {
            attachments.push(Attachment {
                filename: filename.into(),
                url: url.into(),
            });
        }
        self
    }

    /// Message text, if this is a message event.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            InteractionPayload::Message { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Predicate deciding whether a subscription sees an event.
pub type InteractionFilter = Arc<dyn Fn(&InteractionEvent) -> bool + Send + Sync>;

/// Handler invoked for events that pass a subscription's filter.
///
/// Called from the transport's worker tasks, possibly concurrently with
/// other handlers of the same round.
#[async_trait]
pub trait InteractionHandler: Send + Sync {
    async fn handle(&self, event: InteractionEvent) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// A live registration on the bus.
///
/// `dispose` consumes the subscription, so it can run at most once.
pub trait Subscription: Send + Sync {
    fn id(&self) -> SubscriptionId;

    fn kind(&self) -> InteractionKind;

    /// Stops delivery. After this returns the handler receives no new events.
    fn dispose(self: Box<Self>);
}

/// Port for registering interest in inbound interactions.
///
/// # Example
///
/// ```ignore
/// let sub = bus.subscribe(
///     InteractionKind::MessageSent,
///     Arc::new(move |e| e.channel == channel),
///     handler,
/// )?;
/// // ... round runs ...
/// sub.dispose();
/// ```
pub trait InteractionBus: Send + Sync {
    fn subscribe(
        &self,
        kind: InteractionKind,
        filter: InteractionFilter,
        handler: Arc<dyn InteractionHandler>,
    ) -> Result<Box<dyn Subscription>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn channel() -> ChannelId {
        ChannelId::new("c1").unwrap()
    }

    #[allow(dead_code)]
    fn assert_bus_object_safe(_: &dyn InteractionBus) {}

    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn InteractionHandler) {}

    #[test]
    fn reaction_constructor_sets_kind() {
        let msg = MessageId::new("m1").unwrap();
        let added = InteractionEvent::reaction(true, user(), channel(), msg.clone(), "👍");
        let removed = InteractionEvent::reaction(false, user(), channel(), msg, "👍");
        assert_eq!(added.kind, InteractionKind::ReactionAdded);
        assert_eq!(removed.kind, InteractionKind::ReactionRemoved);
    }

    #[test]
    fn attachment_only_applies_to_messages() {
        let msg = MessageId::new("m1").unwrap();
        let click = InteractionEvent::control_activated(user(), channel(), msg, "x")
            .with_attachment("a.png", "https://cdn/a.png");
        assert_eq!(
            click.payload,
            InteractionPayload::Control {
                control_id: "x".into()
            }
        );

        let message = InteractionEvent::message_sent(user(), channel(), "look")
            .with_attachment("a.png", "https://cdn/a.png");
        match message.payload {
            InteractionPayload::Message { attachments, .. } => assert_eq!(attachments.len(), 1),
            _ => panic!("expected message payload"),
        }
    }

    #[test]
    fn text_accessor() {
        let event = InteractionEvent::message_sent(user(), channel(), "hello");
        assert_eq!(event.text(), Some("hello"));
    }

    #[test]
    fn kind_displays_snake_case() {
        assert_eq!(InteractionKind::MenuSelected.to_string(), "menu_selected");
    }
}
