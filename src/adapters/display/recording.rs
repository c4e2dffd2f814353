//! Recording display gateway.
//!
//! Keeps every call in memory instead of talking to a chat platform.
//! Sends and edits can be switched to fail to exercise transport error
//! handling.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::conversation::OutgoingMessage;
use crate::domain::foundation::{ChannelId, DomainError, MessageId};
use crate::ports::{DisplayGateway, InteractionToken, MessageHandle};

/// One call made against the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Sent {
        handle: MessageHandle,
        message: OutgoingMessage,
    },
    Edited {
        handle: MessageHandle,
        message: OutgoingMessage,
    },
    Deleted(MessageHandle),
    ReactionAdded {
        handle: MessageHandle,
        emoji: String,
    },
    ReactionsCleared(MessageHandle),
    Acknowledged(InteractionToken),
}

#[derive(Default)]
struct Screen {
    calls: Vec<DisplayCall>,
    live: HashMap<MessageHandle, OutgoingMessage>,
    reactions: HashMap<MessageHandle, Vec<String>>,
}

/// In-memory `DisplayGateway` that records what would have been shown.
pub struct RecordingDisplay {
    screen: Mutex<Screen>,
    next_id: AtomicU64,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            screen: Mutex::new(Screen::default()),
            next_id: AtomicU64::new(1),
            fail_sends: AtomicBool::new(false),
            fail_edits: AtomicBool::new(false),
        }
    }

    /// Makes subsequent `send` calls fail with a transport error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `edit` calls fail with a transport error.
    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: DisplayCall) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        match &call {
            DisplayCall::Sent { handle, message } | DisplayCall::Edited { handle, message } => {
                screen.live.insert(handle.clone(), message.clone());
            }
            DisplayCall::Deleted(handle) => {
                screen.live.remove(handle);
                screen.reactions.remove(handle);
            }
            DisplayCall::ReactionAdded { handle, emoji } => {
                screen
                    .reactions
                    .entry(handle.clone())
                    .or_default()
                    .push(emoji.clone());
            }
            DisplayCall::ReactionsCleared(handle) => {
                screen.reactions.remove(handle);
            }
            DisplayCall::Acknowledged(_) => {}
        }
        screen.calls.push(call);
    }

    // === Test Helpers ===

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .clone()
    }

    pub fn sent_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DisplayCall::Sent { .. }))
            .count()
    }

    pub fn edit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DisplayCall::Edited { .. }))
            .count()
    }

    /// Current content of a message, `None` once deleted or never sent.
    pub fn live_message(&self, handle: &MessageHandle) -> Option<OutgoingMessage> {
        self.screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .live
            .get(handle)
            .cloned()
    }

    /// The handle of the most recently sent message.
    pub fn last_sent(&self) -> Option<MessageHandle> {
        self.calls().into_iter().rev().find_map(|c| match c {
            DisplayCall::Sent { handle, .. } => Some(handle),
            _ => None,
        })
    }

    /// Content of the most recent send or edit.
    pub fn last_rendered(&self) -> Option<OutgoingMessage> {
        self.calls().into_iter().rev().find_map(|c| match c {
            DisplayCall::Sent { message, .. } | DisplayCall::Edited { message, .. } => {
                Some(message)
            }
            _ => None,
        })
    }

    pub fn reactions(&self, handle: &MessageHandle) -> Vec<String> {
        self.screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reactions
            .get(handle)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisplayGateway for RecordingDisplay {
    async fn send(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, DomainError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DomainError::display("send rejected by gateway"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = MessageHandle {
            channel: channel.clone(),
            message: MessageId::new(format!("msg-{}", id))?,
        };
        self.record(DisplayCall::Sent {
            handle: handle.clone(),
            message: message.clone(),
        });
        Ok(handle)
    }

    async fn edit(
        &self,
        handle: &MessageHandle,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, DomainError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(DomainError::display("edit rejected by gateway"));
        }
        self.record(DisplayCall::Edited {
            handle: handle.clone(),
            message: message.clone(),
        });
        Ok(handle.clone())
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), DomainError> {
        self.record(DisplayCall::Deleted(handle.clone()));
        Ok(())
    }

    async fn add_reaction(&self, handle: &MessageHandle, emoji: &str) -> Result<(), DomainError> {
        self.record(DisplayCall::ReactionAdded {
            handle: handle.clone(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn clear_reactions(&self, handle: &MessageHandle) -> Result<(), DomainError> {
        self.record(DisplayCall::ReactionsCleared(handle.clone()));
        Ok(())
    }

    async fn acknowledge(&self, token: &InteractionToken) -> Result<(), DomainError> {
        self.record(DisplayCall::Acknowledged(token.clone()));
        Ok(())
    }
}
