//! Tracks which users have a conversation running in which channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::errors::ConversationError;
use crate::domain::foundation::{ChannelId, ConversationId, UserId};

type Key = (UserId, ChannelId);

/// At most one live conversation per (user, channel).
///
/// Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct ConversationRegistry {
    active: Arc<Mutex<HashMap<Key, ConversationId>>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the (user, channel) slot for `conversation`.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` if the user already has a conversation in the channel.
    pub fn register(
        &self,
        user: &UserId,
        channel: &ChannelId,
        conversation: ConversationId,
    ) -> Result<ActiveGuard, ConversationError> {
        let key = (user.clone(), channel.clone());
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.contains_key(&key) {
            return Err(ConversationError::AlreadyActive {
                user: user.clone(),
                channel: channel.clone(),
            });
        }
        active.insert(key.clone(), conversation);
        Ok(ActiveGuard {
            registry: Arc::clone(&self.active),
            key,
            conversation,
        })
    }

    pub fn active_conversation(&self, user: &UserId, channel: &ChannelId) -> Option<ConversationId> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(user.clone(), channel.clone()))
            .copied()
    }

    pub fn active_count(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Releases its registry slot when dropped.
pub struct ActiveGuard {
    registry: Arc<Mutex<HashMap<Key, ConversationId>>>,
    key: Key,
    conversation: ConversationId,
}

impl ActiveGuard {
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let mut active = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        if active.get(&self.key) == Some(&self.conversation) {
            active.remove(&self.key);
        }
    }
}
