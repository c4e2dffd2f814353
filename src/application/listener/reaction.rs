//! Reaction listener: options are emoji added under the prompt.

use super::modality::{CancelAffordance, InputModality, RawInput, RoundScope};
use crate::application::errors::ConversationError;
use crate::domain::conversation::{ConversationState, MatchPolicy, OutgoingMessage, RoundNote};
use crate::ports::{InteractionEvent, InteractionKind, InteractionPayload};

const RESPONSE_KINDS: &[InteractionKind] =
    &[InteractionKind::ReactionAdded, InteractionKind::ReactionRemoved];

/// Emoji shown for the back option.
pub const BACK_EMOJI: &str = "⬅️";

/// Emoji that cancels the conversation.
pub const CANCEL_EMOJI: &str = "❌";

/// Presents each option as a reaction on the prompt message.
///
/// Both adding and removing a reaction count as a response; the state's
/// notes tell the two apart. Anyone in the channel may answer unless the
/// policy says otherwise, which suits polls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionModality;

impl ReactionModality {
    pub const MAX_OPTIONS: usize = 20;

    fn emoji_for(option: &str, policy: &MatchPolicy) -> String {
        if policy.is_back(option) {
            BACK_EMOJI.to_string()
        } else {
            option.to_string()
        }
    }
}

impl InputModality for ReactionModality {
    fn name(&self) -> &'static str {
        "reaction"
    }

    fn validate(&self, state: &ConversationState) -> Result<(), ConversationError> {
        let count = state.options().len();
        if count > Self::MAX_OPTIONS {
            return Err(ConversationError::TooManyOptions {
                listener: self.name(),
                count,
                max: Self::MAX_OPTIONS,
            });
        }
        if let Some(blank) = state.options().iter().find(|o| o.trim().is_empty()) {
            return Err(ConversationError::InvalidPrompt {
                listener: self.name(),
                reason: format!("option {:?} is not an emoji", blank),
            });
        }
        Ok(())
    }

    fn render(
        &self,
        state: &ConversationState,
        _scope: &RoundScope,
        _policy: &MatchPolicy,
    ) -> OutgoingMessage {
        OutgoingMessage::plain(state.prompt().clone())
    }

    fn reactions(&self, state: &ConversationState, policy: &MatchPolicy) -> Vec<String> {
        state
            .options()
            .iter()
            .map(|option| Self::emoji_for(option, policy))
            .collect()
    }

    fn response_kinds(&self) -> &'static [InteractionKind] {
        RESPONSE_KINDS
    }

    fn extract(
        &self,
        event: &InteractionEvent,
        state: &ConversationState,
        _scope: &RoundScope,
        policy: &MatchPolicy,
    ) -> Option<RawInput> {
        let InteractionPayload::Reaction { emoji } = &event.payload else {
            return None;
        };
        if emoji == CANCEL_EMOJI {
            return None;
        }
        let note = match event.kind {
            InteractionKind::ReactionRemoved => RoundNote::ReactionRemoved,
            _ => RoundNote::ReactionAdded,
        };
        let value = if emoji == BACK_EMOJI && state.has_option(&policy.back_option) {
            policy.back_option.clone()
        } else {
            emoji.clone()
        };
        Some(RawInput::noted(value, note))
    }

    fn accepts_anyone_by_default(&self) -> bool {
        true
    }

    fn echoes_decorations(&self) -> bool {
        true
    }

    fn cancel_affordance(&self) -> CancelAffordance {
        CancelAffordance::Reaction(CANCEL_EMOJI.to_string())
    }
}
