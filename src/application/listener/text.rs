//! Freeform text listener.

use super::modality::{typed_input, CancelAffordance, InputModality, RawInput, RoundScope};
use crate::domain::conversation::{ConversationState, MatchPolicy, OutgoingMessage, RoundNote};
use crate::ports::{InteractionEvent, InteractionKind, InteractionPayload};

const RESPONSE_KINDS: &[InteractionKind] = &[InteractionKind::MessageSent];

/// Lists options inline and waits for a typed reply.
///
/// When a reply carries an attachment, the attachment URL is the response
/// instead of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextModality;

impl InputModality for TextModality {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(
        &self,
        state: &ConversationState,
        _scope: &RoundScope,
        _policy: &MatchPolicy,
    ) -> OutgoingMessage {
        OutgoingMessage::plain(state.prompt().clone().with_options_listed(state.options()))
    }

    fn response_kinds(&self) -> &'static [InteractionKind] {
        RESPONSE_KINDS
    }

    fn extract(
        &self,
        event: &InteractionEvent,
        _state: &ConversationState,
        _scope: &RoundScope,
        policy: &MatchPolicy,
    ) -> Option<RawInput> {
        match &event.payload {
            InteractionPayload::Message { attachments, .. } if !attachments.is_empty() => {
                let first = attachments.first()?;
                Some(RawInput::noted(first.url.clone(), RoundNote::Attachment))
            }
            _ => typed_input(event, policy),
        }
    }

    fn cancel_affordance(&self) -> CancelAffordance {
        CancelAffordance::Hint
    }
}
