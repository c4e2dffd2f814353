//! Button listener: one button per option.

use super::lifecycle::{MAX_CONTROLS_PER_ROW, MAX_CONTROL_ROWS};
use super::modality::{option_for_control, typed_input, InputModality, RawInput, RoundScope};
use crate::application::errors::ConversationError;
use crate::domain::conversation::{
    ButtonStyle, Control, ConversationState, MatchPolicy, OutgoingMessage,
};
use crate::ports::{InteractionEvent, InteractionKind, InteractionPayload};

const RESPONSE_KINDS: &[InteractionKind] =
    &[InteractionKind::ControlActivated, InteractionKind::MessageSent];

/// Renders options as buttons laid out in rows of five.
///
/// Typing an option works as well as clicking it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonModality;

impl ButtonModality {
    pub const MAX_OPTIONS: usize = MAX_CONTROLS_PER_ROW * MAX_CONTROL_ROWS;
}

impl InputModality for ButtonModality {
    fn name(&self) -> &'static str {
        "button"
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
        Ok(())
    }

    fn render(
        &self,
        state: &ConversationState,
        scope: &RoundScope,
        policy: &MatchPolicy,
    ) -> OutgoingMessage {
        let buttons: Vec<Control> = state
            .options()
            .iter()
            .enumerate()
            .map(|(index, option)| Control::Button {
                id: scope.control_id(index),
                label: option.clone(),
                style: if policy.is_back(option) {
                    ButtonStyle::Secondary
                } else {
                    ButtonStyle::Primary
                },
            })
            .collect();

        buttons
            .chunks(MAX_CONTROLS_PER_ROW)
            .fold(OutgoingMessage::plain(state.prompt().clone()), |message, row| {
                message.with_row(row.to_vec())
            })
    }

    fn response_kinds(&self) -> &'static [InteractionKind] {
        RESPONSE_KINDS
    }

    fn extract(
        &self,
        event: &InteractionEvent,
        state: &ConversationState,
        scope: &RoundScope,
        policy: &MatchPolicy,
    ) -> Option<RawInput> {
        match &event.payload {
            InteractionPayload::Control { control_id } => {
                option_for_control(control_id, state, scope).map(RawInput::new)
            }
            InteractionPayload::Message { .. } => typed_input(event, policy),
            _ => None,
        }
    }
}
