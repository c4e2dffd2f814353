//! Menu listener: a single dropdown listing every option.

use super::modality::{typed_input, InputModality, RawInput, RoundScope};
use crate::application::errors::ConversationError;
use crate::domain::conversation::{
    Control, ConversationState, MatchPolicy, MenuChoice, OutgoingMessage,
};
use crate::ports::{InteractionEvent, InteractionKind, InteractionPayload};

const RESPONSE_KINDS: &[InteractionKind] =
    &[InteractionKind::MenuSelected, InteractionKind::MessageSent];

const MENU_SUFFIX: &str = "menu";

/// Renders options as one dropdown. Choice values carry the option index,
/// so labels may repeat or contain anything.
#[derive(Debug, Clone)]
pub struct MenuModality {
    placeholder: String,
}

impl MenuModality {
    pub const MAX_OPTIONS: usize = 25;

    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }
}

impl Default for MenuModality {
    fn default() -> Self {
        Self::new("Choose an option")
    }
}

impl InputModality for MenuModality {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn validate(&self, state: &ConversationState) -> Result<(), ConversationError> {
        let count = state.options().len();
        if count == 0 {
            return Err(ConversationError::InvalidPrompt {
                listener: self.name(),
                reason: "a menu needs at least one option".to_string(),
            });
        }
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
        _policy: &MatchPolicy,
    ) -> OutgoingMessage {
        let choices = state
            .options()
            .iter()
            .enumerate()
            .map(|(index, option)| MenuChoice {
                label: option.clone(),
                value: index.to_string(),
            })
            .collect();

        OutgoingMessage::plain(state.prompt().clone()).with_row(vec![Control::Menu {
            id: scope.control_id(MENU_SUFFIX),
            placeholder: self.placeholder.clone(),
            choices,
        }])
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
            InteractionPayload::Menu { menu_id, values } => {
                if scope.suffix(menu_id) != Some(MENU_SUFFIX) {
                    return None;
                }
                let index: usize = values.first()?.parse().ok()?;
                state.options().get(index).cloned().map(RawInput::new)
            }
            InteractionPayload::Message { .. } => typed_input(event, policy),
            _ => None,
        }
    }
}
