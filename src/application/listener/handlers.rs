//! Event handlers a round registers on the interaction bus.

use async_trait::async_trait;
use std::sync::Arc;

use super::modality::{InputModality, RoundScope};
use super::slot::{RoundOutcome, RoundSlot};
use crate::domain::conversation::{ConversationState, MatchOutcome, MatchPolicy, ResponseMatcher};
use crate::domain::foundation::DomainError;
use crate::ports::{InteractionEvent, InteractionHandler};

/// Turns matching events into the round's response.
///
/// Holds a read-only snapshot of the round's state; the live state is only
/// touched by the listener after the slot resolves.
pub(crate) struct ResponseHandler {
    pub(crate) modality: Arc<dyn InputModality>,
    pub(crate) snapshot: Arc<ConversationState>,
    pub(crate) scope: RoundScope,
    pub(crate) policy: Arc<MatchPolicy>,
    pub(crate) slot: Arc<RoundSlot>,
}

#[async_trait]
impl InteractionHandler for ResponseHandler {
    async fn handle(&self, event: InteractionEvent) -> Result<(), DomainError> {
        if self.slot.is_resolved() {
            return Ok(());
        }
        let Some(raw) = self
            .modality
            .extract(&event, &self.snapshot, &self.scope, &self.policy)
        else {
            return Ok(());
        };

        match ResponseMatcher::accept(&raw.value, self.snapshot.options(), &self.policy) {
            MatchOutcome::Accepted(response) => {
                let won = self.slot.resolve(RoundOutcome::Accepted {
                    response,
                    responder: event.user.clone(),
                    note: raw.note,
                });
                if !won {
                    tracing::trace!(
                        listener = self.modality.name(),
                        round = self.scope.round,
                        "Response arrived after round resolved"
                    );
                }
            }
            MatchOutcome::Rejected => {
                tracing::trace!(
                    listener = self.modality.name(),
                    round = self.scope.round,
                    "Input rejected: {:?}",
                    raw.value
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ResponseHandler"
    }
}

/// Ends the round when the cancel affordance or keyword is used.
pub(crate) struct CancelHandler {
    pub(crate) slot: Arc<RoundSlot>,
}

#[async_trait]
impl InteractionHandler for CancelHandler {
    async fn handle(&self, event: InteractionEvent) -> Result<(), DomainError> {
        self.slot.resolve(RoundOutcome::Cancelled { by: event.user });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CancelHandler"
    }
}
