//! Single-writer handoff between event handlers and the waiting round.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

use crate::domain::conversation::RoundNote;
use crate::domain::foundation::UserId;

/// How a round was resolved by an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RoundOutcome {
    Accepted {
        response: String,
        responder: UserId,
        note: Option<RoundNote>,
    },
    Cancelled {
        by: UserId,
    },
}

/// Take-once slot. The first `resolve` wins; every later call is a no-op
/// that reports it lost.
pub(crate) struct RoundSlot {
    sender: Mutex<Option<oneshot::Sender<RoundOutcome>>>,
}

impl RoundSlot {
    pub(crate) fn new() -> (Arc<Self>, oneshot::Receiver<RoundOutcome>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Self {
            sender: Mutex::new(Some(tx)),
        });
        (slot, rx)
    }

    /// Hands the outcome to the waiting round. Returns false if another
    /// writer got there first or the round stopped waiting.
    pub(crate) fn resolve(&self, outcome: RoundOutcome) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Closes the slot without an outcome, used when the round times out.
    pub(crate) fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
