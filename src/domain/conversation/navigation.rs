//! Window navigation: controller lifecycle and the back-stack.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a conversation controller.
///
/// - `Idle`: created, no window shown yet
/// - `Active`: windows are being shown
/// - `Ended`: terminated by the flow, the user, or a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerStatus {
    #[default]
    Idle,
    Active,
    Ended,
}

impl ControllerStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl StateMachine for ControllerStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ControllerStatus::*;
        matches!((self, target), (Idle, Active) | (Idle, Ended) | (Active, Ended))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ControllerStatus::*;
        match self {
            Idle => vec![Active, Ended],
            Active => vec![Ended],
            Ended => vec![],
        }
    }
}

/// Navigation history of previously shown windows.
///
/// Each entry is the full window value, so popping it replays the window
/// with the arguments it was originally shown with. When the stack grows
/// past its capacity the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct BackStack<W> {
    entries: VecDeque<W>,
    capacity: usize,
}

impl<W> BackStack<W> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Pushes a window. Returns the entry evicted to stay within capacity.
    pub fn push(&mut self, window: W) -> Option<W> {
        self.entries.push_back(window);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn pop(&mut self) -> Option<W> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&W> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
