//! Input listeners.
//!
//! An [`InputListener`] runs prompt/response rounds. The shared lifecycle
//! lives in `lifecycle`; each variant is an [`InputModality`]:
//!
//! - `button` - one button per option (max 25)
//! - `menu` - one dropdown (1..=25 options)
//! - `reaction` - one emoji per option (max 20), anyone may answer
//! - `text` - options listed inline, typed replies and attachments

mod button;
mod handlers;
mod lifecycle;
mod menu;
mod modality;
mod reaction;
mod slot;
mod text;

pub use button::ButtonModality;
pub use lifecycle::{InputListener, MAX_CONTROLS_PER_ROW, MAX_CONTROL_ROWS};
pub use menu::MenuModality;
pub use modality::{CancelAffordance, InputModality, RawInput, RoundScope};
pub use reaction::{ReactionModality, BACK_EMOJI, CANCEL_EMOJI};
pub use text::TextModality;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::conversation::MatchPolicy;
use crate::domain::foundation::ValidationError;
use crate::ports::{ConversationContext, DisplayGateway, InteractionBus};

/// Built-in listener variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerKind {
    #[default]
    Button,
    Menu,
    Reaction,
    Text,
}

impl ListenerKind {
    pub fn modality(&self) -> Arc<dyn InputModality> {
        match self {
            ListenerKind::Button => Arc::new(ButtonModality),
            ListenerKind::Menu => Arc::new(MenuModality::default()),
            ListenerKind::Reaction => Arc::new(ReactionModality),
            ListenerKind::Text => Arc::new(TextModality),
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ListenerKind::Button => "button",
            ListenerKind::Menu => "menu",
            ListenerKind::Reaction => "reaction",
            ListenerKind::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ListenerKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "button" => Ok(ListenerKind::Button),
            "menu" => Ok(ListenerKind::Menu),
            "reaction" => Ok(ListenerKind::Reaction),
            "text" => Ok(ListenerKind::Text),
            other => Err(ValidationError::invalid_format(
                "listener_kind",
                format!("unknown listener '{}'", other),
            )),
        }
    }
}

impl InputListener {
    pub fn for_kind(
        kind: ListenerKind,
        display: Arc<dyn DisplayGateway>,
        bus: Arc<dyn InteractionBus>,
        context: ConversationContext,
        policy: MatchPolicy,
    ) -> Self {
        Self::new(kind.modality(), display, bus, context, policy)
    }

    pub fn buttons(
        display: Arc<dyn DisplayGateway>,
        bus: Arc<dyn InteractionBus>,
        context: ConversationContext,
        policy: MatchPolicy,
    ) -> Self {
        Self::for_kind(ListenerKind::Button, display, bus, context, policy)
    }

    pub fn menu(
        display: Arc<dyn DisplayGateway>,
        bus: Arc<dyn InteractionBus>,
        context: ConversationContext,
        policy: MatchPolicy,
    ) -> Self {
        Self::for_kind(ListenerKind::Menu, display, bus, context, policy)
    }

    pub fn reactions(
        display: Arc<dyn DisplayGateway>,
        bus: Arc<dyn InteractionBus>,
        context: ConversationContext,
        policy: MatchPolicy,
    ) -> Self {
        Self::for_kind(ListenerKind::Reaction, display, bus, context, policy)
    }

    pub fn text(
        display: Arc<dyn DisplayGateway>,
        bus: Arc<dyn InteractionBus>,
        context: ConversationContext,
        policy: MatchPolicy,
    ) -> Self {
        Self::for_kind(ListenerKind::Text, display, bus, context, policy)
    }
}
