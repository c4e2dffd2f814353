//! Listener configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::listener::ListenerKind;
use crate::domain::conversation::MatchMode;

/// Defaults applied to every listener the engine creates
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    /// Listener variant used when a flow does not ask for one
    #[serde(default)]
    pub kind: ListenerKind,

    /// Seconds a round waits for a response
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// off, lenient or strict
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Attach a cancel affordance to prompts
    #[serde(default = "default_true")]
    pub show_cancel: bool,

    /// Overrides each variant's default for who may answer
    pub allow_all_responders: Option<bool>,

    /// Lower-case accepted responses
    #[serde(default = "default_true")]
    pub auto_format: bool,
}

impl ListenerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 900 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            kind: ListenerKind::default(),
            timeout_secs: default_timeout_secs(),
            match_mode: MatchMode::default(),
            show_cancel: true,
            allow_all_responders: None,
            auto_format: true,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
