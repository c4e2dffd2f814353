//! Navigation configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::wizard::DEFAULT_ENDED_NOTICE;
use crate::domain::conversation::{BypassRule, BACK_OPTION, CANCEL_KEYWORD};

/// Back/cancel keywords and how a conversation closes
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    /// Option that returns to the previous window
    #[serde(default = "default_back_option")]
    pub back_option: String,

    /// Typed keyword that cancels the conversation
    #[serde(default = "default_cancel_keyword")]
    pub cancel_keyword: String,

    /// Shown in place of the prompt once the conversation ends
    #[serde(default = "default_ended_notice")]
    pub ended_notice: String,

    /// Delete the prompt on end instead of showing the notice
    #[serde(default)]
    pub delete_on_end: bool,

    /// Most real choices for which lenient matching accepts anything
    #[serde(default = "default_bypass_max_choices")]
    pub bypass_max_choices: usize,

    /// Leave the back option out when counting real choices
    #[serde(default = "default_true")]
    pub bypass_ignores_back: bool,

    /// Most windows remembered for going back
    #[serde(default = "default_max_back_stack")]
    pub max_back_stack: usize,
}

impl NavigationConfig {
    pub fn bypass_rule(&self) -> BypassRule {
        BypassRule {
            max_real_choices: self.bypass_max_choices,
            ignore_back: self.bypass_ignores_back,
        }
    }

    /// Validate navigation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.back_option.trim().is_empty() {
            return Err(ValidationError::EmptyKeyword("back_option"));
        }
        if self.cancel_keyword.trim().is_empty() {
            return Err(ValidationError::EmptyKeyword("cancel_keyword"));
        }
        if self
            .back_option
            .trim()
            .eq_ignore_ascii_case(self.cancel_keyword.trim())
        {
            return Err(ValidationError::ConflictingKeywords);
        }
        if self.ended_notice.trim().is_empty() {
            return Err(ValidationError::EmptyEndedNotice);
        }
        if self.max_back_stack == 0 || self.max_back_stack > 1024 {
            return Err(ValidationError::InvalidBackStack);
        }
        Ok(())
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            back_option: default_back_option(),
            cancel_keyword: default_cancel_keyword(),
            ended_notice: default_ended_notice(),
            delete_on_end: false,
            bypass_max_choices: default_bypass_max_choices(),
            bypass_ignores_back: true,
            max_back_stack: default_max_back_stack(),
        }
    }
}

fn default_back_option() -> String {
    BACK_OPTION.to_string()
}

fn default_cancel_keyword() -> String {
    CANCEL_KEYWORD.to_string()
}

fn default_ended_notice() -> String {
    DEFAULT_ENDED_NOTICE.to_string()
}

fn default_bypass_max_choices() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_max_back_stack() -> usize {
    32
}
