//! Match policy: how strictly a listener validates raw input.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reserved option that asks the controller to go back one window.
pub const BACK_OPTION: &str = "back";

/// Freeform keyword that cancels the current conversation.
pub const CANCEL_KEYWORD: &str = "end";

/// Strictness of option matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Any non-empty input is accepted.
    Off,
    /// Exact match, unless the option set offers no real choice.
    #[default]
    Lenient,
    /// Exact match only.
    Strict,
}

/// When lenient matching stops checking input against the options.
///
/// The default treats "no real choice" as at most one option once the back
/// option is discounted: `[]`, `["ok"]` and `["ok", "back"]` all bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassRule {
    /// Highest number of real choices that still bypasses matching.
    pub max_real_choices: usize,
    /// Whether the back option is left out when counting real choices.
    pub ignore_back: bool,
}

impl Default for BypassRule {
    fn default() -> Self {
        Self {
            max_real_choices: 1,
            ignore_back: true,
        }
    }
}

impl BypassRule {
    /// Counts the options that represent a real decision.
    pub fn real_choices(&self, options: &[String], back_option: &str) -> usize {
        options
            .iter()
            .filter(|o| !(self.ignore_back && o.eq_ignore_ascii_case(back_option)))
            .count()
    }

    /// True when the option set is degenerate and any input should pass.
    pub fn applies(&self, options: &[String], back_option: &str) -> bool {
        self.real_choices(options, back_option) <= self.max_real_choices
    }
}

/// Per-listener validation and lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPolicy {
    pub mode: MatchMode,
    /// Lower-case accepted responses.
    pub auto_format: bool,
    /// Attach a cancel affordance to every prompt.
    pub show_cancel: bool,
    /// Accept responses from anyone in the channel, not only the owner.
    /// `None` defers to the listener variant's default.
    pub allow_all_responders: Option<bool>,
    /// How long a round waits before it is abandoned.
    pub timeout: Duration,
    pub bypass: BypassRule,
    pub back_option: String,
    pub cancel_keyword: String,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            mode: MatchMode::Lenient,
            auto_format: true,
            show_cancel: true,
            allow_all_responders: None,
            timeout: Duration::from_secs(30),
            bypass: BypassRule::default(),
            back_option: BACK_OPTION.to_string(),
            cancel_keyword: CANCEL_KEYWORD.to_string(),
        }
    }
}

impl MatchPolicy {
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_auto_format(mut self, auto_format: bool) -> Self {
        self.auto_format = auto_format;
        self
    }

    pub fn with_cancel(mut self, show_cancel: bool) -> Self {
        self.show_cancel = show_cancel;
        self
    }

    pub fn with_all_responders(mut self, allow: bool) -> Self {
        self.allow_all_responders = Some(allow);
        self
    }

    /// Resolves the responder setting against a listener's default.
    pub fn allows_anyone(&self, listener_default: bool) -> bool {
        self.allow_all_responders.unwrap_or(listener_default)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_bypass(mut self, bypass: BypassRule) -> Self {
        self.bypass = bypass;
        self
    }

    /// True when `raw` is the back sentinel.
    pub fn is_back(&self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(&self.back_option)
    }

    /// True when `raw` is the cancel keyword.
    pub fn is_cancel(&self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(&self.cancel_keyword)
    }
}
