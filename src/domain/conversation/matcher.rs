//! Response matching.
//!
//! Decides whether a raw piece of input answers the current prompt and, if
//! so, what normalised response the controller receives. Pure logic: no
//! transport, no state.

use super::policy::{MatchMode, MatchPolicy};

/// Result of checking raw input against a prompt's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Accepted(String),
    Rejected,
}

impl MatchOutcome {
    /// The accepted response, if any.
    pub fn accepted(&self) -> Option<&str> {
        match self {
            MatchOutcome::Accepted(response) => Some(response),
            MatchOutcome::Rejected => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, MatchOutcome::Accepted(_))
    }
}

/// Validates raw input against an option set under a [`MatchPolicy`].
///
/// Rules:
/// - blank input is always rejected
/// - `Off` accepts anything, lower-cased when `auto_format` is set
/// - `Lenient` accepts a case-insensitive option match, or any input
///   verbatim when the [`BypassRule`](super::BypassRule) applies
/// - `Strict` accepts only case-insensitive option matches
pub struct ResponseMatcher;

impl ResponseMatcher {
    pub fn accept(raw: &str, options: &[String], policy: &MatchPolicy) -> MatchOutcome {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return MatchOutcome::Rejected;
        }

        match policy.mode {
            MatchMode::Off => MatchOutcome::Accepted(Self::format(raw, policy)),
            MatchMode::Lenient => {
                if Self::matches_option(trimmed, options) {
                    MatchOutcome::Accepted(Self::format(trimmed, policy))
                } else if policy.bypass.applies(options, &policy.back_option) {
                    MatchOutcome::Accepted(raw.to_string())
                } else {
                    MatchOutcome::Rejected
                }
            }
            MatchMode::Strict => {
                if Self::matches_option(trimmed, options) {
                    MatchOutcome::Accepted(Self::format(trimmed, policy))
                } else {
                    MatchOutcome::Rejected
                }
            }
        }
    }

    fn matches_option(input: &str, options: &[String]) -> bool {
        let input = input.to_lowercase();
        options.iter().any(|o| o.trim().to_lowercase() == input)
    }

    fn format(input: &str, policy: &MatchPolicy) -> String {
        if policy.auto_format {
            input.to_lowercase()
        } else {
            input.to_string()
        }
    }
}
