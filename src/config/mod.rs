//! Engine configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CHAT_WIZARD` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use chat_wizard::config::EngineConfig;
//!
//! let config = EngineConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! config.telemetry.init().expect("Failed to initialise logging");
//!
//! println!("Rounds time out after {:?}", config.listener.timeout());
//! ```

mod error;
mod listener;
mod navigation;
mod telemetry;

pub use error::{ConfigError, ValidationError};
pub use listener::ListenerConfig;
pub use navigation::NavigationConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

use crate::application::wizard::WizardOptions;
use crate::domain::conversation::{MatchPolicy, PromptContent};

/// Root engine configuration
///
/// Every section has defaults, so an empty environment yields a working
/// engine. Load using [`EngineConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Listener defaults (timeout, match mode, cancel affordance)
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Back/cancel keywords, ended notice, back-stack size
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Log filter and format
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CHAT_WIZARD` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAT_WIZARD__LISTENER__TIMEOUT_SECS=60` -> `listener.timeout_secs = 60`
    /// - `CHAT_WIZARD__NAVIGATION__CANCEL_KEYWORD=quit` -> `navigation.cancel_keyword = "quit"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_WIZARD")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.navigation.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }

    /// Match policy for listeners built from this configuration
    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            mode: self.listener.match_mode,
            auto_format: self.listener.auto_format,
            show_cancel: self.listener.show_cancel,
            allow_all_responders: self.listener.allow_all_responders,
            timeout: self.listener.timeout(),
            bypass: self.navigation.bypass_rule(),
            back_option: self.navigation.back_option.trim().to_string(),
            cancel_keyword: self.navigation.cancel_keyword.trim().to_string(),
        }
    }

    /// Controller settings built from this configuration
    pub fn wizard_options(&self) -> WizardOptions {
        WizardOptions {
            ended_notice: PromptContent::text(self.navigation.ended_notice.clone()),
            delete_on_end: self.navigation.delete_on_end,
            max_back_stack: self.navigation.max_back_stack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::listener::ListenerKind;
    use crate::domain::conversation::MatchMode;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("CHAT_WIZARD__LISTENER__TIMEOUT_SECS");
        env::remove_var("CHAT_WIZARD__LISTENER__MATCH_MODE");
        env::remove_var("CHAT_WIZARD__LISTENER__KIND");
        env::remove_var("CHAT_WIZARD__LISTENER__ALLOW_ALL_RESPONDERS");
        env::remove_var("CHAT_WIZARD__NAVIGATION__CANCEL_KEYWORD");
        env::remove_var("CHAT_WIZARD__NAVIGATION__DELETE_ON_END");
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = EngineConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.listener.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CHAT_WIZARD__LISTENER__TIMEOUT_SECS", "90");
        env::set_var("CHAT_WIZARD__LISTENER__MATCH_MODE", "strict");
        env::set_var("CHAT_WIZARD__LISTENER__KIND", "reaction");
        env::set_var("CHAT_WIZARD__LISTENER__ALLOW_ALL_RESPONDERS", "false");
        env::set_var("CHAT_WIZARD__NAVIGATION__CANCEL_KEYWORD", "quit");
        env::set_var("CHAT_WIZARD__NAVIGATION__DELETE_ON_END", "true");
        let result = EngineConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.listener.timeout_secs, 90);
        assert_eq!(config.listener.match_mode, MatchMode::Strict);
        assert_eq!(config.listener.kind, ListenerKind::Reaction);
        assert_eq!(config.listener.allow_all_responders, Some(false));
        assert_eq!(config.navigation.cancel_keyword, "quit");
        assert!(config.navigation.delete_on_end);
    }

    #[test]
    fn test_match_policy_from_config() {
        let mut config = EngineConfig::default();
        config.listener.timeout_secs = 45;
        config.navigation.cancel_keyword = " stop ".to_string();

        let policy = config.match_policy();
        assert_eq!(policy.timeout, Duration::from_secs(45));
        assert_eq!(policy.cancel_keyword, "stop");
        assert!(policy.is_cancel("STOP"));
    }

    #[test]
    fn test_wizard_options_from_config() {
        let mut config = EngineConfig::default();
        config.navigation.max_back_stack = 4;
        config.navigation.ended_notice = "Bye!".to_string();

        let options = config.wizard_options();
        assert_eq!(options.max_back_stack, 4);
        assert_eq!(options.ended_notice, PromptContent::text("Bye!"));
    }

    #[test]
    fn test_validate_rejects_bad_section() {
        let mut config = EngineConfig::default();
        config.listener.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
