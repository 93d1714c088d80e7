//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Environment variable holding the Telegram Bot API token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Model used for `/faq` answers.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot name for identification in logs.
    pub name: String,
    /// Telegram token. `None` only when running on the CLI channel.
    pub telegram_token: Option<SecretString>,
    /// Completion service API key.
    pub openai_api_key: SecretString,
    /// Completion model name.
    pub model: String,
    /// Dialogs untouched for this long are dropped.
    pub session_idle_timeout: Duration,
    /// How often idle dialogs are swept.
    pub prune_interval: Duration,
}

impl BotConfig {
    /// Load credentials from the process environment.
    ///
    /// `require_telegram` is false when the bot runs on the CLI channel.
    pub fn from_env(require_telegram: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), require_telegram)
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F, require_telegram: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = non_empty(OPENAI_API_KEY_VAR)
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(OPENAI_API_KEY_VAR.to_string()))?;

        let telegram_token = match non_empty(TELEGRAM_TOKEN_VAR) {
            Some(token) => Some(SecretString::from(token)),
            None if require_telegram => {
                return Err(ConfigError::MissingEnvVar(TELEGRAM_TOKEN_VAR.to_string()));
            }
            None => None,
        };

        Ok(Self {
            telegram_token,
            openai_api_key,
            ..Self::defaults()
        })
    }

    fn defaults() -> Self {
        Self {
            name: "marketing-assist".to_string(),
            telegram_token: None,
            openai_api_key: SecretString::from(String::new()),
            model: DEFAULT_MODEL.to_string(),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(600),        // 10 minutes
        }
    }
}
