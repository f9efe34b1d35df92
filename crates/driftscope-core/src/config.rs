//! Process-wide configuration for the I/O-facing components.
//!
//! Built once at startup (see the CLI) and handed explicitly to the
//! provider and the store. The highlighting engine never reads it.

use std::fmt;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("database connection string is not set (DATABASE_URL)")]
    MissingConnectionString,

    #[error("API key is not set (OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("model name is empty")]
    MissingModel,

    #[error("max tokens must be greater than zero")]
    ZeroMaxTokens,

    #[error("temperature {0} is outside 0.0..=2.0")]
    InvalidTemperature(f32),
}

#[derive(Clone, PartialEq)]
pub struct Config {
    /// Store location: a DuckDB file path, or `:memory:`.
    pub connection_string: String,
    pub api_key: String,
    pub model_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            api_key: String::new(),
            model_name: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("connection_string", &self.connection_string)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("model_name", &self.model_name)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Config {
    /// Check the settings the store needs.
    pub fn require_store(&self) -> Result<(), ConfigError> {
        if self.connection_string.trim().is_empty() {
            return Err(ConfigError::MissingConnectionString);
        }
        Ok(())
    }

    /// Check the settings the analysis provider needs.
    pub fn require_provider(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ZeroMaxTokens);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        Ok(())
    }
}
