//! Typed configuration record, defaults and validation.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default model used for generation.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default system instruction sent ahead of the diff.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that generates clear and concise git commit messages.
Follow these guidelines:
- Use the imperative mood (\"Add feature\" not \"Added feature\")
- Keep the first line under 50 characters
- Provide more detailed explanation in subsequent paragraphs if necessary
- Reference relevant issue numbers if applicable
- Focus on the \"what\" and \"why\" of the changes, not the \"how\"
";

/// Settings for the text-generation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub system_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Check the ranges that serde's types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temperature = self.generator.temperature;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ConfigError::Invalid(format!(
                "generator.temperature must be between 0.0 and 1.0, got {temperature}"
            )));
        }

        if self.generator.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "generator.max_tokens must be a positive integer".to_string(),
            ));
        }

        if self.generator.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "generator.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Convert a merged TOML table into the typed record.
    pub fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
        toml::Value::Table(table)
            .try_into::<Config>()
            .map_err(|e| ConfigError::Invalid(e.message().to_string()))
    }

    /// The record as a TOML table, the shape the merge works on.
    pub fn to_table(&self) -> Result<toml::Table, ConfigError> {
        match toml::Value::try_from(self)? {
            toml::Value::Table(table) => Ok(table),
            other => Err(ConfigError::Invalid(format!(
                "config serialized to a {} instead of a table",
                other.type_str()
            ))),
        }
    }
}

/// Parse a user-supplied temperature.
///
/// Only plain decimals such as `0.3`, `1` or `.5` are accepted; scientific
/// notation, signs and special values are rejected before the range check.
pub fn parse_temperature(raw: &str) -> Result<f64, ConfigError> {
    let raw = raw.trim();
    let plain = Regex::new(r"^(\d+(\.\d*)?|\.\d+)$").expect("Invalid regex");
    if !plain.is_match(raw) {
        return Err(ConfigError::TemperatureNotDecimal);
    }

    let value: f64 = raw.parse().map_err(|_| ConfigError::TemperatureNotDecimal)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::TemperatureOutOfRange);
    }

    Ok(value)
}
