//! Configuration file handling.
//!
//! The configuration lives in `<config dir>/ez-commit/config.toml`. Every read
//! deep-merges the file onto the defaults and validates the result; a file
//! that fails validation is replaced with the defaults and the failure is
//! still reported to the caller.

pub mod merge;
pub mod schema;

pub use merge::deep_merge;
pub use schema::{Config, GeneratorConfig, parse_temperature};

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Directory under the platform config dir.
pub const APP_DIR: &str = "ez-commit";

/// File name inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Reads and writes the configuration file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// A store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at the platform's per-user location.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::new(base.join(APP_DIR).join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the defaults if no file exists yet. Returns whether a file was created.
    pub fn ensure_exists(&self) -> Result<bool, ConfigError> {
        if self.path.exists() {
            return Ok(false);
        }

        debug!("Creating default config at {}", self.path.display());
        self.save(&Config::default())?;
        Ok(true)
    }

    /// Load, merge with defaults, and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ResetToDefaults`] when the file could not be
    /// parsed or failed validation. The file has already been overwritten
    /// with the defaults at that point, so the next load succeeds.
    pub fn load(&self) -> Result<Config, ConfigError> {
        self.ensure_exists()?;

        let raw = fs::read_to_string(&self.path).map_err(|source| ConfigError::ReadFailed {
            path: self.path.clone(),
            source,
        })?;

        match parse_config(&raw) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(
                    "Config file {} is invalid, resetting to defaults: {}",
                    self.path.display(),
                    err
                );
                self.reset_to_defaults()?;
                Err(ConfigError::ResetToDefaults {
                    path: self.path.clone(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Validate and write the whole configuration.
    ///
    /// Nothing is written when validation fails.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        let content = toml::to_string_pretty(config)?;
        write_atomic(&self.path, &content)
    }

    /// Overwrite the file with the defaults.
    pub fn reset_to_defaults(&self) -> Result<(), ConfigError> {
        self.save(&Config::default())
    }

    /// Load, apply `change`, and save.
    pub fn update<F>(&self, change: F) -> Result<Config, ConfigError>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)?;
        Ok(config)
    }

    /// The API key to use: `OPENAI_API_KEY` if set, else the stored key.
    ///
    /// Both are trimmed. An empty string means no key is available; the
    /// caller decides whether that is fatal.
    pub fn resolve_api_key(&self, config: &Config) -> String {
        pick_api_key(
            env::var(API_KEY_ENV_VAR).ok().as_deref(),
            &config.generator.api_key,
        )
    }
}

fn pick_api_key(env_value: Option<&str>, stored: &str) -> String {
    match env_value.map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => stored.trim().to_string(),
    }
}

/// Parse raw file content into a validated config merged onto the defaults.
fn parse_config(raw: &str) -> Result<Config, ConfigError> {
    let user: toml::Table =
        toml::from_str(raw).map_err(|e| ConfigError::Invalid(e.message().to_string()))?;
    check_temperature_literal(raw)?;

    let mut table = Config::default().to_table()?;
    deep_merge(&mut table, &user);

    let config = Config::from_table(table)?;
    config.validate()?;
    Ok(config)
}

/// Reject a temperature written in scientific notation (`7e-1`).
///
/// The typed record only sees the parsed float, so the literal is read from
/// the document itself.
fn check_temperature_literal(raw: &str) -> Result<(), ConfigError> {
    let doc: toml_edit::DocumentMut = raw
        .parse()
        .map_err(|e: toml_edit::TomlError| ConfigError::Invalid(e.to_string()))?;

    let Some(value) = doc
        .get("generator")
        .and_then(|generator| generator.get("temperature"))
        .and_then(|item| item.as_value())
    else {
        return Ok(());
    };

    if value.is_float() || value.is_integer() {
        // Comments and whitespace live in the decor, not the number.
        let mut value = value.clone();
        value.decor_mut().clear();
        let literal = value.to_string();
        let literal = literal.trim();
        if literal.contains(['e', 'E']) {
            return Err(ConfigError::Invalid(format!(
                "generator.temperature must be a plain decimal, got {literal}"
            )));
        }
    }

    Ok(())
}

/// Write `content` to a temp file next to `path`, then move it into place.
fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
