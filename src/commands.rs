//! Handlers for the `config` subcommands.

use tracing::debug;

use crate::config::{Config, ConfigStore, parse_temperature};
use crate::error::{AppError, ConfigError};
use crate::ui::Prompter;

const CONFIG_TITLE: &str = "Current Configuration";

/// Open the config file in the editor, then load it to validate the result.
///
/// An invalid edit is reported and the file is reset to the defaults.
pub fn edit_config<P: Prompter + ?Sized>(store: &ConfigStore, ui: &mut P) -> Result<(), AppError> {
    store.ensure_exists()?;
    ui.info(&format!("Opening config file: {}", store.path().display()));
    ui.edit_file(store.path())?;
    debug!("Editor closed, validating {}", store.path().display());

    store.load()?;
    ui.success("Configuration is valid.");
    Ok(())
}

/// Show the current config, confirm, reset to defaults, show the result.
pub fn reset_config<P: Prompter + ?Sized>(store: &ConfigStore, ui: &mut P) -> Result<(), AppError> {
    store.ensure_exists()?;
    match store.load() {
        Ok(current) => ui.show_message(CONFIG_TITLE, &render_config(&current))?,
        Err(err) => ui.warning(&err.to_string()),
    }

    if !ui.confirm("Are you sure you want to reset to default configuration?")? {
        ui.info("Reset cancelled.");
        return Ok(());
    }

    debug!("Resetting {} to defaults", store.path().display());
    store.reset_to_defaults()?;
    ui.success("Configuration reset to defaults.");
    let fresh = store.load()?;
    ui.show_message(CONFIG_TITLE, &render_config(&fresh))?;
    Ok(())
}

pub fn set_api_key<P: Prompter + ?Sized>(
    store: &ConfigStore,
    ui: &mut P,
    key: &str,
) -> Result<(), AppError> {
    let key = non_empty(key, "API key")?;
    debug!("Storing API key ({} chars)", key.chars().count());
    store.update(|config| config.generator.api_key = key.to_string())?;
    ui.success("API key updated successfully!");
    Ok(())
}

pub fn set_model<P: Prompter + ?Sized>(
    store: &ConfigStore,
    ui: &mut P,
    model: &str,
) -> Result<(), AppError> {
    let model = non_empty(model, "Model name")?;
    debug!("Setting model to {}", model);
    store.update(|config| config.generator.model = model.to_string())?;
    ui.success(&format!("Model updated to: {model}"));
    Ok(())
}

/// Set the temperature from user input such as `0.3`.
pub fn set_temperature<P: Prompter + ?Sized>(
    store: &ConfigStore,
    ui: &mut P,
    raw: &str,
) -> Result<(), AppError> {
    let temperature = parse_temperature(raw)?;
    debug!("Setting temperature to {}", temperature);
    store.update(|config| config.generator.temperature = temperature)?;
    ui.success(&format!("Temperature updated to: {temperature}"));
    Ok(())
}

/// Edit the system prompt in the editor. An empty result is rejected.
pub fn edit_system_prompt<P: Prompter + ?Sized>(
    store: &ConfigStore,
    ui: &mut P,
) -> Result<(), AppError> {
    let config = store.load()?;
    ui.info("Opening editor to modify system prompt...");
    let edited = ui.edit_text(&config.system_prompt)?;
    let prompt = non_empty(&edited, "System prompt")?;

    debug!("New system prompt is {} chars", prompt.chars().count());
    store.update(|config| config.system_prompt = prompt.to_string())?;
    ui.success("System prompt updated successfully!");
    Ok(())
}

/// Show the configuration without the API key.
pub fn show_config<P: Prompter + ?Sized>(store: &ConfigStore, ui: &mut P) -> Result<(), AppError> {
    let config = store.load()?;
    ui.show_message(CONFIG_TITLE, &render_config(&config))?;
    Ok(())
}

/// Human-readable configuration. The API key is never included.
pub fn render_config(config: &Config) -> String {
    format!(
        "Model: {}\nTemperature: {}\nMax tokens: {}\n\nSystem Prompt:\n{}",
        config.generator.model,
        config.generator.temperature,
        config.generator.max_tokens,
        config.system_prompt.trim_end()
    )
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyField(field));
    }
    Ok(trimmed)
}
