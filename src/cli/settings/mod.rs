//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a [`SettingHandler`]; the [`SettingRegistry`]
//! maps keys to handlers and fixes the order used by `genui-chat set`.

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use std::error::Error;
use std::path::Path;

use crate::core::config::Config;

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value from the arguments after the key.
    /// Returns a success message to display.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Unset (clear) the configuration value.
    fn unset(&self, config: &mut Config) -> String;

    /// Format the current value for display in `genui-chat set` output.
    fn format(&self, config: &Config) -> String;
}

/// Applies `set <key> <args...>` to the config file at `path`. Without a
/// key the current settings are listed instead.
pub fn set_at_path(
    registry: &SettingRegistry,
    path: &Path,
    key: Option<&str>,
    args: &[String],
) -> Result<String, Box<dyn Error>> {
    let mut config = Config::load_from_path(path)?;
    let Some(key) = key else {
        return Ok(registry.describe(&config));
    };
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;

    let message = handler.set(args, &mut config)?;
    config.save_to_path(path)?;
    Ok(message)
}

pub fn unset_at_path(
    registry: &SettingRegistry,
    path: &Path,
    key: &str,
) -> Result<String, Box<dyn Error>> {
    let mut config = Config::load_from_path(path)?;
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;

    let message = handler.unset(&mut config);
    config.save_to_path(path)?;
    Ok(message)
}
