//! Handlers for each configuration key.

use std::path::PathBuf;

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{format_bool, parse_bool, success_set};
use crate::cli::settings::SettingHandler;
use crate::core::config::{path_display, Config};
use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::mode::UiMode;

/// Data-driven handler for boolean (on/off) settings.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    get: fn(&Config) -> Option<bool>,
    set_field: fn(&mut Config, Option<bool>),
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        (self.set_field)(config, Some(value));
        Ok(success_set(self.key, format_bool(value)))
    }

    fn unset(&self, config: &mut Config) -> String {
        (self.set_field)(config, None);
        format!(
            "✅ Unset {} (will use default: {})",
            self.key, self.default_display
        )
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

pub fn grounding_handler() -> BooleanHandler {
    BooleanHandler {
        key: "grounding",
        hint: "To toggle search grounding for generative replies, specify on or off:",
        example: "genui-chat set grounding off",
        default_display: "on",
        get: |c| c.grounding,
        set_field: |c, v| c.grounding = v,
    }
}

pub fn ui_tree_handler() -> BooleanHandler {
    BooleanHandler {
        key: "ui-tree",
        hint: "To accept JSON UI trees in replies, specify on or off:",
        example: "genui-chat set ui-tree on",
        default_display: "off",
        get: |c| c.ui_tree,
        set_field: |c, v| c.ui_tree = v,
    }
}

pub struct ModelHandler;

impl SettingHandler for ModelHandler {
    fn key(&self) -> &'static str {
        "model"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let model = args.join(" ");
        if model.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set the default model, provide a model id:",
                example: "genui-chat set model gemini-2.5-pro",
            });
        }
        let message = success_set("model", &model);
        config.model = Some(model);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> String {
        config.model = None;
        format!("✅ Unset model (will use default: {DEFAULT_MODEL})")
    }

    fn format(&self, config: &Config) -> String {
        match &config.model {
            Some(model) => format!("  model: {model}"),
            None => format!("  model: (unset, default: {DEFAULT_MODEL})"),
        }
    }
}

pub struct BaseUrlHandler;

impl SettingHandler for BaseUrlHandler {
    fn key(&self) -> &'static str {
        "base-url"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let [url] = args else {
            return Err(SettingError::MissingArgs {
                hint: "To point at a different API root, provide one URL:",
                example: "genui-chat set base-url https://generativelanguage.googleapis.com/v1beta",
            });
        };
        config.base_url = Some(url.clone());
        Ok(success_set("base-url", url))
    }

    fn unset(&self, config: &mut Config) -> String {
        config.base_url = None;
        "✅ Unset base-url (will use default)".to_string()
    }

    fn format(&self, config: &Config) -> String {
        match &config.base_url {
            Some(url) => format!("  base-url: {url}"),
            None => format!("  base-url: (unset, default: {DEFAULT_BASE_URL})"),
        }
    }
}

pub struct ModeHandler;

impl SettingHandler for ModeHandler {
    fn key(&self) -> &'static str {
        "mode"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set the starting mode, specify generative-ui or text-only:",
                example: "genui-chat set mode text-only",
            });
        }
        let mode: UiMode = args.join(" ").parse().map_err(SettingError::InvalidMode)?;
        config.mode = Some(mode);
        Ok(success_set("mode", mode.as_str()))
    }

    fn unset(&self, config: &mut Config) -> String {
        config.mode = None;
        format!(
            "✅ Unset mode (will use default: {})",
            UiMode::default().as_str()
        )
    }

    fn format(&self, config: &Config) -> String {
        match config.mode {
            Some(mode) => format!("  mode: {}", mode.as_str()),
            None => format!("  mode: (unset, default: {})", UiMode::default().as_str()),
        }
    }
}

pub struct HtmlExportHandler;

impl SettingHandler for HtmlExportHandler {
    fn key(&self) -> &'static str {
        "html-export"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let path = args.join(" ");
        if path.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To keep an HTML copy of every chat, provide a file path:",
                example: "genui-chat set html-export ~/genui-chat.html",
            });
        }
        let path = PathBuf::from(path);
        let message = success_set("html-export", &path_display(&path));
        config.html_export = Some(path);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> String {
        config.html_export = None;
        "✅ Unset html-export".to_string()
    }

    fn format(&self, config: &Config) -> String {
        match &config.html_export {
            Some(path) => format!("  html-export: {}", path_display(path)),
            None => "  html-export: (unset)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_handler_parses_words() {
        let handler = grounding_handler();
        let mut config = Config::default();

        assert_eq!(
            handler.set(&["no".into()], &mut config).expect("set"),
            "✅ Set grounding to: off"
        );
        assert_eq!(config.grounding, Some(false));
        assert_eq!(handler.format(&config), "  grounding: off");

        assert!(matches!(
            handler.set(&["perhaps".into()], &mut config),
            Err(SettingError::InvalidBoolean(_))
        ));
        assert!(matches!(
            handler.set(&[], &mut config),
            Err(SettingError::MissingArgs { .. })
        ));
    }

    #[test]
    fn mode_handler_accepts_aliases() {
        let mut config = Config::default();
        ModeHandler
            .set(&["gen-ui".into()], &mut config)
            .expect("set");
        assert_eq!(config.mode, Some(UiMode::GenerativeUi));
        assert_eq!(ModeHandler.format(&config), "  mode: generative-ui");
    }

    #[test]
    fn base_url_requires_exactly_one_value() {
        let mut config = Config::default();
        assert!(BaseUrlHandler
            .set(&["a".into(), "b".into()], &mut config)
            .is_err());
        BaseUrlHandler
            .set(&["https://proxy.test/v1beta".into()], &mut config)
            .expect("set");
        assert_eq!(config.base_url(), "https://proxy.test/v1beta");
    }

    #[test]
    fn unset_restores_defaults() {
        let mut config = Config {
            model: Some("m".into()),
            ui_tree: Some(true),
            ..Config::default()
        };
        ModelHandler.unset(&mut config);
        ui_tree_handler().unset(&mut config);
        assert_eq!(config, Config::default());
    }
}
