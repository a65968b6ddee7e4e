//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    grounding_handler, ui_tree_handler, BaseUrlHandler, HtmlExportHandler, ModeHandler,
    ModelHandler,
};
use super::SettingHandler;
use crate::core::config::Config;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `genui-chat set` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(ModelHandler));
        registry.register(Box::new(BaseUrlHandler));
        registry.register(Box::new(ModeHandler));
        registry.register(Box::new(grounding_handler()));
        registry.register(Box::new(ui_tree_handler()));
        registry.register(Box::new(HtmlExportHandler));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// One line per key, in display order.
    pub fn describe(&self, config: &Config) -> String {
        let mut out = String::from("Current configuration:");
        for key in &self.display_order {
            if let Some(handler) = self.handlers.get(key) {
                out.push('\n');
                out.push_str(&handler.format(config));
            }
        }
        out
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
