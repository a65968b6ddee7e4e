use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::conversation::ConversationOptions;
use crate::core::mode::UiMode;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Gemini model id (e.g., "gemini-2.5-flash")
    pub model: Option<String>,
    /// API root; the model path is appended to it
    pub base_url: Option<String>,
    /// Starting mode for new conversations
    pub mode: Option<UiMode>,
    /// Search-grounded context before generative turns
    pub grounding: Option<bool>,
    /// Accept fenced JSON UI trees in replies
    pub ui_tree: Option<bool>,
    /// Rewrite this HTML file after every settled turn
    pub html_export: Option<PathBuf>,
}

impl Config {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn mode(&self) -> UiMode {
        self.mode.unwrap_or_default()
    }

    pub fn grounding(&self) -> bool {
        self.grounding.unwrap_or(true)
    }

    pub fn ui_tree(&self) -> bool {
        self.ui_tree.unwrap_or(false)
    }

    pub fn conversation_options(&self) -> ConversationOptions {
        ConversationOptions {
            model: self.model().to_string(),
            mode: self.mode(),
            grounding: self.grounding(),
            ui_tree_blocks: self.ui_tree(),
            greeting: true,
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
