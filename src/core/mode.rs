use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering strategy for the next turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiMode {
    #[default]
    GenerativeUi,
    TextOnly,
}

impl UiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            UiMode::GenerativeUi => "generative-ui",
            UiMode::TextOnly => "text-only",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UiMode::GenerativeUi => "Gen UI",
            UiMode::TextOnly => "Text Only",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UiMode::GenerativeUi => UiMode::TextOnly,
            UiMode::TextOnly => UiMode::GenerativeUi,
        }
    }

    pub fn is_generative(self) -> bool {
        self == UiMode::GenerativeUi
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generative-ui" | "generative" | "gen-ui" | "genui" => Ok(UiMode::GenerativeUi),
            "text-only" | "text" => Ok(UiMode::TextOnly),
            other => Err(format!(
                "invalid mode '{other}' (expected generative-ui or text-only)"
            )),
        }
    }
}
