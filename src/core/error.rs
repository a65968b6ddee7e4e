use std::error::Error;
use std::fmt;

/// Failures that can end a chat turn.
///
/// Only `Configuration` and `Transport` ever reach the user, as inline error
/// text on the affected message. `Grounding` is logged and dropped: the turn
/// continues without augmentation. Malformed or partial fences in a reply
/// are not errors at all and resolve to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Missing or unusable credential. Every send fails the same way until
    /// the key is provided.
    Configuration(String),

    /// Network, HTTP, or provider failure before or during streaming.
    Transport(String),

    /// The optional grounding lookup failed.
    Grounding(String),
}

impl ChatError {
    pub fn missing_api_key() -> Self {
        ChatError::Configuration(
            "API key not set. Export GEMINI_API_KEY or run `genui-chat auth`.".to_string(),
        )
    }

    pub fn message(&self) -> &str {
        match self {
            ChatError::Configuration(msg) | ChatError::Transport(msg) | ChatError::Grounding(msg) => {
                msg
            }
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for ChatError {}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        assert_eq!(
            ChatError::Transport("connection reset".into()).to_string(),
            "connection reset"
        );
    }
}
