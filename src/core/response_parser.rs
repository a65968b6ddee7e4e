//! Derives a renderable artifact from the cumulative text of a streamed reply.
//!
//! The parser is a pure function of the whole buffer received so far. It is
//! called again from scratch on every delta, so a growing prefix converges to
//! the same result as parsing the finished reply in one call. Partial or
//! malformed fences never produce an error; they fall back to plain text.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::ui_tree::UiNode;

const FENCE: &str = "```";

static HTML_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```html\s*(.*?)\s*```").expect("valid html fence pattern"));

static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid json fence pattern"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub text_part: String,
    pub ui_part: Option<UiNode>,
}

/// Parser settings. The default only recognizes fenced HTML blocks; the
/// JSON UI-tree path must be switched on explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseParser {
    pub ui_tree_blocks: bool,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ui_tree_blocks(mut self, enabled: bool) -> Self {
        self.ui_tree_blocks = enabled;
        self
    }

    pub fn parse(&self, buffer: &str) -> ParsedResponse {
        if let Some(html) = extract_html_block(buffer) {
            return ParsedResponse {
                text_part: html,
                ui_part: None,
            };
        }

        if self.ui_tree_blocks {
            if let Some(parsed) = extract_ui_tree(buffer) {
                return parsed;
            }
        }

        ParsedResponse {
            text_part: strip_fences(buffer),
            ui_part: None,
        }
    }
}

/// Parses with the default settings.
pub fn parse_response(buffer: &str) -> ParsedResponse {
    ResponseParser::default().parse(buffer)
}

/// Interior of the first complete ```` ```html ```` block, trimmed. Blocks
/// with a blank interior count as absent.
fn extract_html_block(buffer: &str) -> Option<String> {
    let captures = HTML_BLOCK.captures(buffer)?;
    let inner = captures.get(1)?.as_str().trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

fn extract_ui_tree(buffer: &str) -> Option<ParsedResponse> {
    let captures = JSON_BLOCK.captures(buffer)?;
    let whole = captures.get(0)?;
    let inner = captures.get(1)?.as_str();

    let node = match UiNode::from_json(inner) {
        Ok(node) if node.has_kind() => node,
        Ok(_) => return None,
        Err(err) => {
            tracing::debug!("json block is not a UI tree: {err}");
            return None;
        }
    };

    let mut surrounding = String::with_capacity(buffer.len() - whole.len());
    surrounding.push_str(&buffer[..whole.start()]);
    surrounding.push_str(&buffer[whole.end()..]);

    Some(ParsedResponse {
        text_part: strip_fences(&surrounding).trim().to_string(),
        ui_part: Some(node),
    })
}

fn strip_fences(text: &str) -> String {
    text.replace(FENCE, "")
}
