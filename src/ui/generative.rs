//! Whitelist renderer for model-authored UI trees.
//!
//! Only the element kinds in [`Component`] can ever reach the output. Every
//! other `type` turns into a visible placeholder, attribute names and values
//! are filtered and escaped, and text children are always escaped.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::core::ui_tree::{UiChild, UiNode};
use crate::ui::html::{escape_html, Html};

const CARD_CLASS: &str = "bg-gray-700 p-4 rounded-lg shadow-md border border-gray-600";
const URL_ATTRIBUTES: &[&str] = &["src", "href", "action", "formaction"];
const BLOCKED_ATTRIBUTES: &[&str] = &["dangerouslysetinnerhtml", "srcdoc"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Div,
    P,
    H1,
    H2,
    H3,
    Span,
    Strong,
    Em,
    Ul,
    Li,
    Button,
    Img,
}

impl Primitive {
    pub fn tag(self) -> &'static str {
        match self {
            Primitive::Div => "div",
            Primitive::P => "p",
            Primitive::H1 => "h1",
            Primitive::H2 => "h2",
            Primitive::H3 => "h3",
            Primitive::Span => "span",
            Primitive::Strong => "strong",
            Primitive::Em => "em",
            Primitive::Ul => "ul",
            Primitive::Li => "li",
            Primitive::Button => "button",
            Primitive::Img => "img",
        }
    }

    pub fn is_void(self) -> bool {
        matches!(self, Primitive::Img)
    }
}

/// The closed set of renderable kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Element(Primitive),
    Card,
    UserProfile,
}

impl Component {
    /// Kind names are case-sensitive.
    pub fn from_kind(kind: &str) -> Option<Self> {
        let primitive = match kind {
            "div" => Primitive::Div,
            "p" => Primitive::P,
            "h1" => Primitive::H1,
            "h2" => Primitive::H2,
            "h3" => Primitive::H3,
            "span" => Primitive::Span,
            "strong" => Primitive::Strong,
            "em" => Primitive::Em,
            "ul" => Primitive::Ul,
            "li" => Primitive::Li,
            "button" => Primitive::Button,
            "img" => Primitive::Img,
            "Card" => return Some(Component::Card),
            "UserProfile" => return Some(Component::UserProfile),
            _ => return None,
        };
        Some(Component::Element(primitive))
    }
}

pub fn render_node(node: Option<&UiNode>) -> Html {
    let mut out = String::new();
    if let Some(node) = node {
        render_into(node, &mut out);
    }
    Html::trusted(out)
}

fn render_into(node: &UiNode, out: &mut String) {
    if !node.has_kind() {
        return;
    }

    match Component::from_kind(&node.kind) {
        Some(Component::Element(primitive)) => render_element(primitive, node, out),
        Some(Component::Card) => render_card(node, out),
        Some(Component::UserProfile) => render_user_profile(node, out),
        None => {
            warn!(kind = %node.kind, "refusing to render unsupported UI component");
            out.push_str("<div class=\"text-red-400\">[Unsupported UI Component: ");
            out.push_str(&escape_html(&node.kind));
            out.push_str("]</div>");
        }
    }
}

fn render_element(primitive: Primitive, node: &UiNode, out: &mut String) {
    let tag = primitive.tag();
    out.push('<');
    out.push_str(tag);
    for (name, value) in safe_attributes(node) {
        push_attribute(out, name, &value);
    }
    out.push('>');

    if primitive.is_void() {
        return;
    }

    render_children(&node.children, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_card(node: &UiNode, out: &mut String) {
    let extra = prop_text(node, "className").unwrap_or_default();
    out.push_str("<div");
    push_attribute(out, "class", format!("{CARD_CLASS} {extra}").trim_end());
    out.push('>');
    render_children(&node.children, out);
    out.push_str("</div>");
}

fn render_user_profile(node: &UiNode, out: &mut String) {
    let name = prop_text(node, "name").unwrap_or_default();
    let title = prop_text(node, "title").unwrap_or_default();

    out.push_str("<div");
    push_attribute(out, "class", &format!("{CARD_CLASS} flex items-center gap-4"));
    out.push_str("><img");
    if let Some(avatar) = prop_text(node, "avatarUrl").filter(|url| is_safe_url(url)) {
        push_attribute(out, "src", &avatar);
    }
    push_attribute(out, "alt", &name);
    push_attribute(out, "class", "w-16 h-16 rounded-full border-2 border-cyan-400");
    out.push_str("><div><h4 class=\"text-lg font-bold text-white\">");
    out.push_str(&escape_html(&name));
    out.push_str("</h4><p class=\"text-sm text-gray-300\">");
    out.push_str(&escape_html(&title));
    out.push_str("</p></div></div>");
}

fn render_children(children: &[UiChild], out: &mut String) {
    for child in children {
        match child {
            UiChild::Text(text) => out.push_str(&escape_html(text)),
            UiChild::Node(node) => render_into(node, out),
        }
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

/// Attributes that survive the policy, with framework names translated.
/// When both spellings are given (`className` and `class`), the framework
/// name wins.
fn safe_attributes(node: &UiNode) -> Vec<(&str, String)> {
    let mut attributes: BTreeMap<&str, (String, bool)> = BTreeMap::new();
    for (key, value) in node.effective_props() {
        let Some(name) = attribute_name(key) else {
            continue;
        };
        let Some(value) = scalar_text(value) else {
            continue;
        };
        if URL_ATTRIBUTES.contains(&name) && !is_safe_url(&value) {
            continue;
        }

        let translated = name != key.as_str();
        match attributes.get(name) {
            Some((_, true)) if !translated => {}
            _ => {
                attributes.insert(name, (value, translated));
            }
        }
    }

    attributes
        .into_iter()
        .map(|(name, (value, _))| (name, value))
        .collect()
}

fn attribute_name(key: &str) -> Option<&str> {
    let name = match key {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    };

    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }

    let lower = name.to_ascii_lowercase();
    if lower.starts_with("on") || BLOCKED_ATTRIBUTES.contains(&lower.as_str()) {
        return None;
    }
    Some(name)
}

/// Strings and numbers become text, `true` becomes an empty value, and
/// everything else drops the attribute.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some(String::new()),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn prop_text(node: &UiNode, key: &str) -> Option<String> {
    node.effective_props()
        .find(|(name, _)| name.as_str() == key)
        .and_then(|(_, value)| scalar_text(value))
}

/// `http`, `https`, or scheme-less (relative) URLs only. Whitespace and
/// control characters are ignored when looking for a scheme, as browsers do.
pub fn is_safe_url(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    let scheme_end = compact.find(|c| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(idx) if compact[idx..].starts_with(':') => {
            let scheme = compact[..idx].to_ascii_lowercase();
            scheme == "http" || scheme == "https"
        }
        _ => true,
    }
}
