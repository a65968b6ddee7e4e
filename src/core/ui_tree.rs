//! Model-authored UI tree.
//!
//! A tree arrives as JSON shaped like
//! `{"type": "Card", "props": {...}, "children": ["text", {...}]}`. Nodes are
//! kept as data here; turning them into markup is the job of
//! [`crate::ui::generative`], which only instantiates whitelisted kinds.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Props key that never contributes content. Children come only from
/// [`UiNode::children`].
pub const RESERVED_CHILDREN_PROP: &str = "children";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiNode {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "props_or_empty",
        skip_serializing_if = "Map::is_empty"
    )]
    pub props: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "lenient_children",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<UiChild>,
}

/// `null` props mean no props.
fn props_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Children the way a browser component tree takes them: numbers become
/// text, `null` and booleans render nothing, nested arrays are flattened.
fn lenient_children<'de, D>(deserializer: D) -> Result<Vec<UiChild>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut children = Vec::with_capacity(values.len());
    collect_children(values, &mut children).map_err(de::Error::custom)?;
    Ok(children)
}

fn collect_children(values: Vec<Value>, out: &mut Vec<UiChild>) -> Result<(), serde_json::Error> {
    for value in values {
        match value {
            Value::Null | Value::Bool(_) => {}
            Value::String(text) => out.push(UiChild::Text(text)),
            Value::Number(number) => out.push(UiChild::Text(number.to_string())),
            Value::Array(nested) => collect_children(nested, out)?,
            node @ Value::Object(_) => out.push(UiChild::Node(serde_json::from_value(node)?)),
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UiChild {
    Text(String),
    Node(UiNode),
}

impl UiNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(UiChild::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: UiNode) -> Self {
        self.children.push(UiChild::Node(child));
        self
    }

    pub fn has_kind(&self) -> bool {
        !self.kind.trim().is_empty()
    }

    /// Props with the reserved `children` key removed.
    pub fn effective_props(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.props
            .iter()
            .filter(|(key, _)| key.as_str() != RESERVED_CHILDREN_PROP)
    }

    /// Looks up a string prop, ignoring the reserved key.
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        if key == RESERVED_CHILDREN_PROP {
            return None;
        }
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_tree_with_text_children() {
        let node = UiNode::from_json(
            r#"{"type":"Card","props":{"className":"p-2"},"children":["Hi ",{"type":"strong","children":["there"]}]}"#,
        )
        .expect("valid tree");

        assert_eq!(node.kind, "Card");
        assert_eq!(node.str_prop("className"), Some("p-2"));
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0], UiChild::Text("Hi ".into()));
        match &node.children[1] {
            UiChild::Node(child) => {
                assert_eq!(child.kind, "strong");
                assert_eq!(child.children, vec![UiChild::Text("there".into())]);
            }
            other => panic!("expected node child, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let node = UiNode::from_json("{}").expect("empty object is a node");
        assert!(!node.has_kind());
        assert!(node.props.is_empty());
        assert!(node.children.is_empty());
    }

    #[test]
    fn null_props_are_empty() {
        let node = UiNode::from_json(r#"{"type":"div","props":null,"children":["hi"]}"#)
            .expect("null props accepted");
        assert_eq!(node.kind, "div");
        assert!(node.props.is_empty());
        assert_eq!(node.children, vec![UiChild::Text("hi".into())]);
    }

    #[test]
    fn scalar_children_become_text() {
        let node = UiNode::from_json(
            r#"{"type":"p","children":["Temp: ",72,"°F",null,true,[" (",{"type":"em","children":[-1.5]},")"]]}"#,
        )
        .expect("scalar children accepted");

        assert_eq!(
            node.children,
            vec![
                UiChild::Text("Temp: ".into()),
                UiChild::Text("72".into()),
                UiChild::Text("°F".into()),
                UiChild::Text(" (".into()),
                UiChild::Node(UiNode::new("em").with_text("-1.5")),
                UiChild::Text(")".into()),
            ]
        );
    }

    #[test]
    fn null_children_are_empty() {
        let node = UiNode::from_json(r#"{"type":"br","children":null}"#).expect("valid");
        assert!(node.children.is_empty());
    }

    #[test]
    fn effective_props_skip_reserved_children_key() {
        let node = UiNode::new("div")
            .with_prop("children", "<script>alert(1)</script>")
            .with_prop("id", "main");

        let keys: Vec<_> = node.effective_props().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["id"]);
        assert_eq!(node.str_prop("children"), None);
    }
}
