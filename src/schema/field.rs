use serde::Serialize;

use crate::path::Path;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Map,
}

impl FieldKind {
    /// Unknown or missing `type` names prompt as strings.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "integer" => FieldKind::Integer,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "array" => FieldKind::Array,
            "object" => FieldKind::Object,
            _ => FieldKind::String,
        }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Integer | FieldKind::Number | FieldKind::Boolean)
    }

    /// Kind of an existing value, used when a template value is offered for edit.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Bool(_) => FieldKind::Boolean,
            Value::Integer(_) => FieldKind::Integer,
            Value::Float(_) => FieldKind::Number,
            Value::List(_) => FieldKind::Array,
            Value::Map(_) => FieldKind::Object,
            Value::Null | Value::String(_) => FieldKind::String,
        }
    }
}

/// One field of a resource shape.
///
/// `children` is only populated for `Object`, `items` only for `Array`.
/// `Map` fields never have children; their element type is in `description`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldNode {
    pub path: Path,
    pub name: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldNode>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldNode>,
}

impl FieldNode {
    pub fn leaf(path: Path, kind: FieldKind) -> Self {
        let name = path.last().map(|s| s.key.clone()).unwrap_or_default();
        Self {
            path,
            name,
            kind,
            description: String::new(),
            required: false,
            default: None,
            items: None,
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Top-level fields of a resource, in prompting order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaTree {
    /// Name of the matched definition; `None` for the basic fallback shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub fields: Vec<FieldNode>,
}

impl SchemaTree {
    pub fn is_fallback(&self) -> bool {
        self.source.is_none()
    }

    /// Depth-first walk over every node (items included).
    pub fn walk(&self) -> Vec<&FieldNode> {
        fn go<'a>(node: &'a FieldNode, out: &mut Vec<&'a FieldNode>) {
            out.push(node);
            if let Some(items) = &node.items {
                go(items, out);
            }
            for child in &node.children {
                go(child, out);
            }
        }
        let mut out = Vec::new();
        for field in &self.fields {
            go(field, &mut out);
        }
        out
    }
}
