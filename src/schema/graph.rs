//! Raw type-description graph: type name → definition, as found in
//! OpenAPI v3 `components.schemas` or Swagger v2 `definitions`.
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::path_de::{PathDeError, from_value_with_path};

const REF_PREFIXES: [&str; 2] = ["#/components/schemas/", "#/definitions/"];

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid schema definition {0}")]
    Definition(#[from] PathDeError),
    #[error("schema document has no type definitions (expected components.schemas, definitions, or a name → definition map)")]
    NoDefinitions,
}

/// `type` is either a single name or a list (`["string", "null"]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    Single(String),
    Multiple(Vec<String>),
}

/// `additionalProperties` is either a flag or an element schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaDef>),
}

/// One definition or property. Only the keys the extractor reads are kept;
/// everything else (`x-kubernetes-*`, `format`, ...) is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDef {
    #[serde(rename = "type")]
    pub type_decl: Option<TypeDecl>,
    pub description: Option<String>,
    pub default: Option<serde_json::Value>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub items: Option<Box<SchemaDef>>,
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default)]
    pub properties: IndexMap<String, SchemaDef>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl TypeDecl {
    pub fn primary(&self) -> Option<&str> {
        match self {
            TypeDecl::Single(t) => Some(t.as_str()),
            TypeDecl::Multiple(ts) => ts.iter().map(String::as_str).find(|t| *t != "null"),
        }
    }
}

impl SchemaDef {
    pub fn declared_type(&self) -> Option<&str> {
        self.type_decl.as_ref().and_then(TypeDecl::primary)
    }

    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Target type name of `$ref`, with the document prefix stripped.
    pub fn reference_name(&self) -> Option<&str> {
        self.reference.as_deref().map(strip_ref_prefix)
    }

    /// Element schema of an open-ended map, when this definition is one.
    pub fn map_element(&self) -> Option<MapElement<'_>> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(def)) => Some(MapElement::Typed(def)),
            Some(AdditionalProperties::Allowed(true)) if !self.has_properties() => Some(MapElement::Any),
            _ => None,
        }
    }
}

pub enum MapElement<'a> {
    Typed(&'a SchemaDef),
    Any,
}

impl MapElement<'_> {
    /// Human name of the element type: its `type`, or its `$ref` target.
    pub fn type_name(&self) -> String {
        match self {
            MapElement::Typed(def) => def
                .declared_type()
                .or_else(|| def.reference_name())
                .unwrap_or("any")
                .to_string(),
            MapElement::Any => "any".to_string(),
        }
    }
}

pub fn strip_ref_prefix(reference: &str) -> &str {
    REF_PREFIXES
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
        .unwrap_or(reference)
}

// ------------------------------- Graph ------------------------------------ //

#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    types: IndexMap<String, SchemaDef>,
}

impl TypeGraph {
    pub fn new(types: IndexMap<String, SchemaDef>) -> Self {
        Self { types }
    }

    /// Accepts an OpenAPI v3 document, a Swagger v2 document, or a bare
    /// name → definition mapping.
    pub fn from_document(src: &str) -> Result<Self, GraphError> {
        let raw: serde_json::Value = serde_json::from_str(src)?;
        Self::from_value(raw)
    }

    pub fn from_value(mut raw: serde_json::Value) -> Result<Self, GraphError> {
        let v3 = raw.pointer_mut("/components/schemas").map(serde_json::Value::take);
        let v2 = raw.pointer_mut("/definitions").map(serde_json::Value::take);
        let (section, prefix) = if let Some(s) = v3 {
            (s, "components.schemas")
        } else if let Some(s) = v2 {
            (s, "definitions")
        } else if raw.is_object() {
            (raw, "")
        } else {
            return Err(GraphError::NoDefinitions);
        };
        let types: IndexMap<String, SchemaDef> = from_value_with_path(section, prefix)?;
        if types.is_empty() {
            return Err(GraphError::NoDefinitions);
        }
        Ok(Self { types })
    }

    /// Later graphs override same-named types.
    pub fn merge(&mut self, other: TypeGraph) {
        self.types.extend(other.types);
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDef> {
        self.types.get(name)
    }

    pub fn resolve(&self, reference: &str) -> Option<&SchemaDef> {
        self.types.get(strip_ref_prefix(reference))
    }

    /// Type names in sorted order, so lookups do not depend on document order.
    pub fn sorted(&self) -> Vec<(&str, &SchemaDef)> {
        let mut out: Vec<(&str, &SchemaDef)> = self.types.iter().map(|(k, v)| (k.as_str(), v)).collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
