//! Schema extraction: raw type graph → typed field tree.
//!
//! Walks a resource definition, following `$ref` indirection, into
//! `FieldNode`s in prompting order (required names first, then optional,
//! each alphabetical). Envelope properties (`apiVersion`, `kind`, `status`)
//! are skipped at the root. Maps (`additionalProperties`) are not expanded.
//! A visited-reference stack cuts cyclic `$ref` chains.
pub mod field;
pub mod graph;
pub mod lookup;

use std::collections::BTreeSet;

use crate::identity::ResourceIdentity;
use crate::path::Path;
use crate::value::Value;

pub use field::{FieldKind, FieldNode, SchemaTree};
pub use graph::{GraphError, SchemaDef, TypeGraph};
pub use lookup::{MatchStrategy, basic_shape, find_resource_def};

// ------------------------------- Policy ---------------------------------- //

const ENVELOPE_PROPERTIES: [&str; 3] = ["apiVersion", "kind", "status"];

/// Hard stop for pathological (non-cyclic but very deep) graphs.
const MAX_DEPTH: usize = 32;

// ------------------------------ Front API --------------------------------- //

/// Resolves the resource's definition and extracts its fields; never fails.
/// When no definition matches, the basic metadata shape is returned.
pub fn extract_resource(graph: &TypeGraph, identity: &ResourceIdentity) -> SchemaTree {
    match find_resource_def(graph, identity) {
        Some((name, def, strategy)) => {
            tracing::info!(definition = name, ?strategy, "matched resource schema");
            let fields = Extractor::new(graph).extract(def, &Path::root());
            SchemaTree {
                source: Some(name.to_string()),
                description: def.description.clone().unwrap_or_default(),
                fields,
            }
        }
        None => {
            tracing::warn!(
                resource = %identity,
                builtin = %identity.builtin_schema_ref(),
                "no schema found; using basic shape (name, namespace, labels, annotations)"
            );
            SchemaTree {
                source: None,
                description: format!("A {} resource", identity.kind),
                fields: basic_shape(),
            }
        }
    }
}

/// Extracts the fields of `def` rooted at `prefix`.
pub fn extract(graph: &TypeGraph, def: &SchemaDef, prefix: &Path) -> Vec<FieldNode> {
    Extractor::new(graph).extract(def, prefix)
}

// ------------------------------ Extraction -------------------------------- //

struct Extractor<'g> {
    graph: &'g TypeGraph,
    /// `$ref` targets currently being expanded (innermost last).
    visiting: Vec<String>,
}

impl<'g> Extractor<'g> {
    fn new(graph: &'g TypeGraph) -> Self {
        Self { graph, visiting: Vec::new() }
    }

    fn extract(&mut self, def: &SchemaDef, prefix: &Path) -> Vec<FieldNode> {
        if prefix.len() > MAX_DEPTH {
            tracing::debug!(%prefix, "schema depth limit reached");
            return Vec::new();
        }
        let required: BTreeSet<&str> = def.required.iter().map(String::as_str).collect();

        let (mut req_names, mut opt_names): (Vec<&str>, Vec<&str>) = def
            .properties
            .keys()
            .map(String::as_str)
            .partition(|name| required.contains(name));
        req_names.sort_unstable();
        opt_names.sort_unstable();

        let mut fields = Vec::with_capacity(req_names.len() + opt_names.len());
        for name in req_names.into_iter().chain(opt_names) {
            if prefix.is_empty() && ENVELOPE_PROPERTIES.contains(&name) {
                continue;
            }
            let Some(prop) = def.properties.get(name) else { continue };
            fields.push(self.field(name, prop, prefix.child(name), required.contains(name)));
        }
        fields
    }

    fn field(&mut self, name: &str, prop: &SchemaDef, path: Path, required: bool) -> FieldNode {
        let mut node = FieldNode {
            path,
            name: name.to_string(),
            kind: inferred_kind(prop),
            description: prop.description.clone().unwrap_or_default(),
            required,
            default: prop.default.clone().map(Value::from),
            items: None,
            children: Vec::new(),
        };

        // `$ref`: expand the target as this node's children
        let mut target: Option<&'g SchemaDef> = None;
        if let Some(reference) = prop.reference_name() {
            if let Some(def) = self.graph.resolve(reference) {
                node.kind = FieldKind::Object;
                target = Some(def);
                node.children = self.expand_reference(reference, def, &node.path, &mut node.description);
            }
        }

        if node.kind == FieldKind::Object {
            let element = prop.map_element().or_else(|| target.and_then(SchemaDef::map_element));
            if let Some(element) = element {
                node.kind = FieldKind::Map;
                node.children.clear();
                node.description = prefix_description(
                    &format!("Map of string to {}.", element.type_name()),
                    &node.description,
                );
            } else if node.children.is_empty() && target.is_none() {
                node.children = self.extract(prop, &node.path);
            }
        }

        if node.kind == FieldKind::Array {
            node.items = prop.items.as_deref().map(|items| Box::new(self.item(name, items, &node.path)));
        }
        node
    }

    /// Element descriptor of an array, rooted at `path[*]`.
    fn item(&mut self, name: &str, items: &SchemaDef, array_path: &Path) -> FieldNode {
        let path = array_path.any_element();
        let mut node = FieldNode::leaf(path, inferred_kind(items));
        node.name = name.to_string();
        node.description = items.description.clone().unwrap_or_default();

        if let Some(reference) = items.reference_name() {
            if let Some(def) = self.graph.resolve(reference) {
                node.kind = FieldKind::Object;
                node.children = self.expand_reference(reference, def, &node.path, &mut node.description);
            }
        } else if node.kind == FieldKind::Object && items.has_properties() {
            node.children = self.extract(items, &node.path);
        }
        node
    }

    fn expand_reference(
        &mut self,
        reference: &str,
        def: &SchemaDef,
        path: &Path,
        description: &mut String,
    ) -> Vec<FieldNode> {
        if self.visiting.iter().any(|r| r == reference) {
            tracing::debug!(%path, reference, "recursive reference not expanded");
            *description = prefix_description(&format!("Recursive reference to {reference}."), description);
            return Vec::new();
        }
        self.visiting.push(reference.to_string());
        let children = self.extract(def, path);
        self.visiting.pop();
        children
    }
}

/// `type` when declared; otherwise guessed from the definition's shape.
fn inferred_kind(def: &SchemaDef) -> FieldKind {
    match def.declared_type() {
        Some(t) => FieldKind::from_type_name(t),
        None if def.has_properties() || def.additional_properties.is_some() => FieldKind::Object,
        None if def.items.is_some() => FieldKind::Array,
        None => FieldKind::String,
    }
}

fn prefix_description(prefix: &str, description: &str) -> String {
    if description.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix} {description}")
    }
}

// ------------------------------- Tests ------------------------------------ //
