//! Locating a resource's definition in the type graph.
//!
//! Strategies, first hit wins:
//! 1. name ends with `.<Kind>` and the definition has properties
//! 2. every dot-separated group component and the kind appear in the name
//!    (case-insensitive), and the definition has properties
//! 3. name contains the built-in reference `io.k8s.api.<group>.<version>.<Kind>`
use crate::identity::ResourceIdentity;
use crate::path::Path;

use super::field::{FieldKind, FieldNode};
use super::graph::{SchemaDef, TypeGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    KindSuffix,
    GroupAndKind,
    BuiltinReference,
}

pub fn find_resource_def<'g>(
    graph: &'g TypeGraph,
    identity: &ResourceIdentity,
) -> Option<(&'g str, &'g SchemaDef, MatchStrategy)> {
    let types = graph.sorted();

    let suffix = format!(".{}", identity.kind);
    if let Some((name, def)) = types
        .iter()
        .find(|(name, def)| name.ends_with(&suffix) && def.has_properties())
    {
        return Some((*name, *def, MatchStrategy::KindSuffix));
    }

    let kind_lower = identity.kind.to_lowercase();
    let group_parts: Vec<String> = identity
        .group
        .split('.')
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase)
        .collect();
    if let Some((name, def)) = types.iter().find(|(name, def)| {
        let lower = name.to_lowercase();
        def.has_properties()
            && lower.contains(&kind_lower)
            && group_parts.iter().all(|part| lower.contains(part.as_str()))
    }) {
        return Some((*name, *def, MatchStrategy::GroupAndKind));
    }

    let builtin = identity.builtin_schema_ref();
    types
        .iter()
        .find(|(name, _)| name.contains(&builtin))
        .map(|(name, def)| (*name, *def, MatchStrategy::BuiltinReference))
}

/// The floor shape: name, namespace, labels and annotations under `metadata`.
pub fn basic_shape() -> Vec<FieldNode> {
    let metadata = Path::root().child("metadata");
    vec![
        FieldNode::leaf(metadata.child("name"), FieldKind::String)
            .with_description("Name of the resource")
            .required(true),
        FieldNode::leaf(metadata.child("namespace"), FieldKind::String)
            .with_description("Namespace of the resource"),
        FieldNode::leaf(metadata.child("labels"), FieldKind::Map)
            .with_description("Map of string to string. Labels for the resource"),
        FieldNode::leaf(metadata.child("annotations"), FieldKind::Map)
            .with_description("Map of string to string. Annotations for the resource"),
    ]
}
