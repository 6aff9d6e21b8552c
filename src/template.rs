//! Turning a fetched object into a template for a new one.
use crate::document::{ValueMap, flatten};
use crate::path::Path;
use crate::value::{Document, Map, Value};

/// Bookkeeping the server owns; a new object must not carry it over.
const SERVER_MANAGED_METADATA: [&str; 8] = [
    "uid",
    "resourceVersion",
    "generation",
    "creationTimestamp",
    "managedFields",
    "selfLink",
    "ownerReferences",
    "finalizers",
];

/// Strips server-managed fields and renames the object: to `name` when
/// given, otherwise to `<old>-copy`. `namespace` replaces the template's.
pub fn prepare(mut doc: Document, name: Option<&str>, namespace: Option<&str>) -> Document {
    doc.shift_remove("status");

    let metadata = doc
        .entry("metadata".to_string())
        .or_insert_with(|| Value::Map(Map::new()));
    if !matches!(metadata, Value::Map(_)) {
        *metadata = Value::Map(Map::new());
    }
    let Value::Map(metadata) = metadata else { return doc };

    for key in SERVER_MANAGED_METADATA {
        metadata.shift_remove(key);
    }

    let new_name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Some(name.to_string()),
        None => metadata.get("name").and_then(Value::as_str).map(|old| format!("{old}-copy")),
    };
    if let Some(new_name) = new_name {
        metadata.insert("name".to_string(), Value::String(new_name));
    }
    if let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) {
        metadata.insert("namespace".to_string(), Value::from(namespace));
    }
    doc
}

/// Prepared template → seed for collection.
pub fn seed(doc: Document, name: Option<&str>, namespace: Option<&str>) -> ValueMap {
    let seed = flatten(&prepare(doc, name, namespace), &Path::root());
    tracing::info!(entries = seed.len(), "template seed ready");
    seed
}
