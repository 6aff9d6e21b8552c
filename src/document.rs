//! Path-addressed document engine.
//!
//! `assemble` builds a nested document from path → value pairs; `flatten` is
//! its inverse and emits every location worth editing by path. Lists are
//! emitted twice: once whole, and once per element (map elements recursively),
//! so a caller can replace either the whole list or a single element field.
use std::collections::BTreeMap;

use crate::path::{Path, PathSegment};
use crate::value::{Document, Map, Value};

/// Path → typed value. Iteration follows `Path` ordering, which places a
/// whole-list entry before the entries of its elements.
///
/// Keys are `Path` values, not text: a document key such as
/// `app.kubernetes.io/name` stays one segment here even though its dotted
/// form would reparse as several.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: BTreeMap<Path, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: Path, value: Value) -> Option<Value> {
        self.entries.insert(path, value)
    }
    pub fn get(&self, path: &Path) -> Option<&Value> {
        self.entries.get(path)
    }
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }
    pub fn remove(&mut self, path: &Path) -> Option<Value> {
        self.entries.remove(path)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Value)> {
        self.entries.iter()
    }
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }

    /// Drops every entry strictly below `ancestor`, returning how many went.
    pub fn remove_descendants(&mut self, ancestor: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| !path.is_descendant_of(ancestor));
        before - self.entries.len()
    }

    /// Writes `value` at `path` after discarding stale entries below it.
    pub fn replace_subtree(&mut self, path: Path, value: Value) {
        self.remove_descendants(&path);
        self.entries.insert(path, value);
    }

    /// Layers `overrides` on top of `self`; overrides always win.
    pub fn overlay(&mut self, overrides: &ValueMap) {
        for (path, value) in overrides.iter() {
            self.replace_subtree(path.clone(), value.clone());
        }
    }
}

impl FromIterator<(Path, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Path, Value)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl IntoIterator for ValueMap {
    type Item = (Path, Value);
    type IntoIter = std::collections::btree_map::IntoIter<Path, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ------------------------------- Assemble --------------------------------- //

/// Builds a nested document. Conflicting shapes resolve last-write-wins in
/// iteration order: a scalar in the way of a deeper path is replaced by a map
/// (or list), and a later scalar replaces an earlier subtree.
pub fn assemble(values: &ValueMap) -> Document {
    let mut root = Value::Map(Map::new());
    for (path, value) in values.iter() {
        match path.segments().first() {
            None => continue,
            Some(first) if first.key.is_empty() && first.index.is_some() => {
                tracing::warn!(%path, "skipping path that indexes the document root");
                continue;
            }
            Some(_) => place(&mut root, path.segments(), value.clone()),
        }
    }
    match root {
        Value::Map(m) => m,
        _ => Map::new(),
    }
}

fn place(target: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((seg, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    let slot: &mut Value = if seg.key.is_empty() && seg.index.is_some() {
        // index-only step: applies to the list already at `target`
        target
    } else {
        if !matches!(target, Value::Map(_)) {
            tracing::debug!(key = %seg.key, "replacing non-map node with a map");
            *target = Value::Map(Map::new());
        }
        let Value::Map(map) = target else { return };
        map.entry(seg.key.clone()).or_insert(Value::Null)
    };

    match seg.index {
        None => place(slot, rest, value),
        Some(index) => {
            if !matches!(slot, Value::List(_)) {
                if !slot.is_null() {
                    tracing::debug!(key = %seg.key, "replacing non-list node with a list");
                }
                *slot = Value::List(Vec::new());
            }
            let Value::List(items) = slot else { return };
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            place(&mut items[index], rest, value);
        }
    }
}

// ------------------------------- Flatten ---------------------------------- //

/// Flattens `doc` into path → value pairs rooted at `prefix`. Empty maps are
/// kept as leaves so `assemble(flatten(d))` reproduces `d`.
pub fn flatten(doc: &Document, prefix: &Path) -> ValueMap {
    let mut out = ValueMap::new();
    for (key, value) in doc {
        flatten_into(prefix.child(key.clone()), value, &mut out);
    }
    out
}

fn flatten_into(path: Path, value: &Value, out: &mut ValueMap) {
    match value {
        Value::Map(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(path.child(key.clone()), child, out);
            }
        }
        Value::List(items) => {
            out.insert(path.clone(), value.clone());
            for (i, item) in items.iter().enumerate() {
                let element = path.element(i);
                match item {
                    Value::Map(_) | Value::List(_) => flatten_into(element, item, out),
                    scalar => {
                        out.insert(element, scalar.clone());
                    }
                }
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }
    fn doc(v: serde_json::Value) -> Document {
        match Value::from(v) {
            Value::Map(m) => m,
            other => panic!("not a map: {other:?}"),
        }
    }
    fn vm(pairs: &[(&str, Value)]) -> ValueMap {
        pairs.iter().map(|(k, v)| (p(k), v.clone())).collect()
    }

    #[test]
    fn assemble_scalars_and_list_elements() {
        let values = vm(&[
            ("spec.replicas", Value::Integer(3)),
            ("spec.ports[0].port", Value::Integer(80)),
            ("spec.ports[0].targetPort", Value::Integer(8080)),
        ]);
        let out = assemble(&values);
        assert_eq!(out, doc(json!({
            "spec": { "replicas": 3, "ports": [{ "port": 80, "targetPort": 8080 }] }
        })));
    }

    #[test]
    fn assemble_grows_lists_with_null_gaps() {
        let out = assemble(&vm(&[("args[2]", "c".into()), ("m[1][1]", 5.into())]));
        assert_eq!(out, doc(json!({
            "args": [null, null, "c"],
            "m": [null, [null, 5]],
        })));
    }

    #[test]
    fn assemble_conflict_is_last_write_wins() {
        // `spec` scalar sorts before `spec.replicas`, so the map wins
        let out = assemble(&vm(&[("spec", "x".into()), ("spec.replicas", 1.into())]));
        assert_eq!(out, doc(json!({ "spec": { "replicas": 1 } })));
    }

    #[test]
    fn assemble_skips_root_indexed_paths() {
        let out = assemble(&vm(&[("[0].x", 1.into()), ("a", 2.into())]));
        assert_eq!(out, doc(json!({ "a": 2 })));
    }

    #[test]
    fn flatten_emits_whole_lists_and_elements() {
        let d = doc(json!({ "spec": { "replicas": 3, "ports": [{ "port": 80 }] } }));
        let flat = flatten(&d, &Path::root());
        assert_eq!(flat.get(&p("spec.replicas")), Some(&Value::Integer(3)));
        assert_eq!(
            flat.get(&p("spec.ports")),
            Some(&Value::from(json!([{ "port": 80 }])))
        );
        assert_eq!(flat.get(&p("spec.ports[0].port")), Some(&Value::Integer(80)));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn flatten_scalar_elements_and_prefix() {
        let d = doc(json!({ "args": ["a", "b"], "empty": {}, "none": null }));
        let flat = flatten(&d, &p("spec.template"));
        assert_eq!(flat.get(&p("spec.template.args[1]")), Some(&"b".into()));
        assert_eq!(flat.get(&p("spec.template.empty")), Some(&Value::Map(Map::new())));
        assert_eq!(flat.get(&p("spec.template.none")), Some(&Value::Null));
    }

    #[test]
    fn flatten_then_assemble_round_trips() {
        for d in [
            json!({ "spec": { "replicas": 3, "ports": [{ "port": 80 }, { "port": 443, "name": "tls" }] } }),
            json!({ "a": [[1, 2], [3]], "b": { "c": { "d": true } }, "e": [] }),
            json!({ "m": { "x": null, "y": {} , "z": [null, { "k": 1.5 }] } }),
            json!({ "a": { "": { "x": 1 }, "b": 2 } }),
            json!({ "": 1 }),
            json!({ "a": { "": [1, { "k": 2 }] } }),
        ] {
            let d = doc(d);
            assert_eq!(assemble(&flatten(&d, &Path::root())), d);
        }
    }

    #[test]
    fn dotted_document_keys_stay_single_segments() {
        let d = doc(json!({ "metadata": { "labels": { "app.kubernetes.io/name": "web", "tier[0]": "x" } } }));
        let flat = flatten(&d, &Path::root());
        let label = Path::root().child("metadata").child("labels").child("app.kubernetes.io/name");
        assert_eq!(flat.get(&label), Some(&Value::from("web")));
        assert_eq!(label.len(), 3);
        // the textual form addresses a different location
        assert_eq!(flat.get(&p("metadata.labels.app.kubernetes.io/name")), None);
        assert_eq!(assemble(&flat), d);
    }

    #[test]
    fn empty_keys_are_map_keys() {
        let mut values = ValueMap::new();
        values.insert(Path::root().child(""), 1.into());
        values.insert(Path::root().child("a").child("").child("x"), true.into());
        assert_eq!(assemble(&values), doc(json!({ "": 1, "a": { "": { "x": true } } })));
    }

    #[test]
    fn overlay_replaces_stale_element_entries() {
        let mut seed = flatten(&doc(json!({ "spec": { "ports": [{ "port": 80 }], "replicas": 2 } })), &Path::root());
        seed.overlay(&vm(&[("spec.ports", Value::List(vec![])), ("spec.replicas", 5.into())]));
        assert_eq!(assemble(&seed), doc(json!({ "spec": { "ports": [], "replicas": 5 } })));
    }
}
