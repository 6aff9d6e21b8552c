//! Final document assembly and rendering.
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::document::{ValueMap, assemble};
use crate::identity::ResourceIdentity;
use crate::value::{Document, Map, Value};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported output format {0:?} (expected yaml or json)")]
    UnsupportedFormat(String),
    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = RenderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        })
    }
}

/// Assembles `values` and stamps the envelope: `metadata.name` is always
/// `name`, `metadata.namespace` is set when given, and `apiVersion`/`kind`
/// come first and override anything assembled at those keys.
pub fn build(identity: &ResourceIdentity, name: &str, namespace: Option<&str>, values: &ValueMap) -> Document {
    let mut body = assemble(values);

    let metadata = body
        .entry("metadata".to_string())
        .or_insert_with(|| Value::Map(Map::new()));
    if !matches!(metadata, Value::Map(_)) {
        tracing::debug!("replacing non-map metadata");
        *metadata = Value::Map(Map::new());
    }
    if let Value::Map(metadata) = metadata {
        metadata.insert("name".to_string(), Value::from(name));
        if let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) {
            metadata.insert("namespace".to_string(), Value::from(namespace));
        }
    }

    let mut doc = Document::with_capacity(body.len() + 2);
    doc.insert("apiVersion".to_string(), Value::String(identity.api_version()));
    doc.insert("kind".to_string(), Value::String(identity.kind.clone()));
    for (key, value) in body {
        if key != "apiVersion" && key != "kind" {
            doc.insert(key, value);
        }
    }
    doc
}

pub fn render(doc: &Document, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(doc)?),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(doc)?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::assignments::parse_assignments;
    use serde_json::json;

    fn deployments() -> ResourceIdentity {
        ResourceIdentity::parse("deployments.apps/v1", None).unwrap()
    }

    #[test]
    fn envelope_and_name_always_win() {
        let values = parse_assignments([
            "apiVersion=v0",
            "kind=Wrong",
            "metadata.name=old",
            "metadata.labels.app=web",
            "spec.replicas=3",
        ])
        .unwrap();
        let doc = build(&deployments(), "web", Some("prod"), &values);
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys[..2], ["apiVersion", "kind"]);
        assert_eq!(serde_json::Value::from(&Value::Map(doc)), json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "web", "namespace": "prod", "labels": { "app": "web" } },
            "spec": { "replicas": 3 },
        }));
    }

    #[test]
    fn empty_namespace_is_left_out() {
        let doc = build(&deployments(), "web", Some(""), &ValueMap::new());
        assert_eq!(doc["metadata"], Value::from(json!({ "name": "web" })));
        let doc = build(&deployments(), "web", None, &ValueMap::new());
        assert_eq!(doc["metadata"], Value::from(json!({ "name": "web" })));
    }

    #[test]
    fn renders_yaml_and_json() {
        let values = parse_assignments(["spec.replicas=3", "spec.ratio=0.5"]).unwrap();
        let doc = build(&deployments(), "web", None, &values);
        let yaml = render(&doc, OutputFormat::Yaml).unwrap();
        assert!(yaml.starts_with("apiVersion: apps/v1\nkind: Deployment\n"));
        assert!(yaml.contains("replicas: 3\n"));
        assert!(yaml.contains("ratio: 0.5\n"));

        let json = render(&doc, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["spec"]["replicas"], json!(3));
    }

    #[test]
    fn format_names() {
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!("xml".parse::<OutputFormat>(), Err(RenderError::UnsupportedFormat(_))));
    }
}
