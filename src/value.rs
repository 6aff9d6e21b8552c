//! Closed value model for documents: scalars, lists and ordered maps.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type Map = IndexMap<String, Value>;

/// A nested object tree (the thing that gets submitted).
pub type Document = Map;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short single-line rendering used for prompt defaults and labels.
    pub fn to_inline_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => {
                serde_json::to_string(&serde_json::Value::from(self)).unwrap_or_default()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(xs) => Value::List(xs.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => {
                Value::Map(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            // NaN/inf have no JSON form
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(xs) => serde_json::Value::Array(xs.iter().map(serde_json::Value::from).collect()),
            Value::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), serde_json::Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_keep_integer_vs_float() {
        let v = Value::from(json!({"a": 3, "b": 3.5, "c": [true, null, "x"]}));
        let m = v.as_map().unwrap();
        assert_eq!(m["a"], Value::Integer(3));
        assert_eq!(m["b"], Value::Float(3.5));
        assert_eq!(m["c"], Value::List(vec![Value::Bool(true), Value::Null, "x".into()]));
    }

    #[test]
    fn untagged_yaml_deserialization() {
        let v: Value = serde_yaml::from_str("spec:\n  replicas: 2\n  ratio: 0.5\n  tags: [a, b]\n").unwrap();
        let spec = v.as_map().unwrap()["spec"].as_map().unwrap();
        assert_eq!(spec["replicas"], Value::Integer(2));
        assert_eq!(spec["ratio"], Value::Float(0.5));
        assert_eq!(spec["tags"], Value::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn inline_rendering() {
        assert_eq!(Value::Integer(80).to_inline_string(), "80");
        assert_eq!(Value::List(vec![1.into(), 2.into()]).to_inline_string(), "[1,2]");
    }
}
