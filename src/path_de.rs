use serde::de::DeserializeOwned;

/// Deserialization failure with the JSON path of the offending node.
#[derive(Debug, thiserror::Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathDeError {
    pub path: String,
    pub message: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathDeError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_path_error)
}

/// Same as [`from_str_with_path`] for an already parsed tree; `prefix` is
/// prepended to reported paths so nested sections report their full location.
pub fn from_value_with_path<T: DeserializeOwned>(
    value: serde_json::Value,
    prefix: &str,
) -> Result<T, PathDeError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let mut out = into_path_error(err);
        if !prefix.is_empty() {
            out.path = if out.path == "." { prefix.to_string() } else { format!("{prefix}.{}", out.path) };
        }
        out
    })
}

fn into_path_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> PathDeError {
    PathDeError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}
