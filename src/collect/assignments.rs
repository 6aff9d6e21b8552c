//! `--set <path>=<value>` parsing.
use thiserror::Error;

use crate::coerce::coerce;
use crate::document::ValueMap;
use crate::path::{Path, PathError};
use crate::value::Value;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("invalid assignment {0:?}: expected <path>=<value>")]
    MissingEquals(String),
    #[error("invalid assignment {0:?}: empty path")]
    EmptyKey(String),
    #[error("invalid assignment: {0}")]
    Path(#[from] PathError),
}

/// Splits at the first `=`; both sides are trimmed and the value coerced.
pub fn parse_assignment(src: &str) -> Result<(Path, Value), AssignmentError> {
    let Some((key, value)) = src.split_once('=') else {
        return Err(AssignmentError::MissingEquals(src.to_string()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(AssignmentError::EmptyKey(src.to_string()));
    }
    let path = Path::parse(key)?;
    if path.is_empty() {
        return Err(AssignmentError::EmptyKey(src.to_string()));
    }
    Ok((path, coerce(value.trim())))
}

/// Parses every assignment up front; the first malformed one aborts.
/// A repeated path keeps its last value.
pub fn parse_assignments<I>(items: I) -> Result<ValueMap, AssignmentError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = ValueMap::new();
    for item in items {
        let (path, value) = parse_assignment(item.as_ref())?;
        out.insert(path, value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_coerced() {
        let values = parse_assignments([
            "spec.replicas=3",
            " spec.paused = false ",
            "spec.ratio=0.5",
            "spec.image=nginx:1.27",
            "metadata.annotations.note=a=b",
            "spec.empty=",
        ])
        .unwrap();
        let get = |k: &str| values.get(&Path::parse(k).unwrap()).cloned();
        assert_eq!(get("spec.replicas"), Some(Value::Integer(3)));
        assert_eq!(get("spec.paused"), Some(Value::Bool(false)));
        assert_eq!(get("spec.ratio"), Some(Value::Float(0.5)));
        assert_eq!(get("spec.image"), Some("nginx:1.27".into()));
        assert_eq!(get("metadata.annotations.note"), Some("a=b".into()));
        assert_eq!(get("spec.empty"), Some("".into()));
    }

    #[test]
    fn malformed_assignments() {
        assert_eq!(
            parse_assignment("spec.replicas"),
            Err(AssignmentError::MissingEquals("spec.replicas".into()))
        );
        assert_eq!(parse_assignment("  =3"), Err(AssignmentError::EmptyKey("  =3".into())));
        assert_eq!(parse_assignment("..=3"), Err(AssignmentError::EmptyKey("..=3".into())));
        assert!(matches!(parse_assignment("spec.ports[0=1"), Err(AssignmentError::Path(_))));
    }

    #[test]
    fn first_error_aborts_and_last_value_wins() {
        assert!(parse_assignments(["a=1", "broken", "b=2"]).is_err());
        let values = parse_assignments(["a=1", "a=2"]).unwrap();
        assert_eq!(values.get(&Path::parse("a").unwrap()), Some(&Value::Integer(2)));
    }
}
