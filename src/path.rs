//! Dotted/indexed field paths (`spec.template.spec.containers[0].image`).
//!
//! Grammar:
//! - segments are separated by `.`; empty segments are dropped
//! - a segment may be followed by `[<digits>]`, chained as `a[0][1]`
//! - an index after a dot attaches to the preceding plain key, so `a.[1]`
//!   and `a[1]` are the same path
//! - bracket content that is not a non-negative integer stays part of the key
//!   (`labels[app]` is the literal key `labels[app]`)
//! - an unterminated `[` is the only error
//!
//! `Display` is the canonical textual form and `Path::parse` inverts it for
//! keys that contain no `.` and no `[<digits>]`. Map keys taken from a
//! document (`app.kubernetes.io/name`, the empty key) are kept exactly in a
//! `Path` but do not survive a trip through text.
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid path {path:?}: unterminated '[' at byte {offset}")]
    UnterminatedBracket { path: String, offset: usize },
}

/// One step into a document: a map key, optionally followed by a list index.
///
/// A segment with an empty key and an index addresses an element of the list
/// reached by the previous segment (`a[0][1]`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathSegment {
    pub key: String,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        Self { key: key.into(), index: None }
    }
    pub fn indexed(key: impl Into<String>, index: usize) -> Self {
        Self { key: key.into(), index: Some(index) }
    }
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(src: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut pos = 0;

        while pos < src.len() {
            let rest = &src[pos..];
            let Some(c) = rest.chars().next() else { break };
            match c {
                '.' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::key(std::mem::take(&mut current)));
                    }
                    pos += 1;
                }
                '[' => {
                    let Some(close) = rest.find(']') else {
                        return Err(PathError::UnterminatedBracket {
                            path: src.to_string(),
                            offset: pos,
                        });
                    };
                    let inner = &rest[1..close];
                    match parse_index(inner) {
                        Some(index) => match segments.last_mut() {
                            Some(last) if current.is_empty() && last.index.is_none() => {
                                last.index = Some(index);
                            }
                            _ => segments.push(PathSegment::indexed(std::mem::take(&mut current), index)),
                        },
                        // not an index: the whole bracketed token stays in the key
                        None => current.push_str(&rest[..=close]),
                    }
                    pos += close + 1;
                }
                _ => {
                    current.push(c);
                    pos += c.len_utf8();
                }
            }
        }
        if !current.is_empty() {
            segments.push(PathSegment::key(current));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
    pub fn len(&self) -> usize {
        self.segments.len()
    }
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// `self.key`
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.segments.push(PathSegment::key(key));
        out
    }

    /// `self[index]`
    ///
    /// An empty map key cannot carry the index itself: `("", index)` would read
    /// as an index-only step, so the element gets a segment of its own.
    pub fn element(&self, index: usize) -> Self {
        let mut out = self.clone();
        match out.segments.last_mut() {
            Some(last) if last.index.is_none() && !last.key.is_empty() => last.index = Some(index),
            _ => out.segments.push(PathSegment::indexed("", index)),
        }
        out
    }

    /// `self[*]`: placeholder for "any element", used by schema field paths.
    pub fn any_element(&self) -> Self {
        let mut out = self.clone();
        match out.segments.last_mut() {
            Some(last) if last.index.is_none() => last.key.push_str("[*]"),
            _ => out.segments.push(PathSegment::key("[*]")),
        }
        out
    }

    /// True when the first segment is the plain key `section` and the path
    /// continues below it.
    pub fn is_under(&self, section: &str) -> bool {
        match self.segments.first() {
            Some(first) => self.segments.len() > 1 && first.index.is_none() && first.key == section,
            None => false,
        }
    }

    /// True when any step goes through a list element (or a literal bracketed key).
    pub fn has_element_step(&self) -> bool {
        self.segments.iter().any(|s| s.index.is_some() || s.key.contains('['))
    }

    /// Strictly below `ancestor`: `spec.ports[0].port` and `spec.ports[1]` are
    /// both descendants of `spec.ports`; `spec.ports` is not its own.
    pub fn is_descendant_of(&self, ancestor: &Path) -> bool {
        let n = ancestor.segments.len();
        if n == 0 || self.segments.len() < n {
            return false;
        }
        if self.segments[..n - 1] != ancestor.segments[..n - 1] {
            return false;
        }
        let (a, d) = (&ancestor.segments[n - 1], &self.segments[n - 1]);
        if a.key != d.key {
            return false;
        }
        match (a.index, d.index) {
            (None, Some(_)) => true,
            (x, y) if x == y => self.segments.len() > n,
            _ => false,
        }
    }
}

fn parse_index(inner: &str) -> Option<usize> {
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev_indexed = false;
        for (i, seg) in self.segments.iter().enumerate() {
            // `a[0][1]` chains directly
            if i > 0 && !(seg.key.is_empty() && prev_indexed) {
                f.write_str(".")?;
            }
            f.write_str(&seg.key)?;
            if let Some(index) = seg.index {
                write!(f, "[{index}]")?;
            }
            prev_indexed = seg.index.is_some();
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn dotted_and_indexed_segments() {
        let path = p("spec.template.spec.containers[0].image");
        assert_eq!(path.segments(), &[
            PathSegment::key("spec"),
            PathSegment::key("template"),
            PathSegment::key("spec"),
            PathSegment::indexed("containers", 0),
            PathSegment::key("image"),
        ]);
    }

    #[test]
    fn chained_indices() {
        let path = p("a[0][1].b");
        assert_eq!(path.segments(), &[
            PathSegment::indexed("a", 0),
            PathSegment::indexed("", 1),
            PathSegment::key("b"),
        ]);
        assert_eq!(path.to_string(), "a[0][1].b");
    }

    #[test]
    fn index_after_a_dot_attaches_to_the_previous_key() {
        assert_eq!(p("a.[1]"), p("a[1]"));
        assert_eq!(p("a.[1]").segments(), &[PathSegment::indexed("a", 1)]);
        assert!(p("a.[1].b").is_descendant_of(&p("a")));
        assert_eq!(p("a.[1].b").to_string(), "a[1].b");
        // an indexed key is not re-indexed; the step chains instead
        assert_eq!(p("a[0].[1]"), p("a[0][1]"));
        assert_eq!(p("[0].x").segments()[0], PathSegment::indexed("", 0));
    }

    #[test]
    fn empty_map_key_elements_get_their_own_step() {
        let path = Path::root().child("a").child("").element(2);
        assert_eq!(path.segments(), &[
            PathSegment::key("a"),
            PathSegment::key(""),
            PathSegment::indexed("", 2),
        ]);
        assert!(path.is_descendant_of(&Path::root().child("a").child("")));
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(p(".spec..replicas."), p("spec.replicas"));
        assert!(p("...").is_empty());
    }

    #[test]
    fn non_numeric_brackets_degrade_to_literal_key() {
        let path = p("metadata.labels[app.kubernetes.io/name]");
        assert_eq!(path.segments()[1], PathSegment::key("labels[app.kubernetes.io/name]"));
        assert_eq!(p("a[-1]").segments(), &[PathSegment::key("a[-1]")]);
        assert_eq!(p("a[]").segments(), &[PathSegment::key("a[]")]);
    }

    #[test]
    fn unterminated_bracket_is_an_error() {
        let err = Path::parse("spec.ports[0").unwrap_err();
        assert_eq!(err, PathError::UnterminatedBracket { path: "spec.ports[0".into(), offset: 10 });
    }

    #[test]
    fn serialize_then_parse_is_identity() {
        for src in [
            "spec.replicas",
            "spec.ports[0].port",
            "a[0][1][2]",
            "a.[3]",
            "[0].x",
            "labels[x][2].y",
            "ports[*].name",
            "naïve.ключ[4]",
        ] {
            let path = p(src);
            assert_eq!(p(&path.to_string()), path, "round trip of {src}");
        }
        // built paths round-trip too
        let built = Path::root().child("a").element(0).element(1).child("b").any_element();
        assert_eq!(p(&built.to_string()), built);
    }

    #[test]
    fn descendants() {
        let ports = p("spec.ports");
        assert!(p("spec.ports[0].port").is_descendant_of(&ports));
        assert!(p("spec.ports[1]").is_descendant_of(&ports));
        assert!(p("spec.ports.x").is_descendant_of(&ports));
        assert!(!p("spec.ports").is_descendant_of(&ports));
        assert!(!p("spec.portsX").is_descendant_of(&ports));
        assert!(!p("spec.replicas").is_descendant_of(&ports));
        assert!(p("a[0][1]").is_descendant_of(&p("a[0]")));
        assert!(!p("a[1]").is_descendant_of(&p("a[0]")));
    }

    #[test]
    fn sections() {
        assert!(p("spec.replicas").is_under("spec"));
        assert!(!p("spec").is_under("spec"));
        assert!(!p("metadata.name").is_under("spec"));
        assert!(!p("spec[0].x").is_under("spec"));
    }
}
