//! Schema-driven synthesis of resource manifests.
//!
//! Field paths and the flatten/assemble document engine live in [`path`] and
//! [`document`]; [`schema`] turns an OpenAPI type graph into the field tree
//! that [`collect`] walks to gather values; [`manifest`] stamps the envelope.
pub mod cli;
pub mod coerce;
pub mod collect;
pub mod document;
pub mod error;
pub mod identity;
pub mod jq_exec;
pub mod logging;
pub mod manifest;
pub mod path;
pub mod path_de;
pub mod prompt;
pub mod schema;
pub mod submit;
pub mod template;
pub mod value;

pub use document::{ValueMap, assemble, flatten};
pub use error::Error;
pub use identity::ResourceIdentity;
pub use path::{Path, PathSegment};
pub use value::{Document, Value};
