//! Field collection: seed + explicit overrides + prompts → one `ValueMap`.
//!
//! Without a template the schema tree is walked; each visited field is either
//! already satisfied, prompted (scalar or scalar list), noted as opaque (must
//! be set by path), or recursed into. With a template the walk is replaced by
//! a confirm-or-override pass over the seed (see [`template_pass`]).
pub mod assignments;
pub mod template_pass;

use thiserror::Error;

use crate::coerce::coerce;
use crate::document::ValueMap;
use crate::path::Path;
use crate::prompt::{Prompt, PromptError, Prompter};
use crate::schema::{FieldKind, FieldNode, SchemaTree};
use crate::value::Value;

/// Mutable body section; optional fields outside it are not asked about.
pub const BODY_SECTION: &str = "spec";
const METADATA_SECTION: &str = "metadata";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("interrupted")]
    Interrupted,
    #[error("a resource name is required (pass --name or --set metadata.name=<name>)")]
    MissingName,
    #[error("failed to read answer: {0}")]
    Io(#[source] std::io::Error),
}

impl From<PromptError> for CollectError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Interrupted => CollectError::Interrupted,
            PromptError::Io(e) => CollectError::Io(e),
        }
    }
}

/// Run configuration for one collection, built once from the command line.
#[derive(Debug, Clone, Default)]
pub struct CollectConfig {
    pub name: Option<String>,
    /// Parsed `--set` assignments; these always win over the template seed.
    pub overrides: ValueMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collected {
    pub name: String,
    pub values: ValueMap,
}

pub fn collect(
    tree: &SchemaTree,
    seed: Option<&ValueMap>,
    config: &CollectConfig,
    prompter: &mut dyn Prompter,
) -> Result<Collected, CollectError> {
    let mut values = seed.cloned().unwrap_or_default();
    values.overlay(&config.overrides);

    let name = resolve_name(config, &values, prompter)?;

    match seed {
        Some(seed) => template_pass::confirm_or_override(seed, &config.overrides, &mut values, prompter)?,
        None => {
            let mut walk = Walk { values: &mut values, prompter };
            for field in &tree.fields {
                walk.visit(field)?;
            }
        }
    }
    Ok(Collected { name, values })
}

// ------------------------------- Name ------------------------------------- //

fn resolve_name(
    config: &CollectConfig,
    values: &ValueMap,
    prompter: &mut dyn Prompter,
) -> Result<String, CollectError> {
    if let Some(name) = config.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }
    let name_path = Path::root().child(METADATA_SECTION).child("name");
    if let Some(name) = values.get(&name_path).map(Value::to_inline_string).filter(|n| !n.is_empty()) {
        return Ok(name);
    }
    if !prompter.is_interactive() {
        return Err(CollectError::MissingName);
    }
    let prompt = Prompt::new("metadata.name *").with_description("Name of the resource");
    loop {
        let answer = prompter.line(&prompt)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        prompter.note("a name is required");
    }
}

// ------------------------------- Walk ------------------------------------- //

struct Walk<'a, P: ?Sized> {
    values: &'a mut ValueMap,
    prompter: &'a mut P,
}

impl<P: Prompter + ?Sized> Walk<'_, P> {
    fn visit(&mut self, node: &FieldNode) -> Result<(), CollectError> {
        if !in_scope(node) {
            return Ok(());
        }
        if self.is_satisfied(node) {
            tracing::debug!(path = %node.path, "already set");
            return Ok(());
        }
        match node.kind {
            kind if kind.is_scalar() => self.scalar(node),
            FieldKind::Array => match node.items.as_deref() {
                Some(items) if items.kind.is_scalar() => self.scalar_list(node, items.kind),
                _ => {
                    self.opaque(node, "a list of objects");
                    Ok(())
                }
            },
            FieldKind::Object if !node.children.is_empty() => {
                for child in &node.children {
                    self.visit(child)?;
                }
                Ok(())
            }
            FieldKind::Map => {
                self.opaque(node, "a map");
                Ok(())
            }
            _ => {
                self.opaque(node, "an object");
                Ok(())
            }
        }
    }

    /// A scalar or a walked object is satisfied by its own entry; a list, a
    /// map or an object without known fields also by any entry below it.
    fn is_satisfied(&self, node: &FieldNode) -> bool {
        if self.values.contains(&node.path) {
            return true;
        }
        let walked = node.kind == FieldKind::Object && !node.children.is_empty();
        !node.kind.is_scalar() && !walked && self.values.paths().any(|p| p.is_descendant_of(&node.path))
    }

    fn scalar(&mut self, node: &FieldNode) -> Result<(), CollectError> {
        let answer = self.prompter.line(&Prompt::for_field(node))?;
        if answer.is_empty() {
            match &node.default {
                Some(default) => {
                    self.values.insert(node.path.clone(), default.clone());
                }
                None if node.required => {
                    tracing::debug!(path = %node.path, "required field left empty");
                }
                None => {}
            }
            return Ok(());
        }
        match parse_answer(node.kind, &answer) {
            Some(value) => {
                self.values.insert(node.path.clone(), value);
            }
            None => self.prompter.note(&format!(
                "{answer:?} is not a valid {}; {} left unset",
                kind_name(node.kind),
                node.path
            )),
        }
        Ok(())
    }

    fn scalar_list(&mut self, node: &FieldNode, item_kind: FieldKind) -> Result<(), CollectError> {
        let mut prompt = Prompt::for_field(node);
        prompt.label.push_str(" (one per line, empty line to finish)");
        let mut items = Vec::new();
        loop {
            let answer = self.prompter.line(&prompt)?;
            if answer.is_empty() {
                break;
            }
            match parse_answer(item_kind, &answer) {
                Some(value) => items.push(value),
                None => self
                    .prompter
                    .note(&format!("{answer:?} is not a valid {}; try again", kind_name(item_kind))),
            }
            // only the first line offers the default
            prompt.default = None;
        }
        if !items.is_empty() {
            self.values.insert(node.path.clone(), Value::List(items));
        } else if let Some(default) = &node.default {
            self.values.insert(node.path.clone(), default.clone());
        }
        Ok(())
    }

    fn opaque(&mut self, node: &FieldNode, what: &str) {
        tracing::debug!(path = %node.path, "skipping opaque field");
        self.prompter
            .note(&format!("{} is {what}; set it via --set {}.<key>=<value>", node.path, node.path));
    }
}

/// Required fields, and anything under the body section. Metadata is left to
/// name resolution and explicit assignments.
fn in_scope(node: &FieldNode) -> bool {
    let Some(first) = node.path.segments().first() else { return false };
    if first.key == METADATA_SECTION {
        return false;
    }
    node.required || (first.key == BODY_SECTION && first.index.is_none())
}

/// Parses a typed answer; `None` when the text does not fit `kind`.
/// Lists and maps are entered as JSON text.
pub fn parse_answer(kind: FieldKind, text: &str) -> Option<Value> {
    match kind {
        FieldKind::String => Some(Value::String(text.to_string())),
        FieldKind::Integer => text.parse::<i64>().ok().map(Value::Integer),
        FieldKind::Number => match coerce(text) {
            v @ (Value::Integer(_) | Value::Float(_)) => Some(v),
            _ => None,
        },
        FieldKind::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Some(Value::Bool(true)),
            "false" | "no" | "n" => Some(Value::Bool(false)),
            _ => None,
        },
        FieldKind::Array => match serde_json::from_str::<serde_json::Value>(text).ok()? {
            v @ serde_json::Value::Array(_) => Some(Value::from(v)),
            _ => None,
        },
        FieldKind::Object | FieldKind::Map => match serde_json::from_str::<serde_json::Value>(text).ok()? {
            v @ serde_json::Value::Object(_) => Some(Value::from(v)),
            _ => None,
        },
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "string",
        FieldKind::Integer => "integer",
        FieldKind::Number => "number",
        FieldKind::Boolean => "boolean",
        FieldKind::Array => "list",
        FieldKind::Object => "object",
        FieldKind::Map => "map",
    }
}

// ------------------------------- Tests ------------------------------------ //
