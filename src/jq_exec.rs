//! jq filters over template documents (jaq engine).
use jaq_core::{Compiler, Ctx, RcIter, compile::Undefined, load};
use jaq_json::Val;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::value::{Document, Value};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid jq filter:\n{0}")]
    Parse(String),
    #[error("invalid jq filter:\n{0}")]
    Compile(String),
    #[error("jq filter failed: {0}")]
    Runtime(String),
    #[error("jq filter produced invalid JSON: {0}")]
    Output(#[from] serde_json::Error),
    #[error("template filter must produce exactly one object, got {0} outputs")]
    OutputCount(usize),
    #[error("template filter must produce an object")]
    NotAnObject,
}

/// Runs `filter_src` over `input`, collecting every output.
pub fn run_jaq(filter_src: &str, input: &JsonValue) -> Result<Vec<JsonValue>, FilterError> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    while let Some(item) = it.next() {
        let v = item.map_err(|e| FilterError::Runtime(format!("{e:?}")))?;
        // Val's Display is JSON text
        out.push(serde_json::from_str(&v.to_string())?);
    }
    Ok(out)
}

/// Applies a template filter; it must yield exactly one object.
pub fn filter_template(filter_src: &str, doc: &Document) -> Result<Document, FilterError> {
    let input = JsonValue::from(&Value::Map(doc.clone()));
    let mut outputs = run_jaq(filter_src, &input)?;
    if outputs.len() != 1 {
        return Err(FilterError::OutputCount(outputs.len()));
    }
    match outputs.pop().map(Value::from) {
        Some(Value::Map(map)) => Ok(map),
        _ => Err(FilterError::NotAnObject),
    }
}

fn format_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> FilterError {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    FilterError::Parse(s)
}

fn format_undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> FilterError {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    FilterError::Compile(s)
}
