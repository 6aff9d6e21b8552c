//! Text → typed value, used for `--set` values and free-form prompt answers.
//!
//! Strict priority: boolean > integer > float (only with a literal `.`) > string.
use crate::value::Value;

pub fn coerce(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Integer(i);
    }
    if text.contains('.') {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::String(text.to_string())
}
