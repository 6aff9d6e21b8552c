//! Confirm-or-override pass over a template seed.
//!
//! Every seed path under the body section that does not step into a list
//! element is offered, alphabetically, with its current value as default.
//! Paths touched by an explicit override are not offered.
use crate::document::ValueMap;
use crate::path::Path;
use crate::prompt::{Prompt, Prompter};
use crate::schema::FieldKind;

use super::{BODY_SECTION, CollectError, parse_answer};

pub fn confirm_or_override(
    seed: &ValueMap,
    overrides: &ValueMap,
    values: &mut ValueMap,
    prompter: &mut dyn Prompter,
) -> Result<(), CollectError> {
    let mut offered: Vec<(String, &Path)> = seed
        .paths()
        .filter(|p| p.is_under(BODY_SECTION) && !p.has_element_step())
        .filter(|p| !overridden(p, overrides))
        .map(|p| (p.to_string(), p))
        .collect();
    offered.sort();
    tracing::info!(fields = offered.len(), "offering template values");

    for (_, path) in offered {
        let Some(current) = seed.get(path) else { continue };
        let kind = FieldKind::of_value(current);
        let answer = prompter.line(&Prompt::new(path.to_string()).with_current(current))?;
        if answer.is_empty() {
            continue;
        }
        match parse_answer(kind, &answer) {
            Some(value) if &value != current => values.replace_subtree(path.clone(), value),
            Some(_) => {}
            None => prompter.note(&format!("{answer:?} does not fit {path}; keeping the template value")),
        }
    }
    Ok(())
}

/// The path itself, anything above it or anything below it was set explicitly.
fn overridden(path: &Path, overrides: &ValueMap) -> bool {
    overrides
        .paths()
        .any(|o| o == path || path.is_descendant_of(o) || o.is_descendant_of(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{assemble, flatten};
    use crate::prompt::ScriptedPrompter;
    use crate::value::Value;
    use serde_json::json;

    fn seed_of(v: serde_json::Value) -> ValueMap {
        match Value::from(v) {
            Value::Map(m) => flatten(&m, &Path::root()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn offers_body_fields_alphabetically_skipping_elements_and_overrides() {
        let seed = seed_of(json!({
            "metadata": { "name": "web" },
            "spec": {
                "replicas": 2,
                "image": "nginx",
                "ports": [{ "port": 80 }],
                "strategy": { "type": "Recreate" },
            },
        }));
        let overrides: ValueMap = [(Path::parse("spec.strategy.type").unwrap(), Value::from("RollingUpdate"))]
            .into_iter()
            .collect();
        let mut values = seed.clone();
        values.overlay(&overrides);

        // image, ports, replicas
        let mut prompter = ScriptedPrompter::new(["", "[{\"port\": 8080}]", "4"]);
        confirm_or_override(&seed, &overrides, &mut values, &mut prompter).unwrap();

        assert_eq!(prompter.labels, [
            "spec.image [current: nginx]",
            "spec.ports [current: [{\"port\":80}]]",
            "spec.replicas [current: 2]",
        ]);
        let doc = assemble(&values);
        assert_eq!(serde_json::Value::from(&Value::Map(doc)), json!({
            "metadata": { "name": "web" },
            "spec": {
                "image": "nginx",
                "ports": [{ "port": 8080 }],
                "replicas": 4,
                "strategy": { "type": "RollingUpdate" },
            },
        }));
    }

    #[test]
    fn mismatched_answers_keep_the_template_value() {
        let seed = seed_of(json!({ "spec": { "replicas": 2 } }));
        let mut values = seed.clone();
        let mut prompter = ScriptedPrompter::new(["lots"]);
        confirm_or_override(&seed, &ValueMap::new(), &mut values, &mut prompter).unwrap();
        assert_eq!(values, seed);
        assert_eq!(prompter.notes.len(), 1);
    }
}
