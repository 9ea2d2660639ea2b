use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::kind_name;

/// A JSON value that does not have the shape a block needs. Recovered by the
/// caller, never surfaced.
#[derive(Debug, Error)]
#[error("{0}")]
pub(super) struct Mismatch(pub String);

/// Split one block instance into its labels and its body content.
///
/// Labels are read off chains of one-key objects holding one-element lists:
/// `{"a": [{"b": [{…}]}]}` yields labels `a, b`, and further levels are taken
/// in pairs while the same shape repeats. A lone `{"a": [{…}]}` yields the
/// single label `a`. Anything else is unlabelled content.
pub(super) fn extract_labels_and_content(instance: &Value) -> Result<(Vec<String>, Map<String, Value>), Mismatch> {
    let Value::Object(obj) = instance else {
        return Err(Mismatch(format!("block instance is {}", kind_name(instance))));
    };
    let mut labels = Vec::new();
    let mut content = obj;
    while let Some((outer, inner, rest)) = label_pair(content) {
        labels.push(outer.to_string());
        labels.push(inner.to_string());
        content = rest;
    }
    if labels.is_empty() {
        if let Some((label, rest)) = single_label(obj) {
            return Ok((vec![label.to_string()], rest.clone()));
        }
    }
    Ok((labels, content.clone()))
}

/// `{k: [{k2: [inner]}]}` → `(k, k2, inner)`.
fn label_pair(obj: &Map<String, Value>) -> Option<(&str, &str, &Map<String, Value>)> {
    let (outer, middle) = single_label(obj)?;
    let (inner, rest) = single_label(middle)?;
    Some((outer, inner, rest))
}

/// `{k: [o]}` with `o` an object → `(k, o)`.
fn single_label(obj: &Map<String, Value>) -> Option<(&str, &Map<String, Value>)> {
    let mut entries = obj.iter();
    let (Some((key, Value::Array(list))), None) = (entries.next(), entries.next()) else {
        return None;
    };
    match list.as_slice() {
        [Value::Object(o)] => Some((key.as_str(), o)),
        _ => None,
    }
}
