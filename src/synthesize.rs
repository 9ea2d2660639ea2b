//! JSON document → HCL tree.
//!
//! Each field is classified as block-shaped or not. Block-shaped fields are
//! turned into blocks all-or-nothing: if any instance under the key fails to
//! have a block shape, everything produced for the key is discarded and the
//! whole value is written as one attribute instead. That fallback is logged
//! at debug level and never fails the document.
mod attr;
mod classify;
mod extract;

use serde_json::{Map, Value};

use crate::error::{Error, Result, kind_name};
use crate::model::{Block, Body};

pub use classify::{Dialect, is_block_shaped};

use attr::attribute_expr;
use extract::{Mismatch, extract_labels_and_content};

/// The document root must be an object.
pub fn synthesize_document(doc: &Value, dialect: Dialect) -> Result<Body> {
    let Value::Object(fields) = doc else {
        return Err(Error::NotAnObject(kind_name(doc)));
    };
    Ok(body_from_fields(fields, dialect))
}

fn body_from_fields(fields: &Map<String, Value>, dialect: Dialect) -> Body {
    let mut body = Body::new();
    for (key, value) in fields {
        if key == "//" {
            tracing::debug!("dropping \"//\" comment property");
            continue;
        }
        emit_field(&mut body, key, value, dialect);
    }
    body
}

fn emit_field(body: &mut Body, key: &str, value: &Value, dialect: Dialect) {
    let blocks = match value {
        Value::Array(items) if is_block_shaped(key, value, dialect) => list_blocks(key, items, dialect),
        Value::Object(map) if is_block_shaped(key, value, dialect) => object_blocks(key, map, dialect),
        _ => {
            body.set_attribute(key, attribute_expr(Some(key), value));
            return;
        }
    };
    match blocks {
        Ok(blocks) => blocks.into_iter().for_each(|block| body.push_block(block)),
        Err(Mismatch(reason)) => {
            tracing::debug!(key, %reason, "not block-shaped, writing as attribute");
            body.set_attribute(key, attribute_expr(Some(key), value));
        }
    }
}

/// One block per list element.
fn list_blocks(key: &str, items: &[Value], dialect: Dialect) -> std::result::Result<Vec<Block>, Mismatch> {
    items
        .iter()
        .map(|instance| {
            let (labels, content) = extract_labels_and_content(instance)?;
            Ok(Block::new(key, labels, body_from_fields(&content, dialect)))
        })
        .collect()
}

/// Labels are the object keys on the way down.
fn object_blocks(key: &str, map: &Map<String, Value>, dialect: Dialect) -> std::result::Result<Vec<Block>, Mismatch> {
    if map.is_empty() {
        return Err(Mismatch(format!("{key} is an empty object")));
    }
    let mut blocks = Vec::new();
    for (label, value) in map {
        labelled_blocks(key, vec![label.clone()], value, dialect, &mut blocks)?;
    }
    Ok(blocks)
}

fn labelled_blocks(
    key: &str,
    labels: Vec<String>,
    value: &Value,
    dialect: Dialect,
    out: &mut Vec<Block>,
) -> std::result::Result<(), Mismatch> {
    match value {
        Value::Array(list) => match list.as_slice() {
            [Value::Object(content)] => {
                out.push(Block::new(key, labels, body_from_fields(content, dialect)));
                Ok(())
            }
            _ => Err(Mismatch(format!("{key} {labels:?} is a list that is not a single object"))),
        },
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_array) => {
            for (label, child) in map {
                let mut labels = labels.clone();
                labels.push(label.clone());
                labelled_blocks(key, labels, child, dialect, out)?;
            }
            Ok(())
        }
        Value::Object(content) => {
            out.push(Block::new(key, labels, body_from_fields(content, dialect)));
            Ok(())
        }
        other => Err(Mismatch(format!("{key} {labels:?} is {}", kind_name(other)))),
    }
}
