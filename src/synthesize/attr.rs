use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::model::{Expr, ObjectItem, is_identifier};

/// Type-constraint keywords written bare after `type =`.
const TYPE_KEYWORDS: &[&str] = &["string", "number", "bool", "list", "set", "map", "object", "tuple", "any"];

/// A whole-string reference such as `${var.region}`.
static SIMPLE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{[A-Za-z0-9._-]+\}$").expect("reference pattern is valid"));

/// Expression for a JSON value in attribute position. `name` is the key the
/// value sits under; list elements have none.
pub(super) fn attribute_expr(name: Option<&str>, value: &Value) -> Expr {
    match value {
        Value::String(text) => string_expr(name, text),
        Value::Array(items) => Expr::tuple(items.iter().map(|item| attribute_expr(None, item)).collect()),
        Value::Object(map) => Expr::object(
            map.iter()
                .map(|(key, value)| ObjectItem { key: object_key(key), value: attribute_expr(Some(key), value) })
                .collect(),
        ),
        scalar => Expr::literal(scalar.clone()),
    }
}

fn string_expr(name: Option<&str>, text: &str) -> Expr {
    if name == Some("type") && TYPE_KEYWORDS.contains(&text) {
        return Expr::ident(text);
    }
    if SIMPLE_REFERENCE.is_match(text) {
        return Expr::opaque(&text[2..text.len() - 1]);
    }
    if text.contains("${") {
        // inserted as-is; the template sequences stay live
        return Expr::opaque(format!("\"{text}\""));
    }
    Expr::string(text)
}

fn object_key(key: &str) -> Expr {
    if is_identifier(key) && !matches!(key, "for" | "in" | "if") {
        Expr::ident(key)
    } else {
        Expr::string(key)
    }
}
