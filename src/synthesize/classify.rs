//! Block-or-attribute decision for one JSON field.
//!
//! A total, purely structural heuristic. The checks run in a fixed order and
//! the first one that applies decides; reordering them changes output for
//! existing documents.
use serde_json::{Map, Value};

// ------------------------------- Policy ---------------------------------- //

/// Keys whose non-empty list values are always blocks.
const LIST_BLOCK_TYPES: &[&str] = &[
    "resource",
    "data",
    "provider",
    "output",
    "locals",
    "module",
    "terraform",
    "attribute",
    "global_secondary_index",
    "local_secondary_index",
    "backup_policy",
    "point_in_time_recovery",
    "server_side_encryption",
    "stream_specification",
    "ttl",
];

/// Keys whose object values are blocks under [`Dialect::BlockPreferring`].
const OBJECT_BLOCK_TYPES: &[&str] = &["variable", "output", "locals", "provider", "resource", "data", "module", "terraform"];

// ------------------------------- Dialect --------------------------------- //

/// How eagerly JSON structure turns into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Configuration files: well-known top-level keys become blocks.
    #[default]
    BlockPreferring,
    /// Variable-definition files (`.tfvars`): only list signatures do.
    NestPreferring,
}

impl Dialect {
    /// `.tfvars` outputs are nest-preferring, everything else block-preferring.
    pub fn for_output_name(name: &str) -> Self {
        if name.ends_with(".tfvars") {
            Dialect::NestPreferring
        } else {
            Dialect::BlockPreferring
        }
    }
}

// ------------------------------ Decision --------------------------------- //

pub fn is_block_shaped(key: &str, value: &Value, dialect: Dialect) -> bool {
    match value {
        Value::Array(items) => list_is_blocks(key, items, dialect),
        Value::Object(_) => dialect == Dialect::BlockPreferring && OBJECT_BLOCK_TYPES.contains(&key),
        _ => false,
    }
}

fn list_is_blocks(key: &str, items: &[Value], dialect: Dialect) -> bool {
    let Some(first) = items.first() else {
        return false;
    };
    if key == "variable" {
        return dialect == Dialect::BlockPreferring;
    }
    if LIST_BLOCK_TYPES.contains(&key) {
        return true;
    }
    match first {
        Value::Object(first) => has_nested_signature(first),
        _ => false,
    }
}

/// `{"k": [{"k2": …}]}`: one key holding a one-element list of a one-key
/// object.
fn has_nested_signature(obj: &Map<String, Value>) -> bool {
    let mut entries = obj.values();
    let (Some(Value::Array(list)), None) = (entries.next(), entries.next()) else {
        return false;
    };
    matches!(list.as_slice(), [Value::Object(inner)] if inner.len() == 1)
}
