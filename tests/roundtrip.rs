//! Plain attribute data survives JSON → HCL → JSON unchanged.
use json_hcl::{Dialect, hcl_to_json, json_to_hcl};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Names with a block meaning in at least one dialect, or that collide with
/// template keywords.
const RESERVED: &[&str] = &[
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
    "variable",
    "for",
    "in",
    "if",
];

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("reserved name", |k| !RESERVED.contains(&k.as_str()))
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-zA-Z0-9 _.,:/-]{0,12}".prop_map(Value::from),
    ]
}

/// Scalars, scalar lists and nested objects. Lists of objects are left out:
/// a one-key object holding a one-key object list reads as a block.
fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![scalar(), prop::collection::vec(scalar(), 0..4).prop_map(Value::Array)];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec((key(), inner), 0..4).prop_map(|entries| Value::Object(entries.into_iter().collect()))
    })
}

fn document() -> impl Strategy<Value = Value> {
    prop::collection::vec((key(), value()), 0..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>()))
}

proptest! {
    #[test]
    fn attributes_round_trip(doc in document()) {
        let hcl = json_to_hcl(&doc.to_string(), Dialect::NestPreferring).unwrap();
        let back = hcl_to_json(&hcl).unwrap();
        prop_assert_eq!(back, doc, "rendered:\n{}", hcl);
    }
}
