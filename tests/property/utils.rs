use proptest::prelude::*;
use serde_json::{Number, Value};

pub fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| Value::Number(Number::from(i))),
        "[a-z]{0,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::Array)
    })
}

/// Positional call arguments
pub fn args() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(json_value(), 0..4)
}

/// Distinct method names
pub fn method_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9_]{0,6}", 1..5)
        .prop_map(|names| names.into_iter().collect())
}
