//! Dynamic configuration tree model
//!
//! A configuration is a heterogeneous, arbitrarily nested mapping from string
//! keys to JSON-like values. There is no fixed schema; keys are validated
//! against the option registry only. The `preserve_order` feature keeps the
//! user's key order intact, while `Map` equality stays key-order-insensitive
//! and array equality stays order-sensitive, which is exactly the deep
//! equality the migration fixpoint check needs.

use serde_json::{Map, Value};

/// A single level of a configuration tree
pub type ConfigNode = Map<String, Value>;

/// Merge `child` into `parent`, child-overrides-parent.
///
/// Nested objects are deep-merged key by key (later wins per leaf); scalar
/// and array values on the child side fully replace the parent's value.
pub fn merge_child_over_parent(parent: &mut ConfigNode, child: &ConfigNode) {
    for (key, child_value) in child {
        match (parent.get_mut(key), child_value) {
            (Some(Value::Object(parent_obj)), Value::Object(child_obj)) => {
                merge_child_over_parent(parent_obj, child_obj);
            }
            _ => {
                parent.insert(key.clone(), child_value.clone());
            }
        }
    }
}

/// Apply a string rewrite to every string value in the tree, including
/// strings nested inside arrays and objects. Keys are not rewritten.
pub fn rewrite_strings(value: &mut Value, rewrite: &dyn Fn(&str) -> Option<String>) {
    match value {
        Value::String(s) => {
            if let Some(replacement) = rewrite(s) {
                *s = replacement;
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_strings(item, rewrite);
            }
        }
        Value::Object(obj) => {
            for (_, nested) in obj.iter_mut() {
                rewrite_strings(nested, rewrite);
            }
        }
        _ => {}
    }
}

/// Convenience accessor: the value at `key` as an object, if it is one
pub fn get_object<'a>(node: &'a ConfigNode, key: &str) -> Option<&'a ConfigNode> {
    node.get(key).and_then(Value::as_object)
}

/// Convenience accessor: the value at `key` as an array, if it is one
pub fn get_array<'a>(node: &'a ConfigNode, key: &str) -> Option<&'a Vec<Value>> {
    node.get(key).and_then(Value::as_array)
}
