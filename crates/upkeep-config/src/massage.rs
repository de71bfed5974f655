//! Shape normalization of configuration values
//!
//! Massaging is independent of migration: it coerces value shapes (bare
//! string to one-element array, shorthand update-type blocks into explicit
//! packageRules) without renaming or removing options. It is idempotent by
//! construction, so no fixpoint loop is needed.

use crate::node::ConfigNode;
use crate::options;
use serde_json::{Value, json};

/// Update-type shorthand keys expanded into sibling packageRules
const UPDATE_TYPE_KEYS: &[&str] = &["major", "minor", "patch", "pin", "digest", "rollback"];

/// Registry line written in place of a raw npmToken value
const NPM_TOKEN_RC: &str = "//registry.npmjs.org/:_authToken=";

/// Normalize a config tree's value shapes. Pure; returns a new tree.
pub fn massage(config: &ConfigNode) -> ConfigNode {
    massage_node(config)
}

fn massage_node(config: &ConfigNode) -> ConfigNode {
    let mut result = ConfigNode::new();
    for (key, value) in config {
        // A raw npm token becomes an npmrc registry directive
        if key == "npmToken"
            && let Some(token) = value.as_str()
            && token.len() < 50
            && !token.contains('=')
        {
            result.insert("npmrc".to_string(), json!(format!("{NPM_TOKEN_RC}{token}")));
            continue;
        }
        let massaged = match value {
            Value::String(s) if options::allows_string(key) => json!([s]),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(nested) => Value::Object(massage_node(nested)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            // Encrypted blobs are opaque and never descended into
            Value::Object(nested) if key != "encrypted" => Value::Object(massage_node(nested)),
            other => other.clone(),
        };
        result.insert(key.clone(), massaged);
    }
    // packageRules can sit at any level (manager blocks carry them too)
    expand_update_types(&mut result);
    result
}

/// Expand update-type shorthand inside packageRules: each rule carrying a
/// `major`/`minor`/... object gets a synthesized sibling rule scoped by
/// `matchUpdateTypes`, carrying only the original rule's match/exclude
/// selectors plus the shorthand block's own content. All update-type keys are
/// stripped from every rule afterwards.
fn expand_update_types(result: &mut ConfigNode) {
    let Some(Value::Array(rules)) = result.get("packageRules").cloned() else {
        return;
    };
    let mut expanded: Vec<Value> = Vec::with_capacity(rules.len());
    for rule in rules {
        let Value::Object(rule_obj) = rule else {
            expanded.push(rule);
            continue;
        };
        let mut synthesized: Vec<Value> = Vec::new();
        for update_type in UPDATE_TYPE_KEYS {
            if let Some(Value::Object(block)) = rule_obj.get(*update_type) {
                let mut new_rule = ConfigNode::new();
                for (key, value) in &rule_obj {
                    if key.starts_with("match") || key.starts_with("exclude") {
                        new_rule.insert(key.clone(), value.clone());
                    }
                }
                new_rule.insert("matchUpdateTypes".to_string(), json!([update_type]));
                for (key, value) in block {
                    new_rule.insert(key.clone(), value.clone());
                }
                synthesized.push(Value::Object(new_rule));
            }
        }
        let mut stripped = rule_obj;
        for update_type in UPDATE_TYPE_KEYS {
            stripped.remove(*update_type);
        }
        expanded.push(Value::Object(stripped));
        expanded.extend(synthesized);
    }
    result.insert("packageRules".to_string(), Value::Array(expanded));
}
