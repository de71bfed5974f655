//! Recursive-descent validation of a resolved configuration
//!
//! The walk never short-circuits: every key is checked and the full set of
//! errors and warnings comes back in one pass, sorted by (topic, message).
//! Errors are blocking; warnings are advisory.

use crate::collaborators::{
    DefaultManagers, DefaultScheduleValidator, DefaultTemplateCompiler, ManagerProvider,
    ScheduleValidator, TemplateCompiler, is_supported_timezone,
};
use crate::diagnostics::ValidationResult;
use crate::migrate::migrate;
use crate::node::{self, ConfigNode};
use crate::options::{self, OptionType};
use crate::presets::{self, PresetSource};
use regex::Regex;
use serde_json::{Value, json};

const ERROR_TOPIC: &str = "Configuration Error";
const DEPRECATION_TOPIC: &str = "Deprecation Warning";

/// Keys compiled as templates even without a `Template` suffix
const TEMPLATE_KEYS: &[&str] = &[
    "commitMessage",
    "commitBody",
    "commitMessagePrefix",
    "prTitle",
    "prBody",
    "prHeader",
    "prFooter",
    "semanticCommitScope",
    "branchTopic",
    "dependencyDashboardTitle",
    "dependencyDashboardHeader",
    "dependencyDashboardFooter",
];

/// Keys whose direct editing earns a deprecation warning
const DEPRECATED_KEYS: &[(&str, &str)] = &[
    (
        "prBody",
        "Direct editing of prBody is deprecated; use prHeader, prFooter, and prBodyTemplate instead",
    ),
    (
        "azureAutoComplete",
        "azureAutoComplete is deprecated; use platformAutomerge instead",
    ),
    (
        "gitLabAutomerge",
        "gitLabAutomerge is deprecated; use platformAutomerge instead",
    ),
];

/// Lookup-affecting options that are applied too late to combine with
/// matchUpdateTypes
const LOOKUP_OPTIONS: &[&str] = &[
    "allowedVersions",
    "extractVersion",
    "ignoreDeps",
    "rangeStrategy",
    "registryUrls",
    "versioning",
];

/// Fields permitted inside a regexManagers entry
const REGEX_MANAGER_FIELDS: &[&str] = &[
    "fileMatch",
    "matchStrings",
    "matchStringsStrategy",
    "depNameTemplate",
    "packageNameTemplate",
    "datasourceTemplate",
    "versioningTemplate",
    "currentValueTemplate",
    "extractVersionTemplate",
    "registryUrlTemplate",
];

/// Fields a regexManagers entry must be able to produce, either through a
/// template override or a named capture group
const REGEX_MANAGER_MANDATORY: &[&str] = &["depName", "currentValue", "datasource"];

/// Object keys validated as flat string maps
const FLAT_STRING_MAPS: &[&str] = &["registryAliases", "customEnvVariables", "migratePresets", "secrets"];

/// Collaborators needed by the validator
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub templates: &'a dyn TemplateCompiler,
    pub schedules: &'a dyn ScheduleValidator,
    pub managers: &'a dyn ManagerProvider,
}

impl Default for ValidationContext<'_> {
    fn default() -> Self {
        Self {
            templates: &DefaultTemplateCompiler,
            schedules: &DefaultScheduleValidator,
            managers: &DefaultManagers,
        }
    }
}

/// Validate a configuration tree
pub fn validate(
    config: &ConfigNode,
    is_preset: bool,
    parent_path: Option<&str>,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    walk(config, config, is_preset, parent_path, ctx, &mut result);
    result.sort();
    tracing::debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "config validation finished"
    );
    result
}

/// The enclosing object's key name, with any `[index]` suffix stripped
fn enclosing_key(parent_path: Option<&str>) -> Option<String> {
    let path = parent_path?;
    let last = path.rsplit('.').next().unwrap_or(path);
    Some(match last.split_once('[') {
        Some((base, _)) => base.to_string(),
        None => last.to_string(),
    })
}

fn is_selector(key: &str) -> bool {
    (key.starts_with("match") || key.starts_with("exclude"))
        && options::descriptor(key).is_some_and(|d| d.parent == Some("packageRules"))
}

/// A value that looks like a regex-style pattern: `/re/` or `!/re/`
fn regex_style_value(value: &str) -> Option<&str> {
    let stripped = value.strip_prefix('!').unwrap_or(value);
    stripped
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
}

#[allow(clippy::too_many_lines)]
fn walk(
    config: &ConfigNode,
    root: &ConfigNode,
    is_preset: bool,
    parent_path: Option<&str>,
    ctx: &ValidationContext<'_>,
    result: &mut ValidationResult,
) {
    let top_level_only: Vec<&str> = ctx
        .managers
        .managers()
        .iter()
        .chain(ctx.managers.languages().iter())
        .copied()
        .collect();

    for (key, value) in config {
        let path = match parent_path {
            Some(parent) => format!("{parent}.{key}"),
            None => key.clone(),
        };

        if key == "__proto__" {
            result.error(
                "Config security error",
                "Remove the __proto__ configuration",
            );
            continue;
        }

        if parent_path.is_some() && top_level_only.contains(&key.as_str()) {
            result.error(
                ERROR_TOPIC,
                format!("The \"{key}\" object can only be configured at the top level of a config"),
            );
            continue;
        }

        if key == "enabledManagers"
            && let Value::Array(entries) = value
        {
            for entry in entries {
                match entry.as_str() {
                    Some(manager) if ctx.managers.managers().contains(&manager) => {}
                    Some(manager) => result.error(
                        ERROR_TOPIC,
                        format!("The following manager configured in enabledManagers is not supported: \"{manager}\""),
                    ),
                    None => result.error(
                        ERROR_TOPIC,
                        "enabledManagers entries must be strings".to_string(),
                    ),
                }
            }
        }

        if key == "fileMatch" && parent_path.is_none() {
            result.error(
                ERROR_TOPIC,
                "\"fileMatch\" may not be defined at the top level of a config and must instead be within a manager block",
            );
        }

        if key.ends_with("Template") || TEMPLATE_KEYS.contains(&key.as_str()) {
            match value.as_str() {
                Some(template) => {
                    // Compile three times in sequence, feeding output back in,
                    // to surface errors from doubly-nested template expressions
                    let mut current = template.to_string();
                    for _ in 0..3 {
                        match ctx.templates.compile(&current, root, true) {
                            Ok(compiled) => current = compiled,
                            Err(e) => {
                                result.error(
                                    ERROR_TOPIC,
                                    format!("Invalid template in config path: {path} ({e})"),
                                );
                                break;
                            }
                        }
                    }
                }
                None => result.error(
                    ERROR_TOPIC,
                    format!("Configuration option \"{path}\" should be a string"),
                ),
            }
        }

        if let Some((_, message)) = DEPRECATED_KEYS.iter().find(|(k, _)| k == key) {
            result.warn(DEPRECATION_TOPIC, *message);
        }

        let Some(descriptor) = options::descriptor(key) else {
            result.error(
                ERROR_TOPIC,
                format!("Invalid configuration option: {path}"),
            );
            continue;
        };

        let enclosing = enclosing_key(parent_path);

        if is_selector(key) {
            let at_preset_top = is_preset && parent_path.is_none();
            if enclosing.as_deref() != Some("packageRules") && !at_preset_top {
                result.error(
                    ERROR_TOPIC,
                    format!("{key}: selectors may only be used within a packageRules object"),
                );
            }
        } else if let Some(required_parent) = descriptor.parent
            && !is_preset
            && enclosing.as_deref() != Some(required_parent)
        {
            result.warn(
                ERROR_TOPIC,
                format!(
                    "{key} should only be configured within a \"{required_parent}\" object. Was found in {}",
                    enclosing.as_deref().unwrap_or("the top level")
                ),
            );
        }

        match descriptor.option_type {
            OptionType::Boolean => {
                if !value.is_boolean() {
                    result.error(
                        ERROR_TOPIC,
                        format!("Configuration option \"{path}\" should be boolean. Found: {value}"),
                    );
                }
            }
            OptionType::Integer => {
                if !value.is_i64() && !value.is_u64() {
                    result.error(
                        ERROR_TOPIC,
                        format!("Configuration option \"{path}\" should be an integer. Found: {value}"),
                    );
                }
            }
            OptionType::String => validate_string_option(key, &path, value, ctx, result),
            OptionType::Array => {
                validate_array_option(key, &path, value, descriptor.allow_string, is_preset, root, ctx, result);
            }
            OptionType::Object => {
                validate_object_option(key, &path, value, descriptor.free_choice, is_preset, root, ctx, result);
            }
        }
    }
}

fn validate_string_option(
    key: &str,
    path: &str,
    value: &Value,
    ctx: &ValidationContext<'_>,
    result: &mut ValidationResult,
) {
    if key == "timezone" {
        let (valid, message) = ctx.schedules.has_valid_timezone(value);
        if !valid && let Some(message) = message {
            result.error(ERROR_TOPIC, message);
        }
        return;
    }
    let Some(s) = value.as_str() else {
        result.error(
            ERROR_TOPIC,
            format!("Configuration option \"{path}\" should be a string. Found: {value}"),
        );
        return;
    };
    // Version-constraint fields accept a regex-style value; check its syntax
    if (key == "allowedVersions" || key == "matchCurrentVersion")
        && let Some(pattern) = regex_style_value(s)
        && Regex::new(pattern).is_err()
    {
        result.error(
            ERROR_TOPIC,
            format!("Invalid regExp for {path}: `{s}`"),
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_array_option(
    key: &str,
    path: &str,
    value: &Value,
    allow_string: bool,
    is_preset: bool,
    root: &ConfigNode,
    ctx: &ValidationContext<'_>,
    result: &mut ValidationResult,
) {
    if key == "schedule" {
        let (valid, message) = ctx.schedules.has_valid_schedule(value);
        if !valid && let Some(message) = message {
            result.error(ERROR_TOPIC, message);
        }
        return;
    }
    let entries = match value {
        Value::Array(entries) => entries,
        Value::String(_) if allow_string => return,
        _ => {
            result.error(
                ERROR_TOPIC,
                format!("Configuration option \"{path}\" should be a list (Array). Found: {value}"),
            );
            return;
        }
    };

    match key {
        "extends" => validate_extends(path, entries, result),
        "packageRules" => {
            validate_package_rules(path, entries, is_preset, root, ctx, result);
        }
        "regexManagers" => validate_regex_managers(path, entries, result),
        "matchPackagePatterns" | "excludePackagePatterns" | "fileMatch" => {
            for entry in entries {
                match entry.as_str() {
                    Some(pattern) => {
                        if Regex::new(pattern).is_err() {
                            result.error(
                                ERROR_TOPIC,
                                format!("Invalid regExp for {path}: `{pattern}`"),
                            );
                        }
                    }
                    None => result.error(
                        ERROR_TOPIC,
                        format!("{path} entries must be strings"),
                    ),
                }
            }
        }
        _ => {
            for (index, entry) in entries.iter().enumerate() {
                if let Value::Object(nested) = entry {
                    let entry_path = format!("{path}[{index}]");
                    walk(nested, root, is_preset, Some(entry_path.as_str()), ctx, result);
                }
            }
        }
    }
}

fn validate_extends(path: &str, entries: &[Value], result: &mut ValidationResult) {
    let inside_package_rule = path.contains("packageRules");
    for entry in entries {
        let Some(preset) = entry.as_str() else {
            result.error(
                ERROR_TOPIC,
                format!("{path}: extends entries must be strings"),
            );
            continue;
        };
        if inside_package_rule && preset.starts_with("group:") {
            result.warn(
                ERROR_TOPIC,
                format!("{path}: you should not extend \"group:\" presets within a packageRule"),
            );
        }
        // ":timezone(<tz>)" carries its argument in the preset name
        if let Some(rest) = preset.strip_prefix(":timezone(")
            && let Some(tz) = rest.strip_suffix(')')
            && !is_supported_timezone(tz)
        {
            result.error(
                ERROR_TOPIC,
                format!("{path}: invalid timezone within preset \"{preset}\": {tz}"),
            );
        }
    }
}

/// Each packageRules entry is migrated and has its internal presets merged
/// in isolation before its semantic rules are checked
fn validate_package_rules(
    path: &str,
    entries: &[Value],
    is_preset: bool,
    root: &ConfigNode,
    ctx: &ValidationContext<'_>,
    result: &mut ValidationResult,
) {
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = format!("{path}[{index}]");
        let Value::Object(rule) = entry else {
            result.error(
                ERROR_TOPIC,
                format!("{entry_path}: packageRules must contain JSON objects"),
            );
            continue;
        };

        // Migrate the rule inside a packageRules wrapper so legacy selector
        // names are renamed the same way they would be in a full config
        let mut wrapper = ConfigNode::new();
        wrapper.insert("packageRules".to_string(), json!([entry.clone()]));
        let migrated = match migrate(&wrapper) {
            Ok(outcome) => outcome
                .result
                .get("packageRules")
                .and_then(Value::as_array)
                .and_then(|rules| rules.first())
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_else(|| rule.clone()),
            Err(e) => {
                result.error(ERROR_TOPIC, format!("{entry_path}: {e}"));
                continue;
            }
        };
        let resolved = resolve_internal_extends(migrated);

        let has_selector = resolved.keys().any(|k| is_selector(k));
        let has_setting = resolved
            .keys()
            .any(|k| !is_selector(k) && k != "description" && k != "extends");
        if !has_selector {
            result.error(
                ERROR_TOPIC,
                format!("{entry_path}: Each packageRule must contain at least one match* or exclude* selector"),
            );
        }
        if !has_setting {
            result.error(
                ERROR_TOPIC,
                format!("{entry_path}: Each packageRule must contain at least one non-selector configuration option"),
            );
        }
        if resolved.contains_key("matchUpdateTypes") {
            for option in LOOKUP_OPTIONS {
                if resolved.contains_key(*option) {
                    result.error(
                        ERROR_TOPIC,
                        format!(
                            "{entry_path}: packageRules cannot combine both matchUpdateTypes and {option}. Rule: {}",
                            Value::Object(resolved.clone())
                        ),
                    );
                }
            }
        }

        walk(rule, root, is_preset, Some(entry_path.as_str()), ctx, result);
    }
}

/// Merge internal (in-process) presets referenced by a rule's `extends`;
/// remote presets are left for the resolver and not fetched here
fn resolve_internal_extends(rule: ConfigNode) -> ConfigNode {
    let Some(extends) = node::get_array(&rule, "extends").cloned() else {
        return rule;
    };
    let mut merged = ConfigNode::new();
    for entry in &extends {
        let Some(preset) = entry.as_str() else {
            continue;
        };
        if let Ok(reference) = presets::parse_preset(preset)
            && reference.source == PresetSource::Internal
            && let Some(content) = presets::internal_preset(&reference.repo, &reference.preset_name)
        {
            node::merge_child_over_parent(&mut merged, &content);
        }
    }
    node::merge_child_over_parent(&mut merged, &rule);
    merged
}

fn validate_regex_managers(path: &str, entries: &[Value], result: &mut ValidationResult) {
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = format!("{path}[{index}]");
        let Value::Object(manager) = entry else {
            result.error(
                ERROR_TOPIC,
                format!("{entry_path}: regexManagers must contain JSON objects"),
            );
            continue;
        };

        for key in manager.keys() {
            if !REGEX_MANAGER_FIELDS.contains(&key.as_str()) {
                result.error(
                    ERROR_TOPIC,
                    format!("{entry_path}: unsupported regexManagers field \"{key}\""),
                );
            }
        }

        let mut patterns: Vec<String> = Vec::new();
        match manager.get("matchStrings") {
            Some(Value::Array(strings)) if !strings.is_empty() => {
                for string in strings {
                    match string.as_str() {
                        Some(pattern) => {
                            if Regex::new(pattern).is_ok() {
                                patterns.push(pattern.to_string());
                            } else {
                                result.error(
                                    ERROR_TOPIC,
                                    format!("{entry_path}: Invalid regExp for matchStrings: `{pattern}`"),
                                );
                            }
                        }
                        None => result.error(
                            ERROR_TOPIC,
                            format!("{entry_path}: matchStrings entries must be strings"),
                        ),
                    }
                }
            }
            _ => {
                result.error(
                    ERROR_TOPIC,
                    format!("{entry_path}: Each regexManager must contain a non-empty matchStrings array"),
                );
            }
        }

        for field in REGEX_MANAGER_MANDATORY {
            let template_key = format!("{field}Template");
            let via_template = manager.contains_key(&template_key);
            let via_capture = patterns
                .iter()
                .any(|p| p.contains(&format!("(?<{field}>")));
            if !via_template && !via_capture {
                result.error(
                    ERROR_TOPIC,
                    format!(
                        "{entry_path}: regexManagers must provide {field} via a named capture group or {template_key}"
                    ),
                );
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_object_option(
    key: &str,
    path: &str,
    value: &Value,
    free_choice: bool,
    is_preset: bool,
    root: &ConfigNode,
    ctx: &ValidationContext<'_>,
    result: &mut ValidationResult,
) {
    let Value::Object(nested) = value else {
        result.error(
            ERROR_TOPIC,
            format!("Configuration option \"{path}\" should be a json object"),
        );
        return;
    };
    if FLAT_STRING_MAPS.contains(&key) {
        for (map_key, map_value) in nested {
            match map_value.as_str() {
                Some(url) if key == "registryAliases" => {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        result.error(
                            ERROR_TOPIC,
                            format!("Invalid url for {path}.{map_key}: `{url}`"),
                        );
                    }
                }
                Some(_) => {}
                None => result.error(
                    ERROR_TOPIC,
                    format!("Invalid `{path}.{map_key}` configuration: value must be a string"),
                ),
            }
        }
        return;
    }
    if free_choice {
        return;
    }
    walk(nested, root, is_preset, Some(path), ctx, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> ConfigNode {
        value.as_object().cloned().unwrap()
    }

    fn validate_default(config: &ConfigNode) -> ValidationResult {
        validate(config, false, None, &ValidationContext::default())
    }

    #[test]
    fn clean_config_yields_no_errors() {
        let result = validate_default(&obj(json!({
            "extends": ["config:base"],
            "automerge": false,
            "timezone": "Europe/Berlin",
            "schedule": ["before 3am"],
            "labels": ["dependencies"],
            "packageRules": [{"matchPackageNames": ["lodash"], "enabled": false}]
        })));
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn proto_key_is_a_security_error() {
        let result = validate_default(&obj(json!({"__proto__": {"x": 1}})));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].topic, "Config security error");
    }

    #[test]
    fn unknown_option_is_an_error() {
        let result = validate_default(&obj(json!({"notARealOption": true})));
        assert_eq!(result.errors.len(), 1);
        assert!(
            result.errors[0]
                .message
                .contains("Invalid configuration option: notARealOption")
        );
    }

    #[test]
    fn walk_collects_all_independent_errors() {
        let result = validate_default(&obj(json!({
            "notARealOption": true,
            "fileMatch": ["(unclosed"]
        })));
        // Unknown key, top-level fileMatch, and the bad pattern all surface
        assert!(result.errors.len() >= 3, "errors: {:?}", result.errors);
    }

    #[test]
    fn errors_are_sorted_deterministically() {
        let result = validate_default(&obj(json!({
            "zzzNotReal": true,
            "aaaNotReal": true
        })));
        let messages: Vec<_> = result.errors.iter().map(|e| e.message.clone()).collect();
        let mut sorted = messages.clone();
        sorted.sort();
        assert_eq!(messages, sorted);
    }

    #[test]
    fn type_mismatches_are_reported() {
        let result = validate_default(&obj(json!({
            "automerge": "yes",
            "prConcurrentLimit": "five",
            "branchPrefix": 42
        })));
        assert_eq!(result.errors.len(), 3, "errors: {:?}", result.errors);
    }

    #[test]
    fn manager_blocks_may_only_be_top_level() {
        let result = validate_default(&obj(json!({
            "npm": {"cargo": {"enabled": false}}
        })));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("\"cargo\" object"));
    }

    #[test]
    fn enabled_managers_must_be_known() {
        let result = validate_default(&obj(json!({"enabledManagers": ["npm", "left-pad"]})));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("left-pad"));
    }

    #[test]
    fn file_match_requires_a_manager_block() {
        let top = validate_default(&obj(json!({"fileMatch": ["^Dockerfile$"]})));
        assert_eq!(top.errors.len(), 1);
        let nested = validate_default(&obj(json!({"dockerfile": {"fileMatch": ["^Dockerfile$"]}})));
        assert!(nested.is_ok(), "errors: {:?}", nested.errors);
    }

    #[test]
    fn invalid_template_is_an_error() {
        let result = validate_default(&obj(json!({
            "commitMessage": "update {{notAKnownField}}"
        })));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("Invalid template"));
    }

    #[test]
    fn nested_template_faults_surface_through_triple_compile() {
        // First compile resolves branchPrefix, second hits the unknown field
        let result = validate_default(&obj(json!({
            "branchPrefix": "{{missingInnerField}}",
            "commitMessage": "{{branchPrefix}}update"
        })));
        assert!(!result.is_ok(), "expected nested template error");
    }

    #[test]
    fn schedule_and_timezone_use_semantic_validators() {
        let result = validate_default(&obj(json!({
            "schedule": ["whenever"],
            "timezone": "Mars/Olympus_Mons"
        })));
        assert_eq!(result.errors.len(), 2, "errors: {:?}", result.errors);
    }

    #[test]
    fn regex_style_allowed_versions_is_checked() {
        let bad = validate_default(&obj(json!({
            "packageRules": [{
                "matchPackageNames": ["x"],
                "allowedVersions": "/[invalid/"
            }]
        })));
        assert!(bad.errors.iter().any(|e| e.message.contains("Invalid regExp")));
        let plain = validate_default(&obj(json!({
            "packageRules": [{
                "matchPackageNames": ["x"],
                "allowedVersions": "<5.0.0"
            }]
        })));
        assert!(plain.is_ok(), "errors: {:?}", plain.errors);
    }

    #[test]
    fn package_rule_requires_a_selector() {
        let result = validate_default(&obj(json!({
            "packageRules": [{"automerge": true}]
        })));
        let selector_errors: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.message.contains("at least one match* or exclude* selector"))
            .collect();
        assert_eq!(selector_errors.len(), 1);

        let fixed = validate_default(&obj(json!({
            "packageRules": [{"matchPackageNames": ["x"], "automerge": true}]
        })));
        assert!(
            !fixed
                .errors
                .iter()
                .any(|e| e.message.contains("at least one match* or exclude* selector"))
        );
    }

    #[test]
    fn package_rule_requires_a_non_selector_setting() {
        let result = validate_default(&obj(json!({
            "packageRules": [{"matchPackageNames": ["x"]}]
        })));
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("non-selector configuration option"))
        );
    }

    #[test]
    fn package_rule_settings_satisfied_by_internal_preset() {
        // The preset contributes rangeStrategy, so the rule has a setting
        let result = validate_default(&obj(json!({
            "packageRules": [{"matchPackageNames": ["x"], "extends": [":pinVersions"]}]
        })));
        assert!(
            !result
                .errors
                .iter()
                .any(|e| e.message.contains("non-selector configuration option")),
            "errors: {:?}",
            result.errors
        );
    }

    #[test]
    fn legacy_rule_selectors_count_after_migration() {
        let result = validate_default(&obj(json!({
            "packageRules": [{"packageNames": ["x"], "automerge": true}]
        })));
        assert!(
            !result
                .errors
                .iter()
                .any(|e| e.message.contains("at least one match* or exclude* selector")),
            "errors: {:?}",
            result.errors
        );
    }

    #[test]
    fn match_update_types_rejects_lookup_options() {
        let result = validate_default(&obj(json!({
            "packageRules": [{
                "matchUpdateTypes": ["minor"],
                "rangeStrategy": "widen"
            }]
        })));
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("cannot combine both matchUpdateTypes and rangeStrategy"))
        );
    }

    #[test]
    fn selectors_outside_package_rules_are_rejected() {
        let result = validate_default(&obj(json!({"matchPackageNames": ["x"]})));
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("selectors may only be used within a packageRules object"))
        );
    }

    #[test]
    fn preset_top_level_selectors_are_allowed() {
        let result = validate(
            &obj(json!({"matchPackageNames": ["x"]})),
            true,
            None,
            &ValidationContext::default(),
        );
        assert!(result.is_ok(), "errors: {:?}", result.errors);
    }

    #[test]
    fn group_preset_in_package_rule_warns() {
        let result = validate_default(&obj(json!({
            "packageRules": [{
                "matchPackageNames": ["x"],
                "extends": ["group:monorepos"],
                "enabled": false
            }]
        })));
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.message.contains("group:"))
        );
    }

    #[test]
    fn timezone_preset_arguments_are_checked() {
        let result = validate_default(&obj(json!({
            "extends": [":timezone(Mars/Olympus_Mons)"]
        })));
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("invalid timezone within preset"))
        );
    }

    #[test]
    fn regex_managers_closed_field_list() {
        let result = validate_default(&obj(json!({
            "regexManagers": [{
                "fileMatch": ["^versions\\.txt$"],
                "matchStrings": ["(?<depName>\\S+) (?<currentValue>\\S+)"],
                "datasourceTemplate": "npm",
                "bogusField": true
            }]
        })));
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("unsupported regexManagers field \"bogusField\""))
        );
    }

    #[test]
    fn regex_managers_require_match_strings() {
        let result = validate_default(&obj(json!({
            "regexManagers": [{"fileMatch": ["^versions\\.txt$"]}]
        })));
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("non-empty matchStrings"))
        );
    }

    #[test]
    fn regex_managers_mandatory_fields_via_capture_or_template() {
        let ok = validate_default(&obj(json!({
            "regexManagers": [{
                "fileMatch": ["^versions\\.txt$"],
                "matchStrings": ["(?<depName>\\S+) (?<currentValue>\\S+)"],
                "datasourceTemplate": "npm"
            }]
        })));
        assert!(ok.is_ok(), "errors: {:?}", ok.errors);

        let missing = validate_default(&obj(json!({
            "regexManagers": [{
                "fileMatch": ["^versions\\.txt$"],
                "matchStrings": ["(?<depName>\\S+) (?<currentValue>\\S+)"]
            }]
        })));
        assert!(
            missing
                .errors
                .iter()
                .any(|e| e.message.contains("must provide datasource"))
        );
    }

    #[test]
    fn registry_aliases_values_must_be_urls() {
        let result = validate_default(&obj(json!({
            "registryAliases": {"internal": "ftp://mirror.local"}
        })));
        assert!(result.errors.iter().any(|e| e.message.contains("Invalid url")));
    }

    #[test]
    fn free_choice_objects_are_not_descended() {
        let result = validate_default(&obj(json!({
            "encrypted": {"anythingGoesHere": [1, 2, 3]}
        })));
        assert!(result.is_ok(), "errors: {:?}", result.errors);
    }

    #[test]
    fn parent_scope_warning_for_misplaced_options() {
        let result = validate_default(&obj(json!({"matchStrings": ["x"]})));
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.message.contains("\"regexManagers\" object"))
        );
    }

    #[test]
    fn deprecation_warnings_are_advisory() {
        let result = validate_default(&obj(json!({"prBody": "custom {{depName}} body"})));
        assert!(result.is_ok());
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.topic == DEPRECATION_TOPIC)
        );
    }
}
