//! Migration of deprecated and renamed configuration options
//!
//! The engine applies an ordered rule set to a raw config tree, then a fixed
//! block of structural post-passes, and repeats on its own output until a
//! fixpoint is reached. Every rule must be idempotent once stable; the
//! fixpoint loop carries no iteration ceiling.

use crate::error::{ConfigError, Result};
use crate::node::{self, ConfigNode};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::OnceLock;

/// Result of a migration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// True when the input required any rewriting
    pub changed: bool,
    /// The fully-migrated tree
    pub result: ConfigNode,
}

/// Options dropped without replacement
const REMOVED_OPTIONS: &[&str] = &[
    "maintainYarnLock",
    "yarnCacheFolder",
    "groupBranchName",
    "groupCommitMessage",
    "groupPrTitle",
    "groupPrBody",
    "statusCheckVerify",
    "lazyGrouping",
    "supportPolicy",
    "deepExtract",
    "gitFs",
];

/// Options renamed in place (value unchanged)
const RENAMED_OPTIONS: &[(&str, &str)] = &[
    ("endpoints", "hostRules"),
    ("excludedPackageNames", "excludePackageNames"),
    ("exposeEnv", "exposeAllEnv"),
    ("managerBranchPrefix", "additionalBranchPrefix"),
    ("multipleMajorPrs", "separateMultipleMajor"),
    ("separatePatchReleases", "separateMinorPatch"),
    ("versionScheme", "versioning"),
    ("lookupNameTemplate", "packageNameTemplate"),
    ("aliases", "registryAliases"),
    ("masterIssueApproval", "dependencyDashboardApproval"),
];

/// Template placeholder tokens rewritten everywhere in the tree
const TEMPLATE_TOKEN_RENAMES: &[(&str, &str)] = &[
    ("{{baseDir}}", "{{packageFileDir}}"),
    ("{{depNameShort}}", "{{depName}}"),
    ("{{lookupName}}", "{{packageName}}"),
];

/// Legacy selector field names inside packageRules entries
const RULE_SELECTOR_RENAMES: &[(&str, &str)] = &[
    ("paths", "matchPaths"),
    ("languages", "matchLanguages"),
    ("baseBranchList", "matchBaseBranches"),
    ("managers", "matchManagers"),
    ("datasources", "matchDatasources"),
    ("depTypeList", "matchDepTypes"),
    ("packageNames", "matchPackageNames"),
    ("packagePatterns", "matchPackagePatterns"),
    ("sourceUrlPrefixes", "matchSourceUrlPrefixes"),
    ("updateTypes", "matchUpdateTypes"),
];

/// Legacy per-depType object keys expanded into packageRules
const DEP_TYPE_KEYS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
    "engines",
];

/// postUpdateOptions entries still recognized
const KNOWN_POST_UPDATE_OPTIONS: &[&str] = &[
    "gomodTidy",
    "gomodUpdateImportPaths",
    "npmDedupe",
    "yarnDedupeFewer",
    "yarnDedupeHighest",
];

/// Custom migration variants, dispatched through a single lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CustomMigration {
    PathRules,
    Packages,
    SuppressNotifications,
    BinarySource,
    Automerge,
    BaseBranch,
    IgnoreNodeModules,
    PinVersions,
    SemanticCommits,
    TrustLevel,
    UpgradeInRange,
    VersionStrategy,
    PostUpdateOptions,
    Schedule,
    RaiseDeprecationWarnings,
    UnpublishSafe,
}

#[derive(Clone, Copy)]
enum Matcher {
    Name(&'static str),
    Pattern(&'static str),
}

#[derive(Clone, Copy)]
enum Action {
    Remove,
    Rename(&'static str),
    Custom(CustomMigration),
}

struct MigrationDef {
    matcher: Matcher,
    /// Deprecated migrations delete the key after their side effects run
    deprecated: bool,
    action: Action,
}

/// The active migration set, in construction order. Removed keys first, then
/// renames, then the custom variants; exact-name matches always beat pattern
/// matches regardless of position.
fn migration_defs() -> Vec<MigrationDef> {
    let mut defs = Vec::new();
    for name in REMOVED_OPTIONS {
        defs.push(MigrationDef {
            matcher: Matcher::Name(name),
            deprecated: true,
            action: Action::Remove,
        });
    }
    // The whole yarnMaintenance* family is gone
    defs.push(MigrationDef {
        matcher: Matcher::Pattern(r"^yarnMaintenance"),
        deprecated: true,
        action: Action::Remove,
    });
    for (from, to) in RENAMED_OPTIONS {
        defs.push(MigrationDef {
            matcher: Matcher::Name(from),
            deprecated: false,
            action: Action::Rename(to),
        });
    }
    let customs: &[(&'static str, bool, CustomMigration)] = &[
        ("pathRules", true, CustomMigration::PathRules),
        ("packages", true, CustomMigration::Packages),
        ("suppressNotifications", false, CustomMigration::SuppressNotifications),
        ("binarySource", false, CustomMigration::BinarySource),
        ("automerge", false, CustomMigration::Automerge),
        ("baseBranch", true, CustomMigration::BaseBranch),
        ("ignoreNodeModules", true, CustomMigration::IgnoreNodeModules),
        ("pinVersions", true, CustomMigration::PinVersions),
        ("semanticCommits", false, CustomMigration::SemanticCommits),
        ("trustLevel", true, CustomMigration::TrustLevel),
        ("upgradeInRange", true, CustomMigration::UpgradeInRange),
        ("versionStrategy", true, CustomMigration::VersionStrategy),
        ("postUpdateOptions", false, CustomMigration::PostUpdateOptions),
        ("schedule", false, CustomMigration::Schedule),
        ("raiseDeprecationWarnings", true, CustomMigration::RaiseDeprecationWarnings),
        ("unpublishSafe", true, CustomMigration::UnpublishSafe),
    ];
    for (name, deprecated, custom) in customs {
        defs.push(MigrationDef {
            matcher: Matcher::Name(name),
            deprecated: *deprecated,
            action: Action::Custom(*custom),
        });
    }
    defs
}

static PATTERN_CACHE: OnceLock<std::result::Result<Vec<(String, Regex)>, regex::Error>> =
    OnceLock::new();

/// Compile the pattern matchers once; a malformed pattern is a fatal error
fn compiled_patterns(defs: &[MigrationDef]) -> Result<&'static [(String, Regex)]> {
    let cache = PATTERN_CACHE.get_or_init(|| {
        let mut compiled = Vec::new();
        for def in defs {
            if let Matcher::Pattern(src) = def.matcher {
                compiled.push((src.to_string(), Regex::new(src)?));
            }
        }
        Ok(compiled)
    });
    match cache {
        Ok(patterns) => Ok(patterns),
        Err(e) => Err(ConfigError::internal(format!(
            "malformed migration pattern: {e}"
        ))),
    }
}

/// Find the single migration matching a key: exact name first, then pattern,
/// first match wins in construction order
fn find_migration<'a>(defs: &'a [MigrationDef], key: &str) -> Result<Option<&'a MigrationDef>> {
    for def in defs {
        if let Matcher::Name(name) = def.matcher
            && name == key
        {
            return Ok(Some(def));
        }
    }
    let patterns = compiled_patterns(defs)?;
    for def in defs {
        if let Matcher::Pattern(src) = def.matcher {
            let matched = patterns
                .iter()
                .find(|(s, _)| s.as_str() == src)
                .ok_or_else(|| ConfigError::internal("migration pattern cache out of sync"))?;
            if matched.1.is_match(key) {
                return Ok(Some(def));
            }
        }
    }
    Ok(None)
}

/// One migration pass over a config, bound to a specific (original, working)
/// pair; discarded after the pass
struct Migrator<'a> {
    original: &'a ConfigNode,
    result: ConfigNode,
}

impl<'a> Migrator<'a> {
    fn new(original: &'a ConfigNode) -> Self {
        Self {
            original,
            result: original.clone(),
        }
    }

    /// Write a key only if neither the original nor the in-progress result
    /// already defines it; never clobbers explicit user intent
    fn set_safely(&mut self, key: &str, value: Value) {
        if !self.original.contains_key(key) && !self.result.contains_key(key) {
            self.result.insert(key.to_string(), value);
        }
    }

    /// Unconditional write
    fn set_hard(&mut self, key: &str, value: Value) {
        self.result.insert(key.to_string(), value);
    }

    fn append_package_rules(&mut self, rules: Vec<Value>) {
        match self.result.get_mut("packageRules") {
            Some(Value::Array(existing)) => existing.extend(rules),
            _ => {
                self.result.insert("packageRules".to_string(), Value::Array(rules));
            }
        }
    }

    fn run_custom(&mut self, migration: CustomMigration, key: &str, value: &Value) -> Result<()> {
        match migration {
            CustomMigration::PathRules | CustomMigration::Packages => {
                if let Value::Array(rules) = value {
                    self.append_package_rules(rules.clone());
                }
            }
            CustomMigration::SuppressNotifications => {
                if let Value::Array(entries) = value {
                    let filtered: Vec<Value> = entries
                        .iter()
                        .filter(|e| e.as_str() != Some("prEditNotification"))
                        .cloned()
                        .collect();
                    self.set_hard(key, Value::Array(filtered));
                }
            }
            CustomMigration::BinarySource => {
                if value.as_str() == Some("auto") {
                    self.set_hard(key, json!("global"));
                }
            }
            CustomMigration::Automerge => match value.as_str() {
                Some("none") => self.set_hard(key, json!(false)),
                Some("any") => self.set_hard(key, json!(true)),
                Some("patch") => {
                    self.set_hard(key, json!(false));
                    self.set_safely("patch", json!({"automerge": true}));
                }
                Some("minor") => {
                    self.set_hard(key, json!(false));
                    self.set_safely("minor", json!({"automerge": true}));
                    self.set_safely("patch", json!({"automerge": true}));
                }
                _ => {}
            },
            CustomMigration::BaseBranch => match value {
                Value::String(branch) => self.set_safely("baseBranches", json!([branch])),
                Value::Array(_) => self.set_safely("baseBranches", value.clone()),
                _ => {}
            },
            CustomMigration::IgnoreNodeModules => {
                if value.as_bool() == Some(true) {
                    self.set_safely("ignorePaths", json!(["node_modules/"]));
                }
            }
            CustomMigration::PinVersions => match value.as_bool() {
                Some(true) => self.set_safely("rangeStrategy", json!("pin")),
                Some(false) => self.set_safely("rangeStrategy", json!("replace")),
                None => {}
            },
            CustomMigration::SemanticCommits => match value.as_bool() {
                Some(true) => self.set_hard(key, json!("enabled")),
                Some(false) => self.set_hard(key, json!("disabled")),
                None => {}
            },
            CustomMigration::TrustLevel => {
                if value.as_str() == Some("high") {
                    self.set_safely("allowCustomCrateRegistries", json!(true));
                    self.set_safely("allowScripts", json!(true));
                    self.set_safely("exposeAllEnv", json!(true));
                }
            }
            CustomMigration::UpgradeInRange => {
                if value.as_bool() == Some(true) {
                    self.set_safely("rangeStrategy", json!("bump"));
                }
            }
            CustomMigration::VersionStrategy => {
                if value.as_str() == Some("widen") {
                    self.set_safely("rangeStrategy", json!("widen"));
                }
            }
            CustomMigration::PostUpdateOptions => {
                if let Value::Array(entries) = value {
                    let filtered: Vec<Value> = entries
                        .iter()
                        .filter(|e| {
                            e.as_str()
                                .is_some_and(|s| KNOWN_POST_UPDATE_OPTIONS.contains(&s))
                        })
                        .cloned()
                        .collect();
                    self.set_hard(key, Value::Array(filtered));
                }
            }
            CustomMigration::Schedule => {
                let normalize = |entry: &str| -> String {
                    if entry == "every month" {
                        "before 3am on the first day of the month".to_string()
                    } else {
                        entry.to_string()
                    }
                };
                match value {
                    Value::String(entry) => self.set_hard(key, json!(normalize(entry))),
                    Value::Array(entries) => {
                        let normalized: Vec<Value> = entries
                            .iter()
                            .map(|e| match e.as_str() {
                                Some(s) => json!(normalize(s)),
                                None => e.clone(),
                            })
                            .collect();
                        self.set_hard(key, Value::Array(normalized));
                    }
                    _ => {}
                }
            }
            CustomMigration::RaiseDeprecationWarnings => {
                if value.as_bool() == Some(false) {
                    self.append_unique("suppressNotifications", "deprecationWarningIssues");
                }
            }
            CustomMigration::UnpublishSafe => {
                if value.as_bool() == Some(true) {
                    self.append_unique("extends", "npm:unpublishSafe");
                }
            }
        }
        Ok(())
    }

    /// Append a string entry to an array option, creating it if needed and
    /// skipping duplicates
    fn append_unique(&mut self, key: &str, entry: &str) {
        match self.result.get_mut(key) {
            Some(Value::Array(entries)) => {
                if !entries.iter().any(|e| e.as_str() == Some(entry)) {
                    entries.push(json!(entry));
                }
            }
            Some(Value::String(existing)) => {
                let existing = existing.clone();
                if existing != entry {
                    self.result
                        .insert(key.to_string(), json!([existing, entry]));
                }
            }
            _ => {
                self.result.insert(key.to_string(), json!([entry]));
            }
        }
    }
}

/// Run the migration to a fixpoint.
///
/// `changed` reflects whether the input required any rewriting; the result is
/// re-migrated until deep equality (order-insensitive for maps, sensitive for
/// sequences) reports no further change.
pub fn migrate(config: &ConfigNode) -> Result<MigrationOutcome> {
    let result = migrate_once(config)?;
    if result == *config {
        Ok(MigrationOutcome {
            changed: false,
            result,
        })
    } else {
        tracing::debug!("config migration changed the tree, re-running to fixpoint");
        let nested = migrate(&result)?;
        Ok(MigrationOutcome {
            changed: true,
            result: nested.result,
        })
    }
}

fn migrate_once(config: &ConfigNode) -> Result<ConfigNode> {
    let defs = migration_defs();
    let mut migrator = Migrator::new(config);

    // Per-key pass over the original input
    for (key, value) in config {
        match find_migration(&defs, key)? {
            Some(def) => {
                match &def.action {
                    Action::Remove => {
                        migrator.result.remove(key);
                    }
                    Action::Rename(to) => {
                        if let Some(moved) = migrator.result.remove(key) {
                            migrator.result.insert((*to).to_string(), moved);
                        }
                    }
                    Action::Custom(custom) => {
                        migrator.run_custom(*custom, key, value)?;
                        if def.deprecated {
                            migrator.result.remove(key);
                        }
                    }
                }
            }
            // Recurse on the in-progress value, not the original input:
            // earlier migrations in this pass may already have written into
            // this key (unpublishSafe appends to extends, pathRules splices
            // into packageRules) and those writes must survive.
            None => match migrator.result.get(key).cloned() {
                // Nested configuration objects are migrated recursively;
                // encrypted blobs are opaque
                Some(Value::Object(nested)) if key != "encrypted" => {
                    migrator
                        .result
                        .insert(key.clone(), Value::Object(migrate_once(&nested)?));
                }
                Some(Value::Array(items)) => {
                    let mut migrated_items = Vec::with_capacity(items.len());
                    for item in &items {
                        migrated_items.push(match item {
                            Value::Object(nested) => Value::Object(migrate_once(nested)?),
                            other => other.clone(),
                        });
                    }
                    migrator.result.insert(key.clone(), Value::Array(migrated_items));
                }
                _ => {}
            },
        }
    }

    let mut result = migrator.result;
    migrate_master_issue(&mut result);
    migrate_legacy_maps(&mut result)?;
    migrate_template_tokens(&mut result);
    migrate_rule_selectors(&mut result);
    flatten_nested_rules(&mut result);
    migrate_manager_aliases(&mut result);
    Ok(result)
}

/// Post-pass (a): masterIssue* keys become dependencyDashboard*, with
/// "true"/"false" strings coerced to booleans
fn migrate_master_issue(result: &mut ConfigNode) {
    let keys: Vec<String> = result
        .keys()
        .filter(|k| k.starts_with("masterIssue"))
        .cloned()
        .collect();
    for key in keys {
        let Some(value) = result.remove(&key) else {
            continue;
        };
        let new_key = key.replacen("masterIssue", "dependencyDashboard", 1);
        let coerced = match &value {
            Value::String(s) if s == "true" => json!(true),
            Value::String(s) if s == "false" => json!(false),
            _ => value,
        };
        if !result.contains_key(&new_key) {
            result.insert(new_key, coerced);
        }
    }
}

/// Post-pass (b): expand legacy per-file and per-depType maps into
/// packageRules entries tagged with matcher fields
fn migrate_legacy_maps(result: &mut ConfigNode) -> Result<()> {
    let mut new_rules: Vec<Value> = Vec::new();
    let mut include_paths: Vec<Value> = Vec::new();

    if let Some(value) = result.remove("packageFiles")
        && let Value::Array(entries) = value
    {
        for entry in entries {
            match entry {
                Value::String(path) => include_paths.push(json!(path)),
                Value::Object(mut file_config) => {
                    let Some(path) = file_config
                        .remove("packageFile")
                        .and_then(|v| v.as_str().map(str::to_string))
                    else {
                        continue;
                    };
                    let nested_rules = file_config.remove("packageRules");
                    if !file_config.is_empty() {
                        let mut rule = ConfigNode::new();
                        rule.insert("matchPaths".to_string(), json!([path]));
                        let migrated = migrate(&file_config)?.result;
                        for (k, v) in migrated {
                            rule.insert(k, v);
                        }
                        new_rules.push(Value::Object(rule));
                    } else if nested_rules.is_none() {
                        include_paths.push(json!(path));
                    }
                    if let Some(Value::Array(subrules)) = nested_rules {
                        for subrule in subrules {
                            if let Value::Object(subrule) = subrule {
                                let mut rule = ConfigNode::new();
                                rule.insert("matchPaths".to_string(), json!([path]));
                                let migrated = migrate(&subrule)?.result;
                                for (k, v) in migrated {
                                    rule.insert(k, v);
                                }
                                new_rules.push(Value::Object(rule));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    for dep_type in DEP_TYPE_KEYS {
        let is_legacy_map = matches!(result.get(*dep_type), Some(Value::Object(o)) if !o.is_empty());
        if is_legacy_map
            && let Some(Value::Object(dep_config)) = result.remove(*dep_type)
        {
            let mut rule = ConfigNode::new();
            rule.insert("matchDepTypes".to_string(), json!([dep_type]));
            let migrated = migrate(&dep_config)?.result;
            for (k, v) in migrated {
                rule.insert(k, v);
            }
            new_rules.push(Value::Object(rule));
        }
    }

    if let Some(value) = result.remove("depTypes")
        && let Value::Array(entries) = value
    {
        for entry in entries {
            if let Value::Object(mut dep_config) = entry {
                let Some(name) = dep_config
                    .remove("depType")
                    .and_then(|v| v.as_str().map(str::to_string))
                else {
                    continue;
                };
                let mut rule = ConfigNode::new();
                rule.insert("matchDepTypes".to_string(), json!([name]));
                let migrated = migrate(&dep_config)?.result;
                for (k, v) in migrated {
                    rule.insert(k, v);
                }
                new_rules.push(Value::Object(rule));
            }
        }
    }

    if !include_paths.is_empty() {
        match result.get_mut("includePaths") {
            Some(Value::Array(existing)) => existing.extend(include_paths),
            _ => {
                result.insert("includePaths".to_string(), Value::Array(include_paths));
            }
        }
    }
    if !new_rules.is_empty() {
        match result.get_mut("packageRules") {
            Some(Value::Array(existing)) => existing.extend(new_rules),
            _ => {
                result.insert("packageRules".to_string(), Value::Array(new_rules));
            }
        }
    }
    Ok(())
}

/// Post-pass (c): template placeholder token replacement on every string
fn migrate_template_tokens(result: &mut ConfigNode) {
    let rewrite = |s: &str| -> Option<String> {
        let mut rewritten = s.to_string();
        for (from, to) in TEMPLATE_TOKEN_RENAMES {
            rewritten = rewritten.replace(from, to);
        }
        (rewritten != s).then_some(rewritten)
    };
    for (_, value) in result.iter_mut() {
        node::rewrite_strings(value, &rewrite);
    }
}

/// Post-pass (d): rename legacy selector fields inside packageRules entries
fn migrate_rule_selectors(result: &mut ConfigNode) {
    let Some(Value::Array(rules)) = result.get_mut("packageRules") else {
        return;
    };
    for rule in rules {
        let Value::Object(rule) = rule else {
            continue;
        };
        for (from, to) in RULE_SELECTOR_RENAMES {
            if let Some(moved) = rule.remove(*from)
                && !rule.contains_key(*to)
            {
                rule.insert((*to).to_string(), moved);
            }
        }
    }
}

/// Post-pass (e): flatten packageRules[].packageRules one level, merging
/// each child rule over its parent and dropping the nested key
fn flatten_nested_rules(result: &mut ConfigNode) {
    let Some(Value::Array(rules)) = result.get("packageRules").cloned() else {
        return;
    };
    let mut flattened: Vec<Value> = Vec::with_capacity(rules.len());
    for rule in rules {
        let Value::Object(mut rule_obj) = rule else {
            flattened.push(rule);
            continue;
        };
        match rule_obj.remove("packageRules") {
            Some(Value::Array(children)) => {
                for child in children {
                    if let Value::Object(child_obj) = child {
                        let mut merged = rule_obj.clone();
                        node::merge_child_over_parent(&mut merged, &child_obj);
                        flattened.push(Value::Object(merged));
                    }
                }
            }
            Some(other) => {
                // Not a rule list; drop it and keep the parent
                let _ = other;
                flattened.push(Value::Object(rule_obj));
            }
            None => flattened.push(Value::Object(rule_obj)),
        }
    }
    result.insert("packageRules".to_string(), Value::Array(flattened));
}

/// Post-pass (f): manager-name aliasing cleanup
fn migrate_manager_aliases(result: &mut ConfigNode) {
    // A gitlabci block carrying fileMatch is really a gitlabci-include config
    let misplaced = matches!(result.get("gitlabci"), Some(Value::Object(o)) if o.contains_key("fileMatch"))
        && !result.contains_key("gitlabci-include");
    if misplaced && let Some(block) = result.remove("gitlabci") {
        result.insert("gitlabci-include".to_string(), block);
    }
    // The "node" manager alias is long gone; its config lived under travis
    if let Some(Value::Array(rules)) = result.get_mut("packageRules") {
        for rule in rules {
            if let Value::Object(rule) = rule
                && let Some(Value::Array(managers)) = rule.get_mut("matchManagers")
            {
                for manager in managers {
                    if manager.as_str() == Some("node") {
                        *manager = json!("travis");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> ConfigNode {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn removes_obsolete_options() {
        let outcome = migrate(&obj(json!({"gitFs": "https", "automerge": true}))).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.result, obj(json!({"automerge": true})));
    }

    #[test]
    fn pattern_removal_covers_yarn_maintenance_family() {
        let outcome = migrate(&obj(json!({
            "yarnMaintenanceBranchName": "yarn-x",
            "yarnMaintenancePrTitle": "Yarn maintenance"
        })))
        .unwrap();
        assert!(outcome.changed);
        assert!(outcome.result.is_empty());
    }

    #[test]
    fn renames_keep_values() {
        let outcome = migrate(&obj(json!({"versionScheme": "semver"}))).unwrap();
        assert_eq!(outcome.result, obj(json!({"versioning": "semver"})));
    }

    #[test]
    fn migration_is_idempotent_once_stable() {
        let input = obj(json!({
            "baseBranch": "next",
            "pinVersions": true,
            "masterIssue": "true",
            "packageRules": [{"packageNames": ["lodash"], "automerge": "patch"}]
        }));
        let first = migrate(&input).unwrap();
        assert!(first.changed);
        let second = migrate(&first.result).unwrap();
        assert!(!second.changed);
        assert_eq!(second.result, first.result);
    }

    #[test]
    fn set_safely_never_overwrites_user_intent() {
        let outcome = migrate(&obj(json!({"rangeStrategy": "widen", "pinVersions": true}))).unwrap();
        assert_eq!(outcome.result, obj(json!({"rangeStrategy": "widen"})));
    }

    #[test]
    fn automerge_patch_expands_to_update_type_block() {
        let outcome = migrate(&obj(json!({"automerge": "patch"}))).unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({"automerge": false, "patch": {"automerge": true}}))
        );
    }

    #[test]
    fn automerge_expansion_respects_existing_patch_block() {
        let outcome =
            migrate(&obj(json!({"automerge": "patch", "patch": {"enabled": false}}))).unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({"automerge": false, "patch": {"enabled": false}}))
        );
    }

    #[test]
    fn master_issue_keys_become_dependency_dashboard() {
        let outcome = migrate(&obj(json!({
            "masterIssue": "true",
            "masterIssueTitle": "Update Dashboard"
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({
                "dependencyDashboard": true,
                "dependencyDashboardTitle": "Update Dashboard"
            }))
        );
    }

    #[test]
    fn legacy_dep_type_maps_become_package_rules() {
        let outcome = migrate(&obj(json!({
            "devDependencies": {"automerge": true}
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({
                "packageRules": [{"matchDepTypes": ["devDependencies"], "automerge": true}]
            }))
        );
    }

    #[test]
    fn package_files_strings_become_include_paths() {
        let outcome = migrate(&obj(json!({"packageFiles": ["package.json"]}))).unwrap();
        assert_eq!(outcome.result, obj(json!({"includePaths": ["package.json"]})));
    }

    #[test]
    fn package_files_objects_become_path_rules() {
        let outcome = migrate(&obj(json!({
            "packageFiles": [{"packageFile": "backend/package.json", "pinVersions": false}]
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({
                "packageRules": [{
                    "matchPaths": ["backend/package.json"],
                    "rangeStrategy": "replace"
                }]
            }))
        );
    }

    #[test]
    fn template_tokens_are_rewritten_everywhere() {
        let outcome = migrate(&obj(json!({
            "commitMessage": "update {{depNameShort}} in {{baseDir}}",
            "packageRules": [{"prTitle": "{{lookupName}}"}]
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({
                "commitMessage": "update {{depName}} in {{packageFileDir}}",
                "packageRules": [{"prTitle": "{{packageName}}"}]
            }))
        );
    }

    #[test]
    fn rule_selectors_are_renamed() {
        let outcome = migrate(&obj(json!({
            "packageRules": [{"packageNames": ["react"], "updateTypes": ["minor"], "enabled": false}]
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({
                "packageRules": [{
                    "matchPackageNames": ["react"],
                    "matchUpdateTypes": ["minor"],
                    "enabled": false
                }]
            }))
        );
    }

    #[test]
    fn nested_package_rules_flatten_one_level() {
        let outcome = migrate(&obj(json!({
            "packageRules": [{
                "matchPaths": ["backend/"],
                "packageRules": [
                    {"matchPackageNames": ["lodash"], "automerge": true},
                    {"matchPackageNames": ["react"], "enabled": false}
                ]
            }]
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({
                "packageRules": [
                    {"matchPaths": ["backend/"], "matchPackageNames": ["lodash"], "automerge": true},
                    {"matchPaths": ["backend/"], "matchPackageNames": ["react"], "enabled": false}
                ]
            }))
        );
    }

    #[test]
    fn doubly_nested_rules_reach_fixpoint() {
        let outcome = migrate(&obj(json!({
            "packageRules": [{
                "matchPaths": ["a/"],
                "packageRules": [{
                    "matchDepTypes": ["dependencies"],
                    "packageRules": [{"matchPackageNames": ["x"], "enabled": false}]
                }]
            }]
        })))
        .unwrap();
        let again = migrate(&outcome.result).unwrap();
        assert!(!again.changed);
        let rules = outcome.result.get("packageRules").unwrap().as_array().unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules[0].get("packageRules").is_none());
    }

    #[test]
    fn trust_level_high_expands_safely() {
        let outcome = migrate(&obj(json!({"trustLevel": "high", "allowScripts": false}))).unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({
                "allowScripts": false,
                "allowCustomCrateRegistries": true,
                "exposeAllEnv": true
            }))
        );
    }

    #[test]
    fn unpublish_safe_appends_extends_once() {
        let outcome = migrate(&obj(json!({
            "unpublishSafe": true,
            "extends": ["config:base"]
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({"extends": ["config:base", "npm:unpublishSafe"]}))
        );
        let again = migrate(&outcome.result).unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn path_rules_splice_into_existing_package_rules() {
        // packageRules listed after pathRules, so the recursion over the
        // packageRules key runs after the splice and must not undo it
        let outcome = migrate(&obj(json!({
            "pathRules": [{"paths": ["docs/**"], "automerge": true}],
            "packageRules": [{"matchPackageNames": ["lodash"], "rangeStrategy": "pin"}]
        })))
        .unwrap();
        let rules = outcome.result["packageRules"].as_array().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["matchPackageNames"], json!(["lodash"]));
        assert_eq!(rules[1]["matchPaths"], json!(["docs/**"]));
        assert_eq!(rules[1]["automerge"], json!(true));
    }

    #[test]
    fn nested_manager_blocks_are_migrated() {
        let outcome = migrate(&obj(json!({
            "npm": {"pinVersions": true}
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({"npm": {"rangeStrategy": "pin"}}))
        );
    }

    #[test]
    fn gitlabci_file_match_moves_to_include_manager() {
        let outcome = migrate(&obj(json!({
            "gitlabci": {"fileMatch": ["gitlab-ci.yml"]}
        })))
        .unwrap();
        assert_eq!(
            outcome.result,
            obj(json!({"gitlabci-include": {"fileMatch": ["gitlab-ci.yml"]}}))
        );
    }

    #[test]
    fn unknown_post_update_options_are_dropped() {
        let outcome = migrate(&obj(json!({
            "postUpdateOptions": ["gomodTidy", "definitelyNotReal"]
        })))
        .unwrap();
        assert_eq!(outcome.result, obj(json!({"postUpdateOptions": ["gomodTidy"]})));
    }

    #[test]
    fn clean_config_reports_no_change() {
        let input = obj(json!({
            "extends": ["config:base"],
            "automerge": false,
            "packageRules": [{"matchPackageNames": ["lodash"], "enabled": false}]
        }));
        let outcome = migrate(&input).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.result, input);
    }
}
