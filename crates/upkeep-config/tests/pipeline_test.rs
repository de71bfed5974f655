//! End-to-end tests driving the public API the way a host application would:
//! raw JSON config in, resolved and validated config out.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use upkeep_config::{
    ConfigNode, ErrorKind, FetchError, PresetFetcher, PresetSource, PresetSourceRegistry,
    ValidationContext, massage, migrate, resolve_config, validate,
};

fn obj(value: Value) -> ConfigNode {
    value.as_object().cloned().unwrap()
}

/// Serves presets out of an in-memory `"repo:preset"` map
struct MapFetcher {
    presets: HashMap<String, Value>,
}

impl MapFetcher {
    fn new(entries: &[(&str, Value)]) -> Arc<Self> {
        Arc::new(Self {
            presets: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        })
    }
}

#[async_trait]
impl PresetFetcher for MapFetcher {
    async fn fetch(
        &self,
        repo: &str,
        file_or_preset: &str,
        _endpoint: &str,
        _tag: Option<&str>,
    ) -> Result<ConfigNode, FetchError> {
        let key = format!("{repo}:{file_or_preset}");
        match self.presets.get(&key) {
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(FetchError::InvalidJson(key)),
            None if self
                .presets
                .keys()
                .any(|k| k.starts_with(&format!("{repo}:"))) =>
            {
                Err(FetchError::PresetNotFound)
            }
            None => Err(FetchError::PackageNotFound),
        }
    }
}

fn github_registry(entries: &[(&str, Value)]) -> PresetSourceRegistry {
    PresetSourceRegistry::new().with_fetcher(PresetSource::Github, MapFetcher::new(entries))
}

#[tokio::test]
async fn clean_config_round_trips_without_diagnostics() {
    let registry = PresetSourceRegistry::new();
    let input = obj(json!({
        "extends": ["config:base"],
        "timezone": "Europe/Berlin",
        "schedule": ["after 10pm", "before 5am"],
        "packageRules": [{
            "matchPackageNames": ["lodash"],
            "automerge": true
        }]
    }));
    let resolved = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap();
    assert!(
        resolved.validation.errors.is_empty(),
        "errors: {:?}",
        resolved.validation.errors
    );
    // config:base pulled in the dashboard through a nested internal preset
    assert_eq!(resolved.config["dependencyDashboard"], json!(true));
}

#[tokio::test]
async fn migration_runs_to_a_fixpoint_through_the_pipeline() {
    let registry = PresetSourceRegistry::new();
    let input = obj(json!({
        "masterIssue": true,
        "pinVersions": false,
        "packages": [{"packageNames": ["x"], "automerge": "patch"}]
    }));
    let resolved = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap();
    let config = &resolved.config;
    assert_eq!(config["dependencyDashboard"], json!(true));
    assert_eq!(config["rangeStrategy"], json!("replace"));
    // packages became packageRules; the nested automerge shorthand migrated
    // into an update-type block and was then expanded into a sibling rule
    let rules = config["packageRules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["matchPackageNames"], json!(["x"]));
    assert_eq!(rules[0]["automerge"], json!(false));
    assert_eq!(rules[1]["matchPackageNames"], json!(["x"]));
    assert_eq!(rules[1]["matchUpdateTypes"], json!(["patch"]));
    assert_eq!(rules[1]["automerge"], json!(true));
    assert!(!config.contains_key("masterIssue"));
    assert!(!config.contains_key("packages"));

    // A second run over the output changes nothing
    let outcome = migrate(config).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.result, *config);
}

#[test]
fn migration_set_safely_respects_explicit_user_values() {
    // automerge=patch expands into automerge=false plus a patch rule, but an
    // explicit automerge elsewhere must win
    let outcome = migrate(&obj(json!({"automerge": "patch", "rangeStrategy": "widen"}))).unwrap();
    assert_eq!(outcome.result["automerge"], json!(false));

    let explicit = migrate(&obj(json!({
        "automerge": "any"
    })))
    .unwrap();
    assert_eq!(explicit.result["automerge"], json!(true));
}

#[test]
fn massage_is_idempotent() {
    let input = obj(json!({
        "schedule": "before 5am",
        "npmToken": "abc123token",
        "packageRules": [{
            "matchPackageNames": ["x"],
            "minor": {"enabled": false}
        }]
    }));
    let once = massage(&input);
    let twice = massage(&once);
    assert_eq!(once, twice);
    assert_eq!(once["schedule"], json!(["before 5am"]));
    assert_eq!(
        once["npmrc"],
        json!("//registry.npmjs.org/:_authToken=abc123token")
    );
}

#[tokio::test]
async fn presets_merge_left_to_right_with_local_values_winning() {
    let registry = github_registry(&[
        ("acme/one:default", json!({"labels": ["from-one"], "automerge": true})),
        ("acme/two:default", json!({"labels": ["from-two"]})),
    ]);
    let input = obj(json!({
        "extends": ["github>acme/one", "github>acme/two"],
        "automerge": false
    }));
    let resolved = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap();
    // Later presets override earlier ones; local config overrides both
    assert_eq!(resolved.config["labels"], json!(["from-two"]));
    assert_eq!(resolved.config["automerge"], json!(false));
}

#[tokio::test]
async fn preset_cycles_terminate() {
    let registry = github_registry(&[
        (
            "acme/a:default",
            json!({"extends": ["github>acme/b"], "fromA": true}),
        ),
        (
            "acme/b:default",
            json!({"extends": ["github>acme/a"], "fromB": true}),
        ),
    ]);
    let input = obj(json!({"extends": ["github>acme/a"]}));
    let resolved = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap();
    assert_eq!(resolved.config["fromA"], json!(true));
    assert_eq!(resolved.config["fromB"], json!(true));
}

#[tokio::test]
async fn fetched_presets_are_migrated_and_massaged_before_merging() {
    let registry = github_registry(&[(
        "acme/legacy:default",
        json!({"versionScheme": "semver", "labels": "legacy-label"}),
    )]);
    let input = obj(json!({"extends": ["github>acme/legacy"]}));
    let resolved = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap();
    assert_eq!(resolved.config["versioning"], json!("semver"));
    assert_eq!(resolved.config["labels"], json!(["legacy-label"]));
    assert!(!resolved.config.contains_key("versionScheme"));
}

#[tokio::test]
async fn missing_preset_is_reported_but_does_not_abort() {
    let registry = github_registry(&[("acme/real:default", json!({"automerge": true}))]);
    let input = obj(json!({
        "extends": ["github>acme/nonexistent"],
        "labels": ["deps"]
    }));
    let resolved = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap();
    assert!(!resolved.is_valid());
    assert!(
        resolved
            .validation
            .errors
            .iter()
            .any(|e| e.topic == "Preset resolution error")
    );
    assert_eq!(resolved.config["labels"], json!(["deps"]));
}

#[tokio::test]
async fn host_outages_surface_as_hard_errors() {
    struct OutageFetcher;

    #[async_trait]
    impl PresetFetcher for OutageFetcher {
        async fn fetch(
            &self,
            _repo: &str,
            _file_or_preset: &str,
            _endpoint: &str,
            _tag: Option<&str>,
        ) -> Result<ConfigNode, FetchError> {
            Err(FetchError::External("connect timeout".into()))
        }
    }

    let registry =
        PresetSourceRegistry::new().with_fetcher(PresetSource::Github, Arc::new(OutageFetcher));
    let input = obj(json!({"extends": ["github>acme/presets"]}));
    let err = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalHost);
}

#[test]
fn validator_reports_every_problem_in_one_pass_sorted() {
    let result = validate(
        &obj(json!({
            "bogusOption": 1,
            "automerge": "nope",
            "packageRules": [{"automerge": true}],
            "timezone": "Not/AZone"
        })),
        false,
        None,
        &ValidationContext::default(),
    );
    assert!(result.errors.len() >= 4, "errors: {:?}", result.errors);
    let mut sorted = result.errors.clone();
    sorted.sort();
    assert_eq!(result.errors, sorted);
}

#[test]
fn package_rules_need_selectors_and_settings() {
    let result = validate(
        &obj(json!({
            "packageRules": [
                {"automerge": true},
                {"matchPackageNames": ["x"]},
                {"matchPackageNames": ["y"], "automerge": true}
            ]
        })),
        false,
        None,
        &ValidationContext::default(),
    );
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.message.contains("packageRules[0]")
                && e.message.contains("match* or exclude* selector"))
    );
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.message.contains("packageRules[1]")
                && e.message.contains("non-selector"))
    );
    assert!(
        !result
            .errors
            .iter()
            .any(|e| e.message.contains("packageRules[2]"))
    );
}

#[tokio::test]
async fn preset_parameters_flow_through_resolution() {
    let registry = PresetSourceRegistry::new();
    let input = obj(json!({"extends": [":label(dependencies)"]}));
    let resolved = resolve_config(&input, &registry, &ValidationContext::default())
        .await
        .unwrap();
    assert_eq!(resolved.config["labels"], json!(["dependencies"]));
    assert!(resolved.is_valid(), "errors: {:?}", resolved.validation.errors);
}
