//! Preset fetch interface and the in-process internal source
//!
//! External sources (github, gitlab, gitea, npm, local) are reached through
//! the `PresetFetcher` trait, one implementation per source, registered on a
//! `PresetSourceRegistry`. The `internal` source is served from a built-in
//! table and never touches the network.

use crate::node::ConfigNode;
use crate::presets::parse::{PresetReference, PresetSource};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Failure modes of a preset fetch. `External` is a transient host problem
/// and must never be converted into a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The package/repository does not exist
    PackageNotFound,
    /// The package exists but the named preset does not
    PresetNotFound,
    /// The preset file exists but is not valid JSON
    InvalidJson(String),
    /// No fetcher is registered for the reference's source
    Unsupported(String),
    /// Transient host/network failure; rethrown verbatim
    External(String),
}

/// Source-specific preset fetch collaborator
#[async_trait]
pub trait PresetFetcher: Send + Sync {
    /// Fetch a preset. `file_or_preset` is the preset name, or the file path
    /// within the repository for subdirectory references. Must distinguish a
    /// not-found condition from a transient host error.
    async fn fetch(
        &self,
        repo: &str,
        file_or_preset: &str,
        endpoint: &str,
        tag: Option<&str>,
    ) -> Result<ConfigNode, FetchError>;
}

/// Registry of fetchers and endpoints, one per preset source
#[derive(Default)]
pub struct PresetSourceRegistry {
    fetchers: HashMap<PresetSource, Arc<dyn PresetFetcher>>,
    endpoints: HashMap<PresetSource, String>,
}

impl PresetSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the fetcher for a source
    pub fn with_fetcher(mut self, source: PresetSource, fetcher: Arc<dyn PresetFetcher>) -> Self {
        self.fetchers.insert(source, fetcher);
        self
    }

    /// Override the endpoint passed to a source's fetcher
    pub fn with_endpoint(mut self, source: PresetSource, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(source, endpoint.into());
        self
    }

    /// Resolve a parsed reference to its raw preset content
    pub async fn fetch(&self, reference: &PresetReference) -> Result<ConfigNode, FetchError> {
        if reference.source == PresetSource::Internal {
            return internal_preset(&reference.repo, &reference.preset_name)
                .ok_or(FetchError::PresetNotFound);
        }
        let fetcher = self.fetchers.get(&reference.source).ok_or_else(|| {
            FetchError::Unsupported(format!(
                "no fetcher registered for {:?} presets",
                reference.source
            ))
        })?;
        let file_or_preset = match &reference.preset_path {
            Some(path) => format!("{path}/{}", reference.preset_name),
            None => reference.preset_name.clone(),
        };
        let endpoint = self
            .endpoints
            .get(&reference.source)
            .map(String::as_str)
            .unwrap_or_default();
        tracing::trace!(
            repo = reference.repo,
            preset = file_or_preset,
            "fetching preset"
        );
        fetcher
            .fetch(&reference.repo, &file_or_preset, endpoint, reference.tag.as_deref())
            .await
    }
}

static INTERNAL_PRESETS: OnceLock<HashMap<(&'static str, &'static str), ConfigNode>> =
    OnceLock::new();

/// Look up a built-in preset by namespace and name
pub fn internal_preset(namespace: &str, name: &str) -> Option<ConfigNode> {
    internal_presets().get(&(namespace, name)).cloned()
}

fn internal_presets() -> &'static HashMap<(&'static str, &'static str), ConfigNode> {
    INTERNAL_PRESETS.get_or_init(|| {
        let entries: Vec<((&str, &str), serde_json::Value)> = vec![
            (
                ("default", "automergeDisabled"),
                json!({"automerge": false}),
            ),
            (
                ("default", "automergePatch"),
                json!({"packageRules": [{"matchUpdateTypes": ["patch"], "automerge": true}]}),
            ),
            (
                ("default", "dependencyDashboard"),
                json!({"dependencyDashboard": true}),
            ),
            (
                ("default", "disableDependencyDashboard"),
                json!({"dependencyDashboard": false}),
            ),
            (
                ("default", "ignoreModulesAndTests"),
                json!({
                    "ignorePaths": [
                        "**/node_modules/**",
                        "**/bower_components/**",
                        "**/test/**",
                        "**/tests/**"
                    ]
                }),
            ),
            (("default", "pinVersions"), json!({"rangeStrategy": "pin"})),
            (
                ("default", "preserveSemverRanges"),
                json!({"rangeStrategy": "replace"}),
            ),
            (("default", "timezone"), json!({"timezone": "{{arg0}}"})),
            (("default", "label"), json!({"labels": ["{{arg0}}"]})),
            (
                ("config", "base"),
                json!({
                    "extends": [
                        ":dependencyDashboard",
                        ":ignoreModulesAndTests",
                        "group:monorepos"
                    ]
                }),
            ),
            (
                ("config", "recommended"),
                json!({"extends": ["config:base"]}),
            ),
            (
                ("group", "monorepos"),
                json!({
                    "description": ["Group known monorepo packages together"],
                    "packageRules": [{
                        "matchSourceUrlPrefixes": ["https://github.com/babel/babel"],
                        "groupName": "babel monorepo"
                    }]
                }),
            ),
            (
                ("schedule", "weekly"),
                json!({"schedule": ["before 3am on monday"]}),
            ),
            (
                ("schedule", "monthly"),
                json!({"schedule": ["before 3am on the first day of the month"]}),
            ),
            (
                ("npm", "unpublishSafe"),
                json!({
                    "description": ["Wait until the npm unpublish window has passed"],
                    "stabilityDays": 3
                }),
            ),
            (
                ("workarounds", "all"),
                json!({"description": ["Apply crowd-sourced workarounds"]}),
            ),
        ];
        entries
            .into_iter()
            .filter_map(|(key, value)| {
                value.as_object().cloned().map(|content| (key, content))
            })
            .collect()
    })
}
