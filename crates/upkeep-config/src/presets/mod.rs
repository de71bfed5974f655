//! Preset resolution
//!
//! Resolves every `extends` reference in a config, recursively, and merges
//! the results left to right with child-overrides-parent semantics. Fetches
//! are awaited one at a time in declaration order: later entries must observe
//! the fully-merged result of earlier ones, since merge is last-write-wins.

pub mod parse;
pub mod source;

use crate::error::{ConfigError, PresetFault, Result};
use crate::massage::massage;
use crate::migrate::migrate;
use crate::node::{self, ConfigNode};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

pub use parse::{INTERNAL_NAMESPACES, PresetReference, PresetSource, parse as parse_preset};
pub use source::{FetchError, PresetFetcher, PresetSourceRegistry, internal_preset};

/// Resolve all presets referenced by a config
pub async fn resolve_presets(
    config: &ConfigNode,
    registry: &PresetSourceRegistry,
) -> Result<ConfigNode> {
    resolve(config, registry, &[], Vec::new()).await
}

/// Resolve with an explicit skip list and cycle guard. `ignore_presets`
/// entries are never fetched; `seen_presets` breaks reference cycles.
pub fn resolve<'a>(
    config: &'a ConfigNode,
    registry: &'a PresetSourceRegistry,
    ignore_presets: &'a [String],
    seen_presets: Vec<String>,
) -> Pin<Box<dyn Future<Output = Result<ConfigNode>> + Send + 'a>> {
    Box::pin(async move {
        let mut ignore: Vec<String> = ignore_presets.to_vec();
        if let Some(own_ignores) = node::get_array(config, "ignorePresets") {
            for entry in own_ignores {
                if let Some(name) = entry.as_str() {
                    ignore.push(name.to_string());
                }
            }
        }

        let mut accumulated = ConfigNode::new();
        if let Some(extends) = node::get_array(config, "extends") {
            for entry in extends {
                let Some(preset) = entry.as_str() else {
                    return Err(ConfigError::preset(
                        PresetFault::InvalidPresetString,
                        entry.to_string(),
                        "extends entries must be strings",
                    ));
                };
                let preset = remap_preset(config, preset);
                let Some(preset) = preset else {
                    continue;
                };
                if seen_presets.iter().any(|seen| *seen == preset)
                    || ignore.iter().any(|skip| *skip == preset)
                {
                    tracing::trace!(preset, "skipping preset (seen or ignored)");
                    continue;
                }
                let resolved = resolve_one(&preset, registry, &ignore, &seen_presets).await?;
                node::merge_child_over_parent(&mut accumulated, &resolved);
            }
        }

        // The caller's own keys always win over anything a preset set
        let mut own = config.clone();
        own.remove("extends");
        own.remove("ignorePresets");
        node::merge_child_over_parent(&mut accumulated, &own);

        // Configuration objects can appear inside manager blocks or
        // packageRules entries; resolve their presets too
        let keys: Vec<String> = accumulated.keys().cloned().collect();
        for key in keys {
            if key == "encrypted" {
                continue;
            }
            let Some(value) = accumulated.get(&key).cloned() else {
                continue;
            };
            match value {
                Value::Object(nested) => {
                    let resolved =
                        resolve(&nested, registry, &ignore, seen_presets.clone()).await?;
                    accumulated.insert(key, Value::Object(resolved));
                }
                Value::Array(items) => {
                    let mut resolved_items = Vec::with_capacity(items.len());
                    for item in items {
                        resolved_items.push(match item {
                            Value::Object(nested) => Value::Object(
                                resolve(&nested, registry, &ignore, seen_presets.clone()).await?,
                            ),
                            other => other,
                        });
                    }
                    accumulated.insert(key, Value::Array(resolved_items));
                }
                _ => {}
            }
        }
        Ok(accumulated)
    })
}

/// Fetch and fully resolve a single preset reference
async fn resolve_one(
    preset: &str,
    registry: &PresetSourceRegistry,
    ignore: &[String],
    seen_presets: &[String],
) -> Result<ConfigNode> {
    let reference = parse::parse(preset)?;
    let fetched = registry
        .fetch(&reference)
        .await
        .map_err(|e| classify_fetch_error(e, preset))?;
    let substituted = match &reference.params {
        Some(params) => substitute_params(fetched, params),
        None => fetched,
    };
    let migrated = migrate(&substituted)
        .map_err(|e| e.within_preset(preset))?
        .result;
    let massaged = massage(&migrated);

    let mut seen = seen_presets.to_vec();
    seen.push(preset.to_string());
    resolve(&massaged, registry, ignore, seen)
        .await
        .map_err(|e| e.within_preset(preset))
}

/// Apply a `migratePresets` remap from the caller's config. An empty
/// replacement drops the reference entirely.
fn remap_preset(config: &ConfigNode, preset: &str) -> Option<String> {
    let Some(remaps) = node::get_object(config, "migratePresets") else {
        return Some(preset.to_string());
    };
    match remaps.get(preset) {
        Some(Value::String(replacement)) if replacement.is_empty() => None,
        Some(Value::String(replacement)) => Some(replacement.clone()),
        _ => Some(preset.to_string()),
    }
}

/// Substitute `{{arg0}}…{{argN}}` placeholders recursively over strings,
/// sequences, and objects
fn substitute_params(mut content: ConfigNode, params: &[String]) -> ConfigNode {
    let rewrite = |s: &str| -> Option<String> {
        let mut rewritten = s.to_string();
        for (index, param) in params.iter().enumerate() {
            rewritten = rewritten.replace(&format!("{{{{arg{index}}}}}"), param);
        }
        (rewritten != s).then_some(rewritten)
    };
    for (_, value) in content.iter_mut() {
        node::rewrite_strings(value, &rewrite);
    }
    content
}

/// Map a fetch failure into its user-facing classification. Transient host
/// errors are rethrown so retry policy stays with the caller.
fn classify_fetch_error(error: FetchError, preset: &str) -> ConfigError {
    match error {
        FetchError::PackageNotFound => ConfigError::preset(
            PresetFault::PackageNotFound,
            preset,
            "the preset's package or repository could not be found",
        ),
        FetchError::PresetNotFound => ConfigError::preset(
            PresetFault::PresetNotFound,
            preset,
            "the package exists but does not define this preset",
        ),
        FetchError::InvalidJson(detail) => {
            ConfigError::preset(PresetFault::InvalidJson, preset, detail)
        }
        FetchError::Unsupported(detail) => {
            ConfigError::preset(PresetFault::Unclassified, preset, detail)
        }
        FetchError::External(message) => ConfigError::external_host(message),
    }
}
