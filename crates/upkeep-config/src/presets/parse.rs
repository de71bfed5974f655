//! Preset reference string grammar
//!
//! A preset reference names an externally stored partial configuration:
//! explicit source prefixes (`github>owner/repo`), scoped npm packages
//! (`@scope/pkg:name`), internal namespaces (`:name`, `config:base`),
//! subdirectory paths (`repo//path/file`), `#tag` pins, and parenthesized
//! positional parameters are all recognized here.

use crate::error::{ConfigError, PresetFault, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Where a preset is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetSource {
    Github,
    Gitlab,
    Gitea,
    Npm,
    Local,
    Internal,
}

/// A parsed preset reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetReference {
    pub source: PresetSource,
    pub repo: String,
    pub preset_path: Option<String>,
    pub preset_name: String,
    pub tag: Option<String>,
    pub params: Option<Vec<String>>,
}

/// Closed list of internal preset namespaces
pub const INTERNAL_NAMESPACES: &[&str] = &[
    "default",
    "config",
    "group",
    "monorepo",
    "packages",
    "preview",
    "replacements",
    "schedule",
    "workarounds",
    "npm",
    "docker",
    "helpers",
];

static SUBDIR_RE: OnceLock<Regex> = OnceLock::new();

fn subdir_re() -> &'static Regex {
    SUBDIR_RE.get_or_init(|| {
        Regex::new(r"^[\w\-./]+?//(?:[\w\-./]+?/)?[\w\-.]+$").unwrap()
    })
}

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][\w\-./]*$").unwrap())
}

fn invalid(input: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::preset(PresetFault::InvalidPresetString, input, message)
}

/// Parse a preset reference string
pub fn parse(input: &str) -> Result<PresetReference> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty preset string"));
    }

    // Positional parameters: "preset(p1, p2)"
    let (body, params) = match trimmed.strip_suffix(')') {
        Some(before_close) => {
            let open = before_close
                .find('(')
                .ok_or_else(|| invalid(input, "unmatched closing parenthesis"))?;
            let list: Vec<String> = before_close[open + 1..]
                .split(',')
                .map(|p| p.trim().to_string())
                .collect();
            if list.iter().any(String::is_empty) {
                return Err(invalid(input, "empty preset parameter"));
            }
            (&before_close[..open], Some(list))
        }
        None => {
            if trimmed.contains('(') {
                return Err(invalid(input, "unmatched opening parenthesis"));
            }
            (trimmed, None)
        }
    };

    // Explicit source prefix
    let (explicit_source, mut rest) = if let Some(r) = body.strip_prefix("github>") {
        (Some(PresetSource::Github), r)
    } else if let Some(r) = body.strip_prefix("gitlab>") {
        (Some(PresetSource::Gitlab), r)
    } else if let Some(r) = body.strip_prefix("gitea>") {
        (Some(PresetSource::Gitea), r)
    } else if let Some(r) = body.strip_prefix("local>") {
        (Some(PresetSource::Local), r)
    } else {
        (None, body)
    };

    // Version/tag pin
    let mut tag = None;
    if let Some(idx) = rest.find('#') {
        let candidate = &rest[idx + 1..];
        if !tag_re().is_match(candidate) {
            return Err(invalid(input, format!("invalid tag \"{candidate}\"")));
        }
        tag = Some(candidate.to_string());
        rest = &rest[..idx];
    }

    // Subdirectory form: repo//path/to/file; mutually exclusive with a
    // sub-preset name
    if rest.contains("//") {
        if rest.contains(':') {
            return Err(ConfigError::preset(
                PresetFault::ProhibitedSubPreset,
                input,
                "cannot combine a subdirectory preset path with a sub-preset name",
            ));
        }
        if !subdir_re().is_match(rest) {
            return Err(invalid(input, "malformed subdirectory preset path"));
        }
        let (repo, file_path) = rest
            .split_once("//")
            .ok_or_else(|| invalid(input, "malformed subdirectory preset path"))?;
        let (preset_path, preset_name) = match file_path.rsplit_once('/') {
            Some((path, name)) => (Some(path.to_string()), name.to_string()),
            None => (None, file_path.to_string()),
        };
        return Ok(PresetReference {
            source: explicit_source.unwrap_or(PresetSource::Local),
            repo: repo.to_string(),
            preset_path,
            preset_name,
            tag,
            params,
        });
    }

    // Scoped npm package: @scope[/pkg][:name]
    if rest.starts_with('@') {
        let (pkg, name) = match rest.split_once(':') {
            Some((pkg, name)) => (pkg, name),
            None => (rest, "default"),
        };
        if pkg.len() < 2 || name.is_empty() || name.contains(':') || name.contains('/') {
            return Err(invalid(input, "malformed scoped preset"));
        }
        return Ok(PresetReference {
            source: explicit_source.unwrap_or(PresetSource::Npm),
            repo: pkg.to_string(),
            preset_path: None,
            preset_name: name.to_string(),
            tag,
            params,
        });
    }

    // Internal shorthand: ":name" is the default namespace
    if let Some(name) = rest.strip_prefix(':') {
        if name.is_empty() || name.contains(':') || name.contains('/') {
            return Err(invalid(input, "malformed internal preset name"));
        }
        return Ok(PresetReference {
            source: PresetSource::Internal,
            repo: "default".to_string(),
            preset_path: None,
            preset_name: name.to_string(),
            tag,
            params,
        });
    }

    if let Some((left, name)) = rest.split_once(':') {
        if left.is_empty() || name.is_empty() || name.contains(':') || name.contains('/') {
            return Err(invalid(input, "malformed preset name"));
        }
        // "namespace:name" against the closed internal list, unless an
        // explicit source says otherwise; pathlike repos infer local
        let source = match explicit_source {
            Some(source) => source,
            None if INTERNAL_NAMESPACES.contains(&left) => PresetSource::Internal,
            None if left.contains('/') => PresetSource::Local,
            None => PresetSource::Npm,
        };
        return Ok(PresetReference {
            source,
            repo: left.to_string(),
            preset_path: None,
            preset_name: name.to_string(),
            tag,
            params,
        });
    }

    if rest.is_empty() {
        return Err(invalid(input, "missing preset repository"));
    }

    // No sub-preset name: default preset. Source falls back to local for
    // pathlike strings, npm otherwise.
    let source = match explicit_source {
        Some(source) => source,
        None if rest.contains('/') => PresetSource::Local,
        None => PresetSource::Npm,
    };
    Ok(PresetReference {
        source,
        repo: rest.to_string(),
        preset_path: None,
        preset_name: "default".to_string(),
        tag,
        params,
    })
}
