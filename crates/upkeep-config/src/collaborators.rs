//! External collaborator interfaces
//!
//! The pipeline core does not own template rendering, schedule semantics, or
//! the manager catalog; it consumes them through the traits below. Default
//! in-crate implementations are provided so the pipeline is usable stand-alone
//! and testable without wiring.

use crate::node::ConfigNode;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Known package managers; used to validate `enabledManagers` and to build
/// the top-level-object exclusion list
pub const MANAGERS: &[&str] = &[
    "npm",
    "cargo",
    "pip_requirements",
    "gomod",
    "maven",
    "gradle",
    "dockerfile",
    "docker-compose",
    "github-actions",
    "bundler",
    "composer",
    "nuget",
    "terraform",
    "travis",
    "gitlabci",
    "gitlabci-include",
    "regex",
];

/// Known language groupings; also top-level-only object keys
pub const LANGUAGES: &[&str] = &[
    "js", "node", "python", "java", "golang", "ruby", "rust", "docker", "php", "dotnet", "elixir",
];

/// Provides the manager and language catalogs
pub trait ManagerProvider: Send + Sync {
    fn managers(&self) -> &[&str];
    fn languages(&self) -> &[&str];
}

/// Static default catalog
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultManagers;

impl ManagerProvider for DefaultManagers {
    fn managers(&self) -> &[&str] {
        MANAGERS
    }

    fn languages(&self) -> &[&str] {
        LANGUAGES
    }
}

/// Template compilation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError(pub String);

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TemplateError {}

/// Compiles `{{field}}` templates against a configuration context
pub trait TemplateCompiler: Send + Sync {
    fn compile(
        &self,
        template: &str,
        context: &ConfigNode,
        throw_on_missing: bool,
    ) -> Result<String, TemplateError>;
}

/// Runtime fields templates may reference even though they are absent from
/// the config context at validation time
const RUNTIME_FIELDS: &[&str] = &[
    "depName",
    "depNameLinked",
    "depType",
    "packageName",
    "packageFile",
    "packageFileDir",
    "currentValue",
    "currentVersion",
    "newValue",
    "newVersion",
    "newMajor",
    "newMinor",
    "newDigest",
    "updateType",
    "isMajor",
    "isPin",
    "datasource",
    "manager",
    "parentDir",
    "baseDir",
    "repository",
    "platform",
    "prettyDepType",
    "displayFrom",
    "displayTo",
];

/// Minimal brace-token template compiler.
///
/// Resolves `{{dotted.path}}` tokens against the context, accepts the known
/// runtime field names, and passes `{{#if}}`/`{{#unless}}`/`{{else}}` control
/// tokens through unevaluated. Unknown fields fail when `throw_on_missing` is
/// set, which is what surfaces nested-template faults during validation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTemplateCompiler;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").unwrap())
}

impl DefaultTemplateCompiler {
    fn lookup(context: &ConfigNode, path: &str) -> Option<String> {
        let mut current = Value::Object(context.clone());
        for segment in path.split('.') {
            current = current.get(segment)?.clone();
        }
        Some(match current {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}

impl TemplateCompiler for DefaultTemplateCompiler {
    fn compile(
        &self,
        template: &str,
        context: &ConfigNode,
        throw_on_missing: bool,
    ) -> Result<String, TemplateError> {
        if template.matches("{{").count() != template.matches("}}").count() {
            return Err(TemplateError(format!(
                "unbalanced template braces in \"{template}\""
            )));
        }
        let mut output = String::with_capacity(template.len());
        let mut last = 0;
        for capture in token_re().captures_iter(template) {
            let full = capture.get(0).ok_or_else(|| {
                TemplateError("internal template capture failure".to_string())
            })?;
            let token = capture[1].trim().to_string();
            output.push_str(&template[last..full.start()]);
            last = full.end();

            // Control tokens pass through for a later render stage
            if token.starts_with('#') || token.starts_with('/') || token == "else" {
                output.push_str(full.as_str());
                continue;
            }
            let field = token.trim_start_matches('@');
            if !field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
                || field.is_empty()
            {
                return Err(TemplateError(format!("invalid template expression {{{{{token}}}}}")));
            }
            if let Some(resolved) = Self::lookup(context, field) {
                output.push_str(&resolved);
            } else if RUNTIME_FIELDS.contains(&field.split('.').next().unwrap_or(field)) {
                // Known runtime field; resolves at render time
            } else if throw_on_missing {
                return Err(TemplateError(format!("unknown template field \"{field}\"")));
            }
        }
        output.push_str(&template[last..]);
        Ok(output)
    }
}

/// Validates schedule expressions and timezone names
pub trait ScheduleValidator: Send + Sync {
    /// Returns whether the value is a valid schedule, with an explanatory
    /// message when it is not
    fn has_valid_schedule(&self, value: &Value) -> (bool, Option<String>);

    /// Returns whether the value names a supported timezone
    fn has_valid_timezone(&self, value: &Value) -> (bool, Option<String>);
}

/// Subset of IANA timezone names the default validator accepts
const TIMEZONES: &[&str] = &[
    "UTC",
    "GMT",
    "Africa/Cairo",
    "Africa/Johannesburg",
    "Africa/Lagos",
    "America/Argentina/Buenos_Aires",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "America/Mexico_City",
    "America/New_York",
    "America/Sao_Paulo",
    "America/Toronto",
    "America/Vancouver",
    "Asia/Dubai",
    "Asia/Hong_Kong",
    "Asia/Jakarta",
    "Asia/Kolkata",
    "Asia/Seoul",
    "Asia/Shanghai",
    "Asia/Singapore",
    "Asia/Tokyo",
    "Australia/Melbourne",
    "Australia/Sydney",
    "Europe/Amsterdam",
    "Europe/Berlin",
    "Europe/Dublin",
    "Europe/Helsinki",
    "Europe/London",
    "Europe/Madrid",
    "Europe/Moscow",
    "Europe/Oslo",
    "Europe/Paris",
    "Europe/Prague",
    "Europe/Rome",
    "Europe/Stockholm",
    "Europe/Vienna",
    "Europe/Warsaw",
    "Europe/Zurich",
    "Pacific/Auckland",
];

/// Default schedule grammar: one or more clauses of time-of-day, day,
/// frequency, and month restrictions
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultScheduleValidator;

static SCHEDULE_RE: OnceLock<Regex> = OnceLock::new();

fn schedule_re() -> &'static Regex {
    SCHEDULE_RE.get_or_init(|| {
        let day = r"(?:mon|tues|wednes|thurs|fri|satur|sun)day";
        let time = r"\d{1,2}(?::\d{2})?\s?(?:am|pm)?";
        let clause = format!(
            r"(?:at any time|before {time}|after {time}|on {day}(?: and {day})*|on the (?:first|last) day of the month|every (?:weekday|weekend)|every \d+ (?:hours?|days?|weeks?|months?)|in (?:january|february|march|april|may|june|july|august|september|october|november|december))"
        );
        Regex::new(&format!(r"^{clause}(?:\s{clause})*$")).unwrap()
    })
}

impl ScheduleValidator for DefaultScheduleValidator {
    fn has_valid_schedule(&self, value: &Value) -> (bool, Option<String>) {
        let entries: Vec<&str> = match value {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => entries.push(s),
                        None => {
                            return (
                                false,
                                Some("Invalid schedule: contains a non-string entry".to_string()),
                            );
                        }
                    }
                }
                entries
            }
            _ => {
                return (
                    false,
                    Some("Invalid schedule: must be a string or array of strings".to_string()),
                );
            }
        };
        if entries.is_empty() {
            return (false, Some("Invalid schedule: empty".to_string()));
        }
        for entry in entries {
            if !schedule_re().is_match(&entry.to_lowercase()) {
                return (
                    false,
                    Some(format!("Invalid schedule: \"{entry}\" is not a supported schedule")),
                );
            }
        }
        (true, None)
    }

    fn has_valid_timezone(&self, value: &Value) -> (bool, Option<String>) {
        match value.as_str() {
            Some(tz) if TIMEZONES.contains(&tz) => (true, None),
            Some(tz) => (
                false,
                Some(format!("Invalid timezone: {tz}")),
            ),
            None => (false, Some("Invalid timezone: must be a string".to_string())),
        }
    }
}

/// Check a timezone name without going through a trait object; used by the
/// preset `:timezone(...)` validation
pub fn is_supported_timezone(tz: &str) -> bool {
    TIMEZONES.contains(&tz)
}
