//! Diagnostic types produced by config validation

use serde::{Deserialize, Serialize};

/// A structured error or warning with a topic and message
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Short topic grouping related diagnostics (e.g. "Configuration Error")
    pub topic: String,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message: message.into(),
        }
    }
}

/// The outcome of a validation pass: blocking errors and advisory warnings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Fatal to config use; the config must not be used as-is
    pub errors: Vec<Diagnostic>,
    /// Advisory only; surfaced but never block use
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a blocking error
    pub fn error(&mut self, topic: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(topic, message));
    }

    /// Record an advisory warning
    pub fn warn(&mut self, topic: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Diagnostic::new(topic, message));
    }

    /// Absorb another result's diagnostics
    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Sort both lists by (topic, message) for deterministic output
    pub fn sort(&mut self) {
        self.errors.sort();
        self.warnings.sort();
    }

    /// True when no blocking errors were recorded
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
