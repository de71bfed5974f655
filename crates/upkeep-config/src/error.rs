//! Error types and handling for configuration resolution

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Classification of a preset resolution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetFault {
    /// The referenced preset package/repository does not exist
    PackageNotFound,
    /// The package exists but does not contain the named preset
    PresetNotFound,
    /// The preset content could not be parsed as JSON
    InvalidJson,
    /// The preset reference string itself could not be parsed
    InvalidPresetString,
    /// A subdirectory preset path was combined with a sub-preset name
    ProhibitedSubPreset,
    /// Anything that does not fit a more specific class
    Unclassified,
}

impl PresetFault {
    /// Human-readable classification used in diagnostics
    pub fn description(self) -> &'static str {
        match self {
            PresetFault::PackageNotFound => "Cannot find preset's package",
            PresetFault::PresetNotFound => "Preset name not found within published preset config",
            PresetFault::InvalidJson => "Preset is invalid JSON",
            PresetFault::InvalidPresetString => "Preset reference is malformed",
            PresetFault::ProhibitedSubPreset => {
                "Sub-preset names are not supported with preset paths"
            }
            PresetFault::Unclassified => "Preset caused unexpected error",
        }
    }
}

/// Main error type for the configuration pipeline
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A preset could not be resolved; blocking but classified so the caller
    /// can surface it as a validation diagnostic
    #[error("{} ({preset}): {message}", fault.description())]
    Preset {
        fault: PresetFault,
        preset: String,
        message: String,
    },

    /// Transient host/network failure during preset fetch; never downgraded
    /// to a validation error so retry policy stays with the caller
    #[error("External host error: {message}")]
    ExternalHost { message: String },

    /// Internal invariant violation (malformed migration pattern, etc.);
    /// fatal, no partial result
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Preset,
    ExternalHost,
    Internal,
}

impl ConfigError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Preset { .. } => ErrorKind::Preset,
            ConfigError::ExternalHost { .. } => ErrorKind::ExternalHost,
            ConfigError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (the caller may surface it as a
    /// diagnostic and continue with the rest of the config)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Preset)
    }

    /// Create a preset resolution error
    pub fn preset(fault: PresetFault, preset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Preset {
            fault,
            preset: preset.into(),
            message: message.into(),
        }
    }

    /// Create a transient host error
    pub fn external_host(message: impl Into<String>) -> Self {
        Self::ExternalHost {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Append a note attributing the fault to an enclosing preset chain.
    /// Host errors propagate verbatim.
    pub fn within_preset(self, enclosing: &str) -> Self {
        match self {
            ConfigError::Preset {
                fault,
                preset,
                message,
            } => ConfigError::Preset {
                fault,
                preset,
                message: format!("{message} (referenced by \"{enclosing}\")"),
            },
            other => other,
        }
    }
}
