//! End-to-end configuration resolution
//!
//! Chains the four stages in order: migrate legacy options, massage the tree
//! into canonical shape, resolve preset inheritance, and validate the result.
//! A recoverable preset failure does not abort the run; it becomes a blocking
//! diagnostic and the pre-preset config is validated instead.

use crate::diagnostics::ValidationResult;
use crate::error::Result;
use crate::massage::massage;
use crate::migrate::migrate;
use crate::node::ConfigNode;
use crate::presets::{PresetSourceRegistry, resolve_presets};
use crate::validate::{ValidationContext, validate};

/// The outcome of a full resolution run
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The migrated, massaged, preset-resolved config
    pub config: ConfigNode,
    /// Errors and warnings found in the resolved config
    pub validation: ValidationResult,
}

impl ResolvedConfig {
    /// True when no blocking errors were found
    pub fn is_valid(&self) -> bool {
        self.validation.is_ok()
    }
}

/// Run the full pipeline over a raw input config
pub async fn resolve_config(
    input: &ConfigNode,
    registry: &PresetSourceRegistry,
    ctx: &ValidationContext<'_>,
) -> Result<ResolvedConfig> {
    let migrated = migrate(input)?;
    if migrated.changed {
        tracing::debug!("legacy config options were migrated");
    }
    let massaged = massage(&migrated.result);

    let (config, preset_failure) = match resolve_presets(&massaged, registry).await {
        Ok(resolved) => (resolved, None),
        Err(e) if e.is_recoverable() => {
            tracing::warn!(error = %e, "preset resolution failed; validating config without presets");
            (massaged, Some(e))
        }
        // Host and internal failures mean the run itself cannot proceed
        Err(e) => return Err(e),
    };

    let mut validation = validate(&config, false, None, ctx);
    if let Some(failure) = preset_failure {
        validation.error("Preset resolution error", failure.to_string());
        validation.sort();
    }

    Ok(ResolvedConfig { config, validation })
}
