//! Upkeep Config
//!
//! Configuration resolution engine for automated dependency updates.
//! Takes a raw user configuration and turns it into a validated, canonical
//! form through four stages: migration of legacy options, massaging into
//! canonical shape, preset inheritance resolution, and validation.

pub mod collaborators;
pub mod diagnostics;
pub mod error;
pub mod massage;
pub mod migrate;
pub mod node;
pub mod options;
pub mod pipeline;
pub mod presets;
pub mod validate;

// Re-export commonly used types
pub use collaborators::{
    DefaultManagers, DefaultScheduleValidator, DefaultTemplateCompiler, LANGUAGES, MANAGERS,
    ManagerProvider, ScheduleValidator, TemplateCompiler, TemplateError,
};
pub use diagnostics::{Diagnostic, ValidationResult};
pub use error::{ConfigError, ErrorKind, PresetFault, Result};
pub use massage::massage;
pub use migrate::{MigrationOutcome, migrate};
pub use node::{ConfigNode, merge_child_over_parent};
pub use options::{OptionDescriptor, OptionType, descriptor, options};
pub use pipeline::{ResolvedConfig, resolve_config};
pub use presets::{
    FetchError, PresetFetcher, PresetReference, PresetSource, PresetSourceRegistry, parse_preset,
    resolve_presets,
};
pub use validate::{ValidationContext, validate};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("upkeep=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
