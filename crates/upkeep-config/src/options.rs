//! Static registry of recognized configuration options
//!
//! Every key read by the migration engine or the validator must resolve to
//! exactly one descriptor here, or be explicitly ignored. The table is built
//! once on first use and treated as immutable for the process lifetime.

use crate::collaborators::{LANGUAGES, MANAGERS};
use indexmap::IndexMap;
use std::sync::OnceLock;

/// Declared value type of a configuration option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Boolean,
    String,
    Integer,
    Array,
    Object,
}

/// A single recognized configuration option
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    pub name: &'static str,
    pub option_type: OptionType,
    /// Object key this option must nest under, when not inside a preset
    pub parent: Option<&'static str>,
    /// A bare string is coerced to a single-element array during massage
    pub allow_string: bool,
    /// Children of this option are not recursively validated
    pub free_choice: bool,
}

impl OptionDescriptor {
    fn new(name: &'static str, option_type: OptionType) -> Self {
        Self {
            name,
            option_type,
            parent: None,
            allow_string: false,
            free_choice: false,
        }
    }

    fn boolean(name: &'static str) -> Self {
        Self::new(name, OptionType::Boolean)
    }

    fn string(name: &'static str) -> Self {
        Self::new(name, OptionType::String)
    }

    fn integer(name: &'static str) -> Self {
        Self::new(name, OptionType::Integer)
    }

    fn array(name: &'static str) -> Self {
        Self::new(name, OptionType::Array)
    }

    fn object(name: &'static str) -> Self {
        Self::new(name, OptionType::Object)
    }

    fn parent(mut self, parent: &'static str) -> Self {
        self.parent = Some(parent);
        self
    }

    fn allow_string(mut self) -> Self {
        self.allow_string = true;
        self
    }

    fn free_choice(mut self) -> Self {
        self.free_choice = true;
        self
    }
}

static OPTIONS: OnceLock<IndexMap<&'static str, OptionDescriptor>> = OnceLock::new();

/// The process-wide option table, built once on first use
pub fn options() -> &'static IndexMap<&'static str, OptionDescriptor> {
    OPTIONS.get_or_init(build_options)
}

/// Look up the descriptor for a single option name
pub fn descriptor(name: &str) -> Option<&'static OptionDescriptor> {
    options().get(name)
}

/// True when the option coerces a bare string into a one-element array
pub fn allows_string(name: &str) -> bool {
    descriptor(name).is_some_and(|d| d.allow_string)
}

fn build_options() -> IndexMap<&'static str, OptionDescriptor> {
    let mut table = IndexMap::new();
    let descriptors = vec![
        // Core behavior
        OptionDescriptor::boolean("enabled"),
        OptionDescriptor::boolean("automerge"),
        OptionDescriptor::string("automergeType"),
        OptionDescriptor::boolean("dependencyDashboard"),
        OptionDescriptor::boolean("dependencyDashboardApproval"),
        OptionDescriptor::string("dependencyDashboardTitle"),
        OptionDescriptor::string("dependencyDashboardHeader"),
        OptionDescriptor::string("dependencyDashboardFooter"),
        OptionDescriptor::array("dependencyDashboardLabels").allow_string(),
        OptionDescriptor::boolean("separateMajorMinor"),
        OptionDescriptor::boolean("separateMultipleMajor"),
        OptionDescriptor::boolean("separateMinorPatch"),
        OptionDescriptor::string("rangeStrategy"),
        OptionDescriptor::string("versioning"),
        OptionDescriptor::string("semanticCommits"),
        OptionDescriptor::string("semanticCommitType"),
        OptionDescriptor::string("semanticCommitScope"),
        OptionDescriptor::string("binarySource"),
        OptionDescriptor::boolean("exposeAllEnv"),
        OptionDescriptor::boolean("allowScripts"),
        OptionDescriptor::boolean("allowCustomCrateRegistries"),
        OptionDescriptor::boolean("pinDigests"),
        OptionDescriptor::boolean("rebaseStalePrs"),
        OptionDescriptor::string("rebaseWhen"),
        OptionDescriptor::integer("prConcurrentLimit"),
        OptionDescriptor::integer("prHourlyLimit"),
        OptionDescriptor::integer("branchConcurrentLimit"),
        OptionDescriptor::integer("stabilityDays"),
        OptionDescriptor::string("extractVersion"),
        // Presets and scheduling
        OptionDescriptor::array("extends").allow_string(),
        OptionDescriptor::array("ignorePresets").allow_string(),
        OptionDescriptor::object("migratePresets"),
        OptionDescriptor::array("schedule").allow_string(),
        OptionDescriptor::string("timezone"),
        // Branches, paths, and grouping
        OptionDescriptor::array("baseBranches").allow_string(),
        OptionDescriptor::array("ignorePaths").allow_string(),
        OptionDescriptor::array("includePaths").allow_string(),
        OptionDescriptor::array("ignoreDeps").allow_string(),
        OptionDescriptor::string("branchPrefix"),
        OptionDescriptor::string("additionalBranchPrefix"),
        OptionDescriptor::string("branchTopic"),
        OptionDescriptor::string("groupName"),
        OptionDescriptor::string("groupSlug"),
        OptionDescriptor::object("group").free_choice(),
        // PR and commit content
        OptionDescriptor::string("commitMessage"),
        OptionDescriptor::string("commitBody"),
        OptionDescriptor::string("commitMessagePrefix"),
        OptionDescriptor::string("commitMessageAction"),
        OptionDescriptor::string("commitMessageTopic"),
        OptionDescriptor::string("commitMessageExtra"),
        OptionDescriptor::string("commitMessageSuffix"),
        OptionDescriptor::string("prTitle"),
        OptionDescriptor::string("prBody"),
        OptionDescriptor::string("prHeader"),
        OptionDescriptor::string("prFooter"),
        OptionDescriptor::string("prBodyTemplate"),
        OptionDescriptor::array("labels").allow_string(),
        OptionDescriptor::array("addLabels").allow_string(),
        OptionDescriptor::array("assignees").allow_string(),
        OptionDescriptor::array("reviewers").allow_string(),
        OptionDescriptor::array("description").allow_string(),
        OptionDescriptor::array("suppressNotifications").allow_string(),
        OptionDescriptor::boolean("azureAutoComplete"),
        OptionDescriptor::boolean("gitLabAutomerge"),
        OptionDescriptor::string("platformAutomerge"),
        // Managers and datasources
        OptionDescriptor::array("enabledManagers").allow_string(),
        OptionDescriptor::array("fileMatch").allow_string(),
        OptionDescriptor::string("registryUrlTemplate"),
        OptionDescriptor::array("registryUrls").allow_string(),
        OptionDescriptor::array("postUpdateOptions"),
        OptionDescriptor::object("registryAliases"),
        OptionDescriptor::object("customEnvVariables"),
        OptionDescriptor::object("secrets"),
        OptionDescriptor::object("encrypted").free_choice(),
        OptionDescriptor::string("npmToken"),
        OptionDescriptor::string("npmrc"),
        OptionDescriptor::array("hostRules"),
        OptionDescriptor::string("matchHost").parent("hostRules"),
        OptionDescriptor::string("hostType").parent("hostRules"),
        OptionDescriptor::string("token").parent("hostRules"),
        OptionDescriptor::string("username").parent("hostRules"),
        OptionDescriptor::string("password").parent("hostRules"),
        OptionDescriptor::integer("timeout").parent("hostRules"),
        // Package rules and selectors
        OptionDescriptor::array("packageRules"),
        OptionDescriptor::array("matchPaths").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchFiles").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchLanguages").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchBaseBranches").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchManagers").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchDatasources").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchDepTypes").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchPackageNames").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchPackagePatterns").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchSourceUrlPrefixes").allow_string().parent("packageRules"),
        OptionDescriptor::array("matchUpdateTypes").allow_string().parent("packageRules"),
        OptionDescriptor::string("matchCurrentVersion").parent("packageRules"),
        OptionDescriptor::array("excludePackageNames").allow_string().parent("packageRules"),
        OptionDescriptor::array("excludePackagePatterns").allow_string().parent("packageRules"),
        OptionDescriptor::string("allowedVersions").parent("packageRules"),
        // Update-type blocks
        OptionDescriptor::object("major"),
        OptionDescriptor::object("minor"),
        OptionDescriptor::object("patch"),
        OptionDescriptor::object("pin"),
        OptionDescriptor::object("digest"),
        OptionDescriptor::object("rollback"),
        OptionDescriptor::object("lockFileMaintenance"),
        OptionDescriptor::object("vulnerabilityAlerts").free_choice(),
        // Custom regex managers
        OptionDescriptor::array("regexManagers"),
        OptionDescriptor::array("matchStrings").allow_string().parent("regexManagers"),
        OptionDescriptor::string("matchStringsStrategy").parent("regexManagers"),
        OptionDescriptor::string("depNameTemplate").parent("regexManagers"),
        OptionDescriptor::string("packageNameTemplate").parent("regexManagers"),
        OptionDescriptor::string("datasourceTemplate").parent("regexManagers"),
        OptionDescriptor::string("versioningTemplate").parent("regexManagers"),
        OptionDescriptor::string("currentValueTemplate").parent("regexManagers"),
        OptionDescriptor::string("extractVersionTemplate").parent("regexManagers"),
    ];
    for descriptor in descriptors {
        table.insert(descriptor.name, descriptor);
    }
    // Every manager and language name is a nestable object option
    for manager in MANAGERS {
        table.insert(*manager, OptionDescriptor::object(manager));
    }
    for language in LANGUAGES {
        table.insert(*language, OptionDescriptor::object(language));
    }
    table
}
