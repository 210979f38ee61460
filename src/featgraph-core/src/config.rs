//! Checker configuration.
//!
//! Every field has a default, so an empty `featgraph.toml` is valid:
//!
//! ```toml
//! feature_extension = "feature"
//! ignored_auto_feature_prefixes = ["com.ibm.websphere.appserver.eeCompatible-"]
//! intertwined_base_prefixes = ["com.ibm.websphere.appserver.appSecurity-"]
//! permitted_absences = ["com.ibm.websphere.appserver.servlet-3.0"]
//! expected_no_ship = ["io.openliberty.persistentExecutor.internal.ee-10.0"]
//! redundancy_exempt_prefixes = ["io.openliberty.servlet.internal-"]
//! disabled_rules = ["parallel-activation"]
//! ```
//!
//! `expected_no_ship` is empty unless configured; a listed feature that is
//! missing from the catalog is itself a finding.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FeatureError, FeatureResult};

/// Name of the configuration file looked up next to a feature root.
pub const CONFIG_FILE_NAME: &str = "featgraph.toml";

/// Configuration for loading and checking a feature tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Descriptor file extension, without the dot.
    #[serde(default = "default_feature_extension")]
    pub feature_extension: String,

    /// Auto-feature capability targets starting with one of these are ignored.
    #[serde(default = "default_ignored_auto_feature_prefixes")]
    pub ignored_auto_feature_prefixes: Vec<String>,

    /// Base names matching one of these depend on each other by design and
    /// are left out of the visibility partitions and tolerates checks. A
    /// prefix ending in `-` also matches the bare base name.
    #[serde(default = "default_intertwined_base_prefixes")]
    pub intertwined_base_prefixes: Vec<String>,

    /// Dependency names allowed to be absent from the catalog. These are
    /// the first versions of features that only ship commercially; the
    /// tolerated later versions are present.
    #[serde(default = "default_permitted_absences")]
    pub permitted_absences: Vec<String>,

    /// Dependencies that may be repeated next to a feature that already
    /// includes them.
    #[serde(default = "default_redundancy_exempt_prefixes")]
    pub redundancy_exempt_prefixes: Vec<String>,

    /// Features that are expected to exist with kind `noship`.
    #[serde(default)]
    pub expected_no_ship: Vec<String>,

    /// Name prefix of admin-center tools, which live in their own directory
    /// even when they are not public.
    #[serde(default = "default_admin_center_prefix")]
    pub admin_center_prefix: String,

    /// Validation rules to skip, by rule name.
    #[serde(default = "default_disabled_rules")]
    pub disabled_rules: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            feature_extension: default_feature_extension(),
            ignored_auto_feature_prefixes: default_ignored_auto_feature_prefixes(),
            intertwined_base_prefixes: default_intertwined_base_prefixes(),
            permitted_absences: default_permitted_absences(),
            redundancy_exempt_prefixes: default_redundancy_exempt_prefixes(),
            expected_no_ship: Vec::new(),
            admin_center_prefix: default_admin_center_prefix(),
            disabled_rules: default_disabled_rules(),
        }
    }
}

impl CheckConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> FeatureResult<Self> {
        debug!("Loading configuration from {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| FeatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> FeatureResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Looks for `featgraph.toml` in `dir`; returns defaults if absent.
    pub fn discover(dir: &Path) -> FeatureResult<Self> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns true if `base_name` belongs to an intertwined family.
    ///
    /// `appSecurity-` matches both `appSecurity` and `appSecurity-2.0`'s
    /// base name `appSecurity`.
    pub fn is_intertwined_base(&self, base_name: &str) -> bool {
        let dashed = format!("{}-", base_name);
        self.intertwined_base_prefixes
            .iter()
            .any(|prefix| dashed.starts_with(prefix.as_str()))
    }

    /// Returns true if a redundant dependency on `name` is acceptable.
    pub fn is_redundancy_exempt(&self, name: &str) -> bool {
        self.redundancy_exempt_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Returns true if an auto-feature target should be dropped.
    pub fn is_ignored_auto_target(&self, token: &str) -> bool {
        self.ignored_auto_feature_prefixes
            .iter()
            .any(|prefix| token.starts_with(prefix.as_str()))
    }

    /// Returns true if a dangling dependency on `name` is acceptable.
    pub fn permits_absence(&self, name: &str) -> bool {
        self.permitted_absences.iter().any(|n| n == name)
    }

    /// Returns true unless the rule is listed in `disabled_rules`.
    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule)
    }
}

fn default_feature_extension() -> String {
    "feature".to_string()
}

fn default_ignored_auto_feature_prefixes() -> Vec<String> {
    vec![
        "com.ibm.websphere.appserver.eeCompatible-".to_string(),
        "io.openliberty.mpCompatible-".to_string(),
        "io.openliberty.versionless.".to_string(),
    ]
}

fn default_intertwined_base_prefixes() -> Vec<String> {
    vec![
        "com.ibm.websphere.appserver.appSecurity-".to_string(),
        "com.ibm.websphere.appserver.javaeePlatform-".to_string(),
    ]
}

fn default_permitted_absences() -> Vec<String> {
    vec![
        "com.ibm.websphere.appserver.servlet-3.0".to_string(),
        "io.openliberty.servlet.internal-3.0".to_string(),
        "com.ibm.websphere.appserver.restConnector-1.0".to_string(),
        "com.ibm.websphere.appserver.jca-1.6".to_string(),
    ]
}

fn default_redundancy_exempt_prefixes() -> Vec<String> {
    vec![
        "com.ibm.websphere.appserver.eeCompatible-".to_string(),
        "io.openliberty.mpCompatible-".to_string(),
        "io.openliberty.servlet.internal-".to_string(),
    ]
}

fn default_admin_center_prefix() -> String {
    "com.ibm.websphere.appserver.adminCenter.tool".to_string()
}

fn default_disabled_rules() -> Vec<String> {
    vec!["parallel-activation".to_string()]
}
