//! Feature records and their classification enums.
//!
//! A [`FeatureRecord`] is built once from a parsed descriptor and is
//! immutable afterwards, except for the activating auto-feature set which
//! the catalog builder fills exactly once before handing the catalog out.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use featgraph_manifest::{Attrs, Clause, Manifest, ManifestError};
use serde::{Deserialize, Serialize};

use crate::config::CheckConfig;
use crate::error::{FeatureError, FeatureResult};

/// Descriptor header names.
pub mod headers {
    pub const SYMBOLIC_NAME: &str = "symbolicName";
    pub const SUBSYSTEM_SYMBOLIC_NAME: &str = "Subsystem-SymbolicName";
    pub const VISIBILITY: &str = "visibility";
    pub const SINGLETON: &str = "singleton";
    pub const SHORT_NAME: &str = "IBM-ShortName";
    pub const KIND: &str = "kind";
    pub const EDITION: &str = "edition";
    pub const FEATURES: &str = "-features";
    pub const SUBSYSTEM_CONTENT: &str = "Subsystem-Content";
    pub const PROVISION_CAPABILITY: &str = "IBM-Provision-Capability";
    pub const ACTIVATION_TYPE: &str = "WLP-Activation-Type";
    pub const DISABLE_ON_CONFLICT: &str = "WLP-DisableAllFeatures-OnConflict";
    pub const ALSO_KNOWN_AS: &str = "WLP-AlsoKnownAs";
}

/// Level given to absent or unrecognized kinds and editions.
pub const UNKNOWN_LEVEL: u8 = 99;

const IDENTITY_FILTER: &str = "osgi.identity=";
const FEATURE_CONTENT_TYPE: &str = "osgi.subsystem.feature";

static NO_ACTIVATORS: BTreeSet<String> = BTreeSet::new();

/// Access scope of a feature.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Auto,
    #[default]
    Private,
    Protected,
    Public,
}

impl Visibility {
    pub const ALL: [Visibility; 4] = [
        Visibility::Auto,
        Visibility::Private,
        Visibility::Protected,
        Visibility::Public,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Auto => "auto",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }

    /// Recognizes a visibility name, ignoring case and surrounding space.
    pub fn from_name(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shipping maturity of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    NoShip,
    Beta,
    Ga,
    Unknown,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::NoShip => "noship",
            Kind::Beta => "beta",
            Kind::Ga => "ga",
            Kind::Unknown => "unknown",
        }
    }

    pub fn from_name(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "noship" => Kind::NoShip,
            "beta" => Kind::Beta,
            "ga" => Kind::Ga,
            _ => Kind::Unknown,
        }
    }

    /// Lower levels are more restricted to ship.
    pub fn level(&self) -> u8 {
        match self {
            Kind::NoShip => 0,
            Kind::Beta => 1,
            Kind::Ga => 2,
            Kind::Unknown => UNKNOWN_LEVEL,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Product tier of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Full,
    Unsupported,
    Zos,
    Nd,
    Base,
    Core,
    Unknown,
}

impl Edition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edition::Full => "full",
            Edition::Unsupported => "unsupported",
            Edition::Zos => "zos",
            Edition::Nd => "nd",
            Edition::Base => "base",
            Edition::Core => "core",
            Edition::Unknown => "unknown",
        }
    }

    pub fn from_name(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full" => Edition::Full,
            "unsupported" => Edition::Unsupported,
            "zos" => Edition::Zos,
            "nd" => Edition::Nd,
            "base" => Edition::Base,
            "core" => Edition::Core,
            _ => Edition::Unknown,
        }
    }

    /// Lower levels are more advanced tiers; a feature may only depend on
    /// features at its own level or above.
    pub fn level(&self) -> u8 {
        match self {
            Edition::Full => 0,
            Edition::Unsupported => 1,
            Edition::Zos => 2,
            Edition::Nd => 3,
            Edition::Base => 4,
            Edition::Core => 5,
            Edition::Unknown => UNKNOWN_LEVEL,
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One loaded feature descriptor.
#[derive(Debug)]
pub struct FeatureRecord {
    name: String,
    base_name: String,
    version: Option<String>,
    short_name: Option<String>,
    edition: Edition,
    edition_text: Option<String>,
    kind: Kind,
    kind_text: Option<String>,
    singleton: bool,
    visibility: Visibility,
    visibility_text: Option<String>,
    auto_feature: bool,
    auto_feature_targets: BTreeSet<String>,
    activating_auto_features: OnceLock<BTreeSet<String>>,
    dependency_names: Vec<String>,
    dependency_attributes: BTreeMap<String, Attrs>,
    parallel_activation: bool,
    disable_on_conflict: bool,
    disable_on_conflict_set: bool,
    also_known_as: Option<String>,
    path: PathBuf,
}

impl FeatureRecord {
    /// Builds a record from parsed descriptor headers.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingRequiredHeader`] if the descriptor has
    /// no symbolic name, and [`FeatureError::Descriptor`] if a clause-list
    /// header is malformed.
    pub fn from_headers(
        manifest: &Manifest,
        path: &Path,
        config: &CheckConfig,
    ) -> FeatureResult<Self> {
        let descriptor_err = |source: ManifestError| FeatureError::Descriptor {
            path: path.to_path_buf(),
            source,
        };

        let mut symbolic: Option<Clause> = None;
        for header in [headers::SYMBOLIC_NAME, headers::SUBSYSTEM_SYMBOLIC_NAME] {
            let first = manifest
                .clauses(header)
                .map_err(descriptor_err)?
                .into_iter()
                .next();
            if first.is_some() {
                symbolic = first;
                break;
            }
        }
        let symbolic = symbolic
            .filter(|clause| !clause.name.trim().is_empty())
            .ok_or_else(|| FeatureError::MissingRequiredHeader {
                path: path.to_path_buf(),
                header: headers::SYMBOLIC_NAME.to_string(),
            })?;

        let name = symbolic.name.trim().to_string();
        let (base_name, version) = split_version(&name);

        let visibility_text = non_empty(manifest.header(headers::VISIBILITY))
            .or_else(|| non_empty(symbolic.attrs.directive("visibility")));
        let visibility = visibility_text
            .as_deref()
            .and_then(Visibility::from_name)
            .unwrap_or_default();

        let singleton_value = manifest
            .header(headers::SINGLETON)
            .or_else(|| symbolic.attrs.directive("singleton"));

        let kind_text = non_empty(manifest.header(headers::KIND));
        let edition_text = non_empty(manifest.header(headers::EDITION));

        let auto_feature = manifest.contains(headers::PROVISION_CAPABILITY);
        let auto_feature_targets = manifest
            .header(headers::PROVISION_CAPABILITY)
            .map(|expression| extract_auto_targets(expression, config))
            .unwrap_or_default();

        let mut dependency_attributes = BTreeMap::new();
        for clause in manifest.clauses(headers::FEATURES).map_err(descriptor_err)? {
            dependency_attributes
                .entry(clause.name.trim().to_string())
                .or_insert(clause.attrs);
        }
        for clause in manifest
            .clauses(headers::SUBSYSTEM_CONTENT)
            .map_err(descriptor_err)?
        {
            if clause.attrs.get("type") == Some(FEATURE_CONTENT_TYPE) {
                dependency_attributes
                    .entry(clause.name.trim().to_string())
                    .or_insert(clause.attrs);
            }
        }
        let dependency_names = dependency_attributes.keys().cloned().collect();

        let parallel_activation = manifest
            .header(headers::ACTIVATION_TYPE)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("parallel"));

        Ok(Self {
            name,
            base_name,
            version,
            short_name: non_empty(manifest.header(headers::SHORT_NAME)),
            edition: edition_text
                .as_deref()
                .map(Edition::from_name)
                .unwrap_or(Edition::Unknown),
            edition_text,
            kind: kind_text
                .as_deref()
                .map(Kind::from_name)
                .unwrap_or(Kind::Unknown),
            kind_text,
            singleton: header_bool(singleton_value, false),
            visibility,
            visibility_text,
            auto_feature,
            auto_feature_targets,
            activating_auto_features: OnceLock::new(),
            dependency_names,
            dependency_attributes,
            parallel_activation,
            disable_on_conflict: header_bool(manifest.header(headers::DISABLE_ON_CONFLICT), true),
            disable_on_conflict_set: manifest.contains(headers::DISABLE_ON_CONFLICT),
            also_known_as: non_empty(manifest.header(headers::ALSO_KNOWN_AS)),
            path: path.to_path_buf(),
        })
    }

    /// Reads and parses a descriptor file.
    pub fn read(path: &Path, config: &CheckConfig) -> FeatureResult<Self> {
        let manifest = Manifest::read(path).map_err(|source| match source {
            ManifestError::Io { path, source } => FeatureError::Io { path, source },
            other => FeatureError::Descriptor {
                path: path.to_path_buf(),
                source: other,
            },
        })?;
        Self::from_headers(&manifest, path, config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_versionless(&self) -> bool {
        self.version.is_none()
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    /// Edition as written in the descriptor, if any.
    pub fn edition_text(&self) -> Option<&str> {
        self.edition_text.as_deref()
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Kind as written in the descriptor, if any.
    pub fn kind_text(&self) -> Option<&str> {
        self.kind_text.as_deref()
    }

    pub fn is_no_ship(&self) -> bool {
        self.kind == Kind::NoShip
    }

    pub fn is_beta(&self) -> bool {
        self.kind == Kind::Beta
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Visibility as written in the descriptor, if any.
    pub fn visibility_text(&self) -> Option<&str> {
        self.visibility_text.as_deref()
    }

    /// True when a visibility was written but is not one of the four known
    /// values.
    pub fn has_unknown_visibility(&self) -> bool {
        self.visibility_text
            .as_deref()
            .is_some_and(|raw| Visibility::from_name(raw).is_none())
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn is_auto_feature(&self) -> bool {
        self.auto_feature
    }

    /// Features this auto feature may cause to activate.
    pub fn auto_feature_targets(&self) -> &BTreeSet<String> {
        &self.auto_feature_targets
    }

    /// Auto features that list this feature as a target.
    ///
    /// Empty until the catalog builder locks the set.
    pub fn activating_auto_features(&self) -> &BTreeSet<String> {
        self.activating_auto_features.get().unwrap_or(&NO_ACTIVATORS)
    }

    pub fn is_activation_locked(&self) -> bool {
        self.activating_auto_features.get().is_some()
    }

    /// Declared dependency names, sorted ascending.
    pub fn dependency_names(&self) -> &[String] {
        &self.dependency_names
    }

    pub fn dependency_attributes(&self) -> &BTreeMap<String, Attrs> {
        &self.dependency_attributes
    }

    pub fn dependency_attrs(&self, name: &str) -> Option<&Attrs> {
        self.dependency_attributes.get(name)
    }

    pub fn is_parallel_activation_enabled(&self) -> bool {
        self.parallel_activation
    }

    pub fn is_disable_on_conflict_enabled(&self) -> bool {
        self.disable_on_conflict
    }

    pub fn is_disable_on_conflict_set(&self) -> bool {
        self.disable_on_conflict_set
    }

    pub fn also_known_as(&self) -> Option<&str> {
        self.also_known_as.as_deref()
    }

    pub fn is_also_known_as_set(&self) -> bool {
        self.also_known_as.is_some()
    }

    /// Descriptor file this record was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Descriptor file name without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// Locks the activating auto-feature set.
    ///
    /// Called once by the catalog builder; a second call is a bug.
    pub(crate) fn lock_activating_auto_features(&self, activators: BTreeSet<String>) {
        let locked = self.activating_auto_features.set(activators).is_ok();
        assert!(
            locked,
            "activating auto features of '{}' were already locked",
            self.name
        );
    }
}

/// Splits `name` at its last `-` into base name and version.
///
/// A name without `-`, or ending in `-`, has no version.
pub fn split_version(name: &str) -> (String, Option<String>) {
    match name.rsplit_once('-') {
        Some((base, version)) if !version.is_empty() => {
            (base.to_string(), Some(version.to_string()))
        }
        _ => (name.to_string(), None),
    }
}

fn extract_auto_targets(expression: &str, config: &CheckConfig) -> BTreeSet<String> {
    expression
        .split(IDENTITY_FILTER)
        .skip(1)
        .filter_map(|segment| {
            let token = segment.split([')', '"']).next().unwrap_or("").trim();
            if token.is_empty() || config.is_ignored_auto_target(token) {
                None
            } else {
                Some(token.to_string())
            }
        })
        .collect()
}

fn header_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) if v.trim() == "true" => true,
        _ => default,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
