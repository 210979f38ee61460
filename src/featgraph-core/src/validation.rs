//! Cross-feature consistency rules.
//!
//! Each [`Rule`] inspects the whole catalog and reports every offending
//! feature as a [`Finding`]. Rules never abort: a catalog with findings is
//! still a valid catalog.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use featgraph_manifest::Attrs;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::FeatureCatalog;
use crate::config::CheckConfig;
use crate::record::{Edition, FeatureRecord, Kind, Visibility, split_version};
use crate::verifier::{Classification, ConflictReport, verify_all};

const TOLERATES: &str = "ibm.tolerates";

/// A named consistency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    FileName,
    VisibilityPlacement,
    VisibilityBase,
    VisibilityAttributes,
    Edition,
    Kind,
    Singleton,
    DependentAutoFeature,
    DisableOnConflict,
    ParallelActivation,
    MissingDependency,
    NonTransitiveTolerates,
    RedundantDependency,
    AutoFeatureMultiplicity,
    NoShip,
    Localization,
    KindConflict,
    EditionConflict,
}

impl Rule {
    pub const ALL: [Rule; 18] = [
        Rule::FileName,
        Rule::VisibilityPlacement,
        Rule::VisibilityBase,
        Rule::VisibilityAttributes,
        Rule::Edition,
        Rule::Kind,
        Rule::Singleton,
        Rule::DependentAutoFeature,
        Rule::DisableOnConflict,
        Rule::ParallelActivation,
        Rule::MissingDependency,
        Rule::NonTransitiveTolerates,
        Rule::RedundantDependency,
        Rule::AutoFeatureMultiplicity,
        Rule::NoShip,
        Rule::Localization,
        Rule::KindConflict,
        Rule::EditionConflict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::FileName => "file-name",
            Rule::VisibilityPlacement => "visibility-placement",
            Rule::VisibilityBase => "visibility-base",
            Rule::VisibilityAttributes => "visibility-attributes",
            Rule::Edition => "edition",
            Rule::Kind => "kind",
            Rule::Singleton => "singleton",
            Rule::DependentAutoFeature => "dependent-auto-feature",
            Rule::DisableOnConflict => "disable-on-conflict",
            Rule::ParallelActivation => "parallel-activation",
            Rule::MissingDependency => "missing-dependency",
            Rule::NonTransitiveTolerates => "non-transitive-tolerates",
            Rule::RedundantDependency => "redundant-dependency",
            Rule::AutoFeatureMultiplicity => "auto-feature-multiplicity",
            Rule::NoShip => "no-ship",
            Rule::Localization => "localization",
            Rule::KindConflict => "kind-conflict",
            Rule::EditionConflict => "edition-conflict",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.as_str() == name.trim())
    }

    /// Rules that need the directory layout and are skipped for catalogs
    /// built from in-memory records.
    pub fn needs_layout(&self) -> bool {
        matches!(self, Rule::VisibilityPlacement | Rule::Localization)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: Rule,
    pub feature: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule, self.feature, self.message)
    }
}

/// All findings of a validation run, grouped by rule in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Rule, feature: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            rule,
            feature: feature.into(),
            message: message.into(),
        });
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn by_rule(&self, rule: Rule) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.rule == rule)
    }

    /// Finding count per rule; rules without findings are absent.
    pub fn counts(&self) -> BTreeMap<Rule, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            *counts.entry(finding.rule).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Runs the enabled rules against a catalog.
#[derive(Debug, Clone)]
pub struct CatalogValidator {
    enabled: BTreeSet<Rule>,
    config: CheckConfig,
}

impl CatalogValidator {
    /// Creates a validator with every rule enabled except those listed in
    /// `config.disabled_rules`. Unknown names are ignored with a warning.
    pub fn new(config: &CheckConfig) -> Self {
        for name in &config.disabled_rules {
            if Rule::from_name(name).is_none() {
                warn!("Ignoring unknown rule '{}' in disabled_rules", name);
            }
        }

        let enabled = Rule::ALL
            .into_iter()
            .filter(|rule| config.is_rule_enabled(rule.as_str()))
            .collect();

        Self {
            enabled,
            config: config.clone(),
        }
    }

    pub fn is_enabled(&self, rule: Rule) -> bool {
        self.enabled.contains(&rule)
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.enabled.iter().copied()
    }

    pub fn validate(&self, catalog: &FeatureCatalog) -> ValidationReport {
        let mut report = ValidationReport::new();
        let mut conflicts: Option<ConflictReport> = None;
        let mut walks: Option<Vec<DependencyWalk<'_>>> = None;

        for rule in self.enabled_rules() {
            if rule.needs_layout() && catalog.scan().is_none() {
                debug!("Skipping rule {}: catalog has no directory layout", rule);
                continue;
            }

            let before = report.len();
            match rule {
                Rule::FileName => check_file_names(catalog, &mut report),
                Rule::VisibilityPlacement => check_visibility_placement(catalog, &mut report),
                Rule::VisibilityBase => check_visibility_base(catalog, &mut report),
                Rule::VisibilityAttributes => {
                    check_visibility_attributes(catalog, &self.config, &mut report)
                }
                Rule::Edition => check_editions(catalog, &mut report),
                Rule::Kind => check_kinds(catalog, &mut report),
                Rule::Singleton => check_singletons(catalog, &mut report),
                Rule::DependentAutoFeature => check_dependent_auto_features(catalog, &mut report),
                Rule::DisableOnConflict => check_disable_on_conflict(catalog, &mut report),
                Rule::ParallelActivation => check_parallel_activation(catalog, &mut report),
                Rule::MissingDependency => {
                    check_missing_dependencies(catalog, &self.config, &mut report)
                }
                Rule::NonTransitiveTolerates => {
                    let walks = walks.get_or_insert_with(|| walk_all(catalog, &self.config));
                    check_non_transitive_tolerates(catalog, &self.config, walks, &mut report)
                }
                Rule::RedundantDependency => {
                    let walks = walks.get_or_insert_with(|| walk_all(catalog, &self.config));
                    check_redundant_dependencies(catalog, walks, &mut report)
                }
                Rule::AutoFeatureMultiplicity => {
                    check_auto_feature_multiplicity(catalog, &mut report)
                }
                Rule::NoShip => check_no_ship(catalog, &self.config, &mut report),
                Rule::Localization => check_localization(catalog, &self.config, &mut report),
                Rule::KindConflict | Rule::EditionConflict => {
                    let conflicts = conflicts.get_or_insert_with(|| verify_all(catalog));
                    check_conflicts(catalog, conflicts, rule, &mut report)
                }
            }
            debug!("Rule {} produced {} findings", rule, report.len() - before);
        }

        report
    }
}

fn check_file_names(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter() {
        if record.file_stem() != Some(record.name()) {
            report.push(
                Rule::FileName,
                record.name(),
                format!("declared in {}", record.path().display()),
            );
        }
    }
}

/// Directory category a feature belongs in. `None` for an auto feature that
/// is not private, which `visibility-attributes` reports.
fn expected_category(record: &FeatureRecord) -> Option<&'static str> {
    if record.is_auto_feature() {
        record.is_private().then_some(Visibility::Auto.as_str())
    } else {
        Some(record.visibility().as_str())
    }
}

fn check_visibility_placement(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    let Some(scan) = catalog.scan() else {
        return;
    };

    for record in catalog.iter() {
        let Some(expected) = expected_category(record) else {
            continue;
        };
        let placed = scan
            .category(expected)
            .is_some_and(|files| files.contains(record.path()));
        if !placed {
            report.push(
                Rule::VisibilityPlacement,
                record.name(),
                format!(
                    "{} feature missing from [{}], found in [{}]",
                    record.visibility(),
                    expected,
                    scan.actual_category(record.path()).unwrap_or("<root>")
                ),
            );
        }
    }
}

fn check_visibility_base(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    let mut first_seen: BTreeMap<&str, &FeatureRecord> = BTreeMap::new();

    for record in catalog.iter() {
        if record.is_auto_feature() || record.is_versionless() {
            continue;
        }
        match first_seen.get(record.base_name()) {
            Some(prior) if prior.visibility() != record.visibility() => {
                report.push(
                    Rule::VisibilityBase,
                    record.name(),
                    format!(
                        "visibility {} differs from {} ({})",
                        record.visibility(),
                        prior.name(),
                        prior.visibility()
                    ),
                );
            }
            Some(_) => {}
            None => {
                first_seen.insert(record.base_name(), record);
            }
        }
    }
}

fn check_visibility_attributes(
    catalog: &FeatureCatalog,
    config: &CheckConfig,
    report: &mut ValidationReport,
) {
    let rule = Rule::VisibilityAttributes;
    let check_layout = catalog.scan().is_some();

    for record in catalog.iter() {
        let name = record.name();
        if record.has_unknown_visibility() {
            report.push(
                rule,
                name,
                format!(
                    "unknown visibility '{}'",
                    record.visibility_text().unwrap_or_default()
                ),
            );
            continue;
        }

        let is_admin_center = name.starts_with(config.admin_center_prefix.as_str());

        if record.is_auto_feature() && !record.is_private() {
            report.push(
                rule,
                name,
                format!("auto feature is {} but must be private", record.visibility()),
            );
        }

        let own_directory = record.is_public() || is_admin_center;
        match (own_directory, record.short_name()) {
            (true, None) => {
                report.push(rule, name, "public or admin-center feature has no short name")
            }
            (false, Some(short)) => report.push(
                rule,
                name,
                format!("non-public feature has short name '{}'", short),
            ),
            _ => {}
        }

        if !record.is_public() {
            if record.is_auto_feature() && record.is_disable_on_conflict_set() {
                report.push(
                    rule,
                    name,
                    "non-public auto feature sets WLP-DisableAllFeatures-OnConflict",
                );
            }
            if let Some(aka) = record.also_known_as() {
                report.push(
                    rule,
                    name,
                    format!("non-public feature sets WLP-AlsoKnownAs '{}'", aka),
                );
            }
        }

        if check_layout {
            check_directory_names(record, own_directory, report);
        }
    }
}

fn check_directory_names(
    record: &FeatureRecord,
    own_directory: bool,
    report: &mut ValidationReport,
) {
    let file_category = if record.is_auto_feature() {
        Visibility::Auto.as_str()
    } else {
        record.visibility().as_str()
    };

    let parent = record.path().parent();
    let (sub_dir, category) = if own_directory {
        (
            parent.and_then(dir_name),
            parent.and_then(Path::parent).and_then(dir_name),
        )
    } else {
        (None, parent.and_then(dir_name))
    };

    if category != Some(file_category) {
        report.push(
            Rule::VisibilityAttributes,
            record.name(),
            format!(
                "in [{}] but should be in [{}]",
                category.unwrap_or("<none>"),
                file_category
            ),
        );
    }

    if own_directory && sub_dir != record.short_name() {
        report.push(
            Rule::VisibilityAttributes,
            record.name(),
            format!(
                "in directory [{}] but must be in [{}]",
                sub_dir.unwrap_or("<none>"),
                record.short_name().unwrap_or("<none>")
            ),
        );
    }
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn check_editions(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter() {
        let edition = record.edition();
        match edition {
            Edition::Full if record.kind() != Kind::NoShip => report.push(
                Rule::Edition,
                record.name(),
                format!("edition full requires kind noship, found {}", record.kind()),
            ),
            Edition::Base | Edition::Core if record.kind() == Kind::NoShip => report.push(
                Rule::Edition,
                record.name(),
                format!("kind noship requires edition full, found {}", edition),
            ),
            Edition::Full | Edition::Base | Edition::Core => {}
            _ => report.push(
                Rule::Edition,
                record.name(),
                format!(
                    "unsupported edition '{}'",
                    record.edition_text().unwrap_or("<none>")
                ),
            ),
        }
    }
}

fn check_kinds(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter() {
        if record.kind() == Kind::Unknown {
            report.push(
                Rule::Kind,
                record.name(),
                format!(
                    "unsupported kind '{}'",
                    record.kind_text().unwrap_or("<none>")
                ),
            );
        }
    }
}

fn check_singletons(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter() {
        if record.is_auto_feature() && record.is_singleton() {
            report.push(Rule::Singleton, record.name(), "auto feature marked as singleton");
        }
    }

    for (base_name, by_visibility) in catalog.visibility_partitions() {
        for (visibility, names) in by_visibility {
            if names.len() <= 1 {
                continue;
            }
            for record in catalog.partition(base_name, *visibility) {
                // Versionless features share a base name with their versions.
                if !record.is_singleton() && !record.is_versionless() {
                    report.push(
                        Rule::Singleton,
                        record.name(),
                        format!("non-singleton has {} cohorts", names.len()),
                    );
                }
            }
        }
    }
}

fn check_dependent_auto_features(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter() {
        for dep in catalog.resolved_dependencies(record) {
            if dep.is_auto_feature() {
                report.push(
                    Rule::DependentAutoFeature,
                    record.name(),
                    format!("depends on auto feature {}", dep.name()),
                );
            }
        }
    }
}

fn check_disable_on_conflict(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter() {
        if record.is_disable_on_conflict_enabled() {
            continue;
        }
        for dep in catalog.resolved_dependencies(record) {
            if dep.is_disable_on_conflict_enabled() {
                report.push(
                    Rule::DisableOnConflict,
                    record.name(),
                    format!(
                        "disable-on-conflict is off but dependency {} has it on",
                        dep.name()
                    ),
                );
            }
        }
    }
}

fn check_parallel_activation(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter() {
        if !record.is_parallel_activation_enabled() {
            continue;
        }
        for dep in catalog.resolved_dependencies(record) {
            if !dep.is_parallel_activation_enabled() {
                report.push(
                    Rule::ParallelActivation,
                    record.name(),
                    format!("parallel activation conflicts with {}", dep.name()),
                );
            }
        }
    }
}

fn check_missing_dependencies(
    catalog: &FeatureCatalog,
    config: &CheckConfig,
    report: &mut ValidationReport,
) {
    for record in catalog.iter() {
        let missing: Vec<&str> = catalog
            .missing_dependencies(record)
            .filter(|name| !config.permits_absence(name))
            .collect();
        if !missing.is_empty() {
            report.push(
                Rule::MissingDependency,
                record.name(),
                format!("unresolved [{}]", missing.join(", ")),
            );
        }
    }
}

fn tolerates(attrs: &Attrs) -> bool {
    attrs.directive(TOLERATES).is_some()
}

fn api_jar_disabled(attrs: &Attrs) -> bool {
    attrs.get("apiJar").is_some_and(|v| v.trim() == "false")
}

/// Everything reachable through one feature's dependencies.
struct DependencyWalk<'a> {
    root: &'a FeatureRecord,
    /// Tolerated base names declared by the root's direct dependencies,
    /// with the paths that declare them.
    nearby_tolerated: BTreeMap<String, BTreeSet<String>>,
    /// Tolerated base names declared anywhere below the root.
    tolerated_bases: BTreeSet<String>,
    /// Direct dependencies that some other dependency already includes,
    /// with the including paths.
    redundant: BTreeMap<String, BTreeSet<String>>,
}

struct WalkStep<'a> {
    record: &'a FeatureRecord,
    path: String,
    depth: usize,
    tolerates_ancestor: bool,
    api_jar_disabled: bool,
}

fn walk_all<'a>(catalog: &'a FeatureCatalog, config: &CheckConfig) -> Vec<DependencyWalk<'a>> {
    catalog
        .iter()
        .map(|record| walk_dependencies(catalog, config, record))
        .collect()
}

fn walk_dependencies<'a>(
    catalog: &'a FeatureCatalog,
    config: &CheckConfig,
    root: &'a FeatureRecord,
) -> DependencyWalk<'a> {
    let mut walk = DependencyWalk {
        root,
        nearby_tolerated: BTreeMap::new(),
        tolerated_bases: BTreeSet::new(),
        redundant: BTreeMap::new(),
    };

    let plain_direct: BTreeSet<&str> = root
        .dependency_attributes()
        .iter()
        .filter(|(_, attrs)| !tolerates(attrs))
        .map(|(name, _)| name.as_str())
        .collect();

    let mut stack: Vec<WalkStep<'a>> = root
        .dependency_attributes()
        .iter()
        .rev()
        .filter_map(|(name, attrs)| {
            catalog.get(name).map(|record| WalkStep {
                record,
                path: format!("{} -> {}", root.name(), name),
                depth: 1,
                tolerates_ancestor: tolerates(attrs),
                api_jar_disabled: api_jar_disabled(attrs),
            })
        })
        .collect();
    let mut expanded: HashSet<(&str, bool, bool)> = HashSet::new();

    while let Some(step) = stack.pop() {
        let state = (step.record.name(), step.tolerates_ancestor, step.api_jar_disabled);
        if !expanded.insert(state) {
            continue;
        }

        for (name, attrs) in step.record.dependency_attributes() {
            let tolerated = tolerates(attrs);
            let api_disabled = step.api_jar_disabled || api_jar_disabled(attrs);

            if tolerated {
                let (base, _) = split_version(name);
                if step.depth == 1 {
                    walk.nearby_tolerated
                        .entry(base.clone())
                        .or_default()
                        .insert(step.path.clone());
                }
                walk.tolerated_bases.insert(base);
            } else if !step.tolerates_ancestor
                && !api_disabled
                && plain_direct.contains(name.as_str())
                && !config.is_redundancy_exempt(name)
            {
                walk.redundant
                    .entry(name.clone())
                    .or_default()
                    .insert(step.path.clone());
            }

            if let Some(next) = catalog.get(name) {
                stack.push(WalkStep {
                    record: next,
                    path: format!("{} -> {}", step.path, name),
                    depth: step.depth + 1,
                    tolerates_ancestor: step.tolerates_ancestor || tolerated,
                    api_jar_disabled: api_disabled,
                });
            }
        }
    }

    walk
}

/// A tolerates range does not carry over to features that include the
/// declaring feature: each of them must depend on the tolerated base
/// itself, unless that base is private.
fn check_non_transitive_tolerates(
    catalog: &FeatureCatalog,
    config: &CheckConfig,
    walks: &[DependencyWalk<'_>],
    report: &mut ValidationReport,
) {
    let bases = catalog.base_visibilities();

    for walk in walks {
        let direct_bases: BTreeSet<String> = walk
            .root
            .dependency_names()
            .iter()
            .map(|name| split_version(name).0)
            .collect();

        for (base, paths) in &walk.nearby_tolerated {
            if direct_bases.contains(base)
                || config.is_intertwined_base(base)
                || bases.get(base) == Some(&Visibility::Private)
            {
                continue;
            }
            report.push(
                Rule::NonTransitiveTolerates,
                walk.root.name(),
                format!(
                    "must depend on a version of {}, tolerated in [{}]",
                    base,
                    join_paths(paths)
                ),
            );
        }
    }
}

/// Private and protected dependencies already brought in by another
/// dependency are redundant. Public ones may be listed on purpose.
fn check_redundant_dependencies(
    catalog: &FeatureCatalog,
    walks: &[DependencyWalk<'_>],
    report: &mut ValidationReport,
) {
    let bases = catalog.base_visibilities();

    for walk in walks {
        for (dependency, paths) in &walk.redundant {
            let (base, _) = split_version(dependency);
            if walk.tolerated_bases.contains(&base)
                || bases.get(&base) == Some(&Visibility::Public)
            {
                continue;
            }
            report.push(
                Rule::RedundantDependency,
                walk.root.name(),
                format!(
                    "redundant dependency {} already included through [{}]",
                    dependency,
                    join_paths(paths)
                ),
            );
        }
    }
}

fn join_paths(paths: &BTreeSet<String>) -> String {
    paths.iter().map(String::as_str).collect::<Vec<_>>().join("; ")
}

fn check_auto_feature_multiplicity(catalog: &FeatureCatalog, report: &mut ValidationReport) {
    for record in catalog.iter().filter(|r| r.is_auto_feature()) {
        let targets = record.auto_feature_targets();
        match targets.len() {
            0 => report.push(
                Rule::AutoFeatureMultiplicity,
                record.name(),
                "auto feature targets no features",
            ),
            1 => {
                let only = targets.iter().next().map(String::as_str).unwrap_or_default();
                report.push(
                    Rule::AutoFeatureMultiplicity,
                    record.name(),
                    format!(
                        "auto feature targets only {}; make its content a dependency of that feature",
                        only
                    ),
                );
            }
            _ => {}
        }
    }
}

fn check_no_ship(catalog: &FeatureCatalog, config: &CheckConfig, report: &mut ValidationReport) {
    for expected in &config.expected_no_ship {
        match catalog.get(expected) {
            None => report.push(Rule::NoShip, expected, "expected no-ship feature is missing"),
            Some(record) if !record.is_no_ship() => report.push(
                Rule::NoShip,
                expected,
                format!(
                    "expected no-ship feature is now {}; remove it from expected_no_ship",
                    record.kind()
                ),
            ),
            Some(_) => {}
        }
    }

    for record in catalog.iter() {
        if !record.is_no_ship() || record.is_auto_feature() {
            continue;
        }
        if config.expected_no_ship.iter().any(|n| n == record.name()) {
            continue;
        }

        let mut has_no_ship = false;
        let mut has_beta = false;
        for dep in catalog.resolved_dependencies(record) {
            has_no_ship |= dep.is_no_ship();
            has_beta |= dep.is_beta();
        }

        if has_beta && !has_no_ship {
            report.push(
                Rule::NoShip,
                record.name(),
                "no-ship feature has beta dependencies but no no-ship dependency",
            );
        }
    }
}

fn check_localization(
    catalog: &FeatureCatalog,
    config: &CheckConfig,
    report: &mut ValidationReport,
) {
    for record in catalog.iter() {
        let is_admin_center = record
            .name()
            .starts_with(config.admin_center_prefix.as_str());
        if !record.is_public() && !is_admin_center {
            continue;
        }

        let Some(dir) = record.path().parent() else {
            continue;
        };
        let resource = dir
            .join("resources")
            .join("l10n")
            .join(format!("{}.properties", record.name()));
        if !resource.is_file() {
            report.push(
                Rule::Localization,
                record.name(),
                format!("missing resources {}", resource.display()),
            );
        }
    }
}

fn check_conflicts(
    catalog: &FeatureCatalog,
    conflicts: &ConflictReport,
    rule: Rule,
    report: &mut ValidationReport,
) {
    let classification = match rule {
        Rule::EditionConflict => Classification::Edition,
        _ => Classification::Kind,
    };

    for (root, violators) in conflicts.by_classification(classification) {
        let Some(root_record) = catalog.get(&root) else {
            continue;
        };
        for violator in violators {
            let value = catalog
                .get(&violator)
                .map(|r| classification.value_of(r))
                .unwrap_or_default();
            report.push(
                rule,
                root.as_str(),
                format!(
                    "{} {} conflicts with {} ({} {})",
                    classification,
                    classification.value_of(root_record),
                    violator,
                    classification,
                    value
                ),
            );
        }
    }
}
