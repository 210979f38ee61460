//! Transitive kind and edition conflict detection.
//!
//! A feature conflicts with a dependency, direct or transitive, whose kind
//! or edition level is lower than its own: a GA feature must not pull in a
//! beta one, a core feature must not pull in a ZOS one.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::catalog::FeatureCatalog;
use crate::record::{FeatureRecord, UNKNOWN_LEVEL};

/// Classification a conflict was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Kind,
    Edition,
}

impl Classification {
    pub const ALL: [Classification; 2] = [Classification::Kind, Classification::Edition];

    pub fn level(&self, record: &FeatureRecord) -> u8 {
        match self {
            Classification::Kind => record.kind().level(),
            Classification::Edition => record.edition().level(),
        }
    }

    /// Classification value of `record` as text.
    pub fn value_of(&self, record: &FeatureRecord) -> &'static str {
        match self {
            Classification::Kind => record.kind().as_str(),
            Classification::Edition => record.edition().as_str(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Kind => "kind",
            Classification::Edition => "edition",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One violating dependency of a root feature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Violation {
    pub feature: String,
    pub classification: Classification,
}

/// Violations per root feature. Roots without violations are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConflictReport {
    violations: BTreeMap<String, BTreeSet<Violation>>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a violation, returning false if it was already recorded.
    pub fn insert(&mut self, root: &str, violation: Violation) -> bool {
        self.violations
            .entry(root.to_string())
            .or_default()
            .insert(violation)
    }

    pub fn for_root(&self, root: &str) -> Option<&BTreeSet<Violation>> {
        self.violations.get(root)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Violation>)> {
        self.violations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Violator names per root with the classifications folded together.
    pub fn merged(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.violations
            .iter()
            .map(|(root, found)| {
                let names = found.iter().map(|v| v.feature.clone()).collect();
                (root.clone(), names)
            })
            .collect()
    }

    /// Violator names per root for one classification only.
    pub fn by_classification(
        &self,
        classification: Classification,
    ) -> BTreeMap<String, BTreeSet<String>> {
        self.violations
            .iter()
            .filter_map(|(root, found)| {
                let names: BTreeSet<String> = found
                    .iter()
                    .filter(|v| v.classification == classification)
                    .map(|v| v.feature.clone())
                    .collect();
                (!names.is_empty()).then(|| (root.clone(), names))
            })
            .collect()
    }

    /// Number of roots with at least one violation.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Total number of violations across all roots.
    pub fn violation_count(&self) -> usize {
        self.violations.values().map(BTreeSet::len).sum()
    }
}

/// Walks the dependency graph of a catalog looking for conflicts.
pub struct ConflictVerifier<'a> {
    catalog: &'a FeatureCatalog,
}

impl<'a> ConflictVerifier<'a> {
    pub fn new(catalog: &'a FeatureCatalog) -> Self {
        Self { catalog }
    }

    /// Checks every feature in the catalog on both classifications.
    pub fn verify(&self) -> ConflictReport {
        let mut report = ConflictReport::new();

        for root in self.catalog.iter() {
            for classification in Classification::ALL {
                for feature in self.violators_of(root, classification) {
                    report.insert(
                        root.name(),
                        Violation {
                            feature,
                            classification,
                        },
                    );
                }
            }
        }

        debug!(
            "Verified {} features: {} violations on {} roots",
            self.catalog.len(),
            report.violation_count(),
            report.len()
        );
        report
    }

    /// Features reachable from `root` whose level on `classification` is
    /// lower than the root's.
    ///
    /// A root with an unknown level has nothing to protect and yields no
    /// violators. Dependencies missing from the catalog are skipped.
    pub fn violators_of(
        &self,
        root: &'a FeatureRecord,
        classification: Classification,
    ) -> BTreeSet<String> {
        let root_level = classification.level(root);
        let mut violators = BTreeSet::new();
        if root_level == 0 || root_level == UNKNOWN_LEVEL {
            return violators;
        }

        let mut seen: HashSet<&'a str> = HashSet::new();
        seen.insert(root.name());
        let mut stack: Vec<&'a str> = root
            .dependency_names()
            .iter()
            .rev()
            .map(String::as_str)
            .collect();

        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            let Some(feature) = self.catalog.get(name) else {
                continue;
            };

            if classification.level(feature) < root_level {
                violators.insert(feature.name().to_string());
            }

            stack.extend(
                feature
                    .dependency_names()
                    .iter()
                    .rev()
                    .map(String::as_str)
                    .filter(|dep| !seen.contains(dep)),
            );
        }

        violators
    }
}

/// Runs the conflict check over the whole catalog.
pub fn verify_all(catalog: &FeatureCatalog) -> ConflictReport {
    ConflictVerifier::new(catalog).verify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CatalogBuilder;
    use crate::config::CheckConfig;
    use crate::test_support::record_at;
    use pretty_assertions::assert_eq;

    fn catalog(features: &[(&str, &str)]) -> FeatureCatalog {
        let records = features.iter().map(|(name, extra)| {
            record_at(
                &format!("/features/{}.feature", name),
                &format!("symbolicName={}\n{}", name, extra),
            )
        });
        CatalogBuilder::from_records(records, &CheckConfig::default()).unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_transitive_kind_violation() {
        let catalog = catalog(&[
            ("a-1.0", "kind=ga\n-features=b-1.0"),
            ("b-1.0", "kind=beta\n-features=c-1.0"),
            ("c-1.0", "kind=ga"),
        ]);

        let report = verify_all(&catalog);
        let merged = report.merged();
        assert_eq!(merged.get("a-1.0"), Some(&set(&["b-1.0"])));
        assert!(!merged.contains_key("b-1.0"));
        assert!(!merged.contains_key("c-1.0"));

        assert_eq!(
            report.for_root("a-1.0").unwrap().iter().next(),
            Some(&Violation {
                feature: "b-1.0".to_string(),
                classification: Classification::Kind,
            })
        );
    }

    #[test]
    fn test_deep_violation_found() {
        let catalog = catalog(&[
            ("a-1.0", "kind=ga\n-features=b-1.0"),
            ("b-1.0", "kind=ga\n-features=c-1.0"),
            ("c-1.0", "kind=noship"),
        ]);

        let merged = verify_all(&catalog).merged();
        assert_eq!(merged.get("a-1.0"), Some(&set(&["c-1.0"])));
        assert_eq!(merged.get("b-1.0"), Some(&set(&["c-1.0"])));
    }

    #[test]
    fn test_cycle_terminates() {
        let catalog = catalog(&[
            ("x-1.0", "kind=ga\n-features=y-1.0"),
            ("y-1.0", "kind=beta\n-features=x-1.0"),
        ]);

        let report = verify_all(&catalog);
        assert_eq!(report.merged().get("x-1.0"), Some(&set(&["y-1.0"])));
        assert!(report.for_root("y-1.0").is_none());
        assert_eq!(report.violation_count(), 1);
    }

    #[test]
    fn test_self_cycle_is_not_a_violation() {
        let catalog = catalog(&[("x-1.0", "kind=beta\n-features=x-1.0")]);
        assert!(verify_all(&catalog).is_empty());
    }

    #[test]
    fn test_edition_violation_is_tagged() {
        let catalog = catalog(&[
            ("a-1.0", "kind=ga\nedition=core\n-features=b-1.0"),
            ("b-1.0", "kind=beta\nedition=base"),
        ]);

        let report = verify_all(&catalog);
        assert_eq!(
            report.by_classification(Classification::Edition).get("a-1.0"),
            Some(&set(&["b-1.0"]))
        );
        assert_eq!(
            report.by_classification(Classification::Kind).get("a-1.0"),
            Some(&set(&["b-1.0"]))
        );
        assert_eq!(report.for_root("a-1.0").unwrap().len(), 2);
        assert_eq!(report.merged().get("a-1.0"), Some(&set(&["b-1.0"])));
    }

    #[test]
    fn test_unknown_values_are_inert() {
        let catalog = catalog(&[
            ("a-1.0", "kind=ga\n-features=b-1.0"),
            ("b-1.0", "kind=experimental\n-features=c-1.0"),
            ("c-1.0", "kind=beta"),
            ("d-1.0", "-features=c-1.0"),
        ]);

        let merged = verify_all(&catalog).merged();
        assert_eq!(merged.get("a-1.0"), Some(&set(&["c-1.0"])));
        assert!(!merged.contains_key("b-1.0"));
        assert!(!merged.contains_key("d-1.0"));
    }

    #[test]
    fn test_missing_dependency_skipped() {
        let catalog = catalog(&[("a-1.0", "kind=ga\n-features=gone-1.0")]);
        assert!(verify_all(&catalog).is_empty());
    }
}
