//! The loaded feature set and the indices derived from it.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::CheckConfig;
use crate::error::FeatureResult;
use crate::record::{FeatureRecord, Visibility};
use crate::tree::TreeScan;
use crate::version::VersionOrdering;

/// Visibility partitions: base name, then visibility, then feature names.
pub type VisibilityPartitions = BTreeMap<String, BTreeMap<Visibility, Vec<String>>>;

/// All feature records of a load, keyed by symbolic name.
///
/// Records keep their load order. The partition, base-visibility and cohort
/// indices are computed once when the catalog is built.
#[derive(Debug)]
pub struct FeatureCatalog {
    records: IndexMap<String, FeatureRecord>,
    visibility_partitions: VisibilityPartitions,
    base_visibilities: BTreeMap<String, Visibility>,
    cohorts: BTreeMap<String, Vec<String>>,
    scan: Option<Arc<TreeScan>>,
    versions: VersionOrdering,
}

impl FeatureCatalog {
    /// Builds the catalog indices.
    ///
    /// Fails with `MalformedVersion` if a public feature carries a version
    /// that cannot be ordered.
    pub(crate) fn new(
        records: IndexMap<String, FeatureRecord>,
        scan: Option<Arc<TreeScan>>,
        config: &CheckConfig,
    ) -> FeatureResult<Self> {
        let versions = VersionOrdering::new();

        let mut visibility_partitions = VisibilityPartitions::new();
        let mut base_visibilities = BTreeMap::new();
        let mut cohorts: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for record in records.values() {
            if !record.is_auto_feature() {
                if !config.is_intertwined_base(record.base_name()) {
                    visibility_partitions
                        .entry(record.base_name().to_string())
                        .or_default()
                        .entry(record.visibility())
                        .or_default()
                        .push(record.name().to_string());
                }
                if !record.is_versionless() {
                    base_visibilities.insert(record.base_name().to_string(), record.visibility());
                }
            }

            if let Some(version) = record.version().filter(|_| record.is_public()) {
                cohorts
                    .entry(record.base_name().to_string())
                    .or_default()
                    .push(version.to_string());
            }
        }

        for cohort in cohorts.values_mut() {
            versions.sort(cohort)?;
        }

        debug!(
            "Indexed {} features: {} partitions, {} cohorts",
            records.len(),
            visibility_partitions.len(),
            cohorts.len()
        );

        Ok(Self {
            records,
            visibility_partitions,
            base_visibilities,
            cohorts,
            scan,
            versions,
        })
    }

    pub fn get(&self, name: &str) -> Option<&FeatureRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Non-auto features grouped by base name and visibility.
    pub fn visibility_partitions(&self) -> &VisibilityPartitions {
        &self.visibility_partitions
    }

    /// Records of one partition entry.
    pub fn partition(
        &self,
        base_name: &str,
        visibility: Visibility,
    ) -> impl Iterator<Item = &FeatureRecord> {
        self.visibility_partitions
            .get(base_name)
            .and_then(|by_visibility| by_visibility.get(&visibility))
            .into_iter()
            .flatten()
            .filter_map(|name| self.records.get(name))
    }

    /// Visibility of each versioned, non-auto base name.
    pub fn base_visibilities(&self) -> &BTreeMap<String, Visibility> {
        &self.base_visibilities
    }

    /// Sorted public versions per base name.
    pub fn cohorts(&self) -> &BTreeMap<String, Vec<String>> {
        &self.cohorts
    }

    pub fn cohort(&self, base_name: &str) -> Option<&[String]> {
        self.cohorts.get(base_name).map(Vec::as_slice)
    }

    /// Directory scan the catalog was loaded from, if it came from disk.
    pub fn scan(&self) -> Option<&TreeScan> {
        self.scan.as_deref()
    }

    /// Version ordering used for the cohorts; its cache lives as long as
    /// the catalog.
    pub fn version_ordering(&self) -> &VersionOrdering {
        &self.versions
    }

    /// Declared dependencies of `record` that exist in this catalog.
    pub fn resolved_dependencies<'a>(
        &'a self,
        record: &'a FeatureRecord,
    ) -> impl Iterator<Item = &'a FeatureRecord> + 'a {
        record
            .dependency_names()
            .iter()
            .filter_map(move |name| self.records.get(name))
    }

    /// Declared dependencies of `record` that are absent from this catalog.
    pub fn missing_dependencies<'a>(
        &'a self,
        record: &'a FeatureRecord,
    ) -> impl Iterator<Item = &'a str> + 'a {
        record
            .dependency_names()
            .iter()
            .map(String::as_str)
            .filter(move |name| !self.records.contains_key(*name))
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::CatalogBuilder;
    use crate::config::CheckConfig;
    use crate::error::FeatureError;
    use crate::record::Visibility;
    use crate::test_support::record_at;
    use pretty_assertions::assert_eq;

    fn feature(name: &str, extra: &str) -> crate::record::FeatureRecord {
        record_at(
            &format!("/features/{}.feature", name),
            &format!("symbolicName={}\n{}", name, extra),
        )
    }

    #[test]
    fn test_cohorts_sorted() {
        let catalog = CatalogBuilder::from_records(
            [
                feature("com.example.x-8.0", "visibility=public"),
                feature("com.example.x-9.1", "visibility=public"),
                feature("com.example.x-8.5", "visibility=public"),
                feature("com.example.x-7.0", "visibility=private"),
                feature("com.example.x", "visibility=public"),
            ],
            &CheckConfig::default(),
        )
        .unwrap();

        assert_eq!(
            catalog.cohort("com.example.x").unwrap(),
            &["8.0".to_string(), "8.5".to_string(), "9.1".to_string()]
        );
    }

    #[test]
    fn test_malformed_public_version_fails() {
        let result = CatalogBuilder::from_records(
            [
                feature("com.example.x-1.0", "visibility=public"),
                feature("com.example.x-beta", "visibility=public"),
            ],
            &CheckConfig::default(),
        );
        assert!(matches!(result, Err(FeatureError::MalformedVersion { .. })));
    }

    #[test]
    fn test_partitions() {
        let catalog = CatalogBuilder::from_records(
            [
                feature("com.example.jdbc-4.1", "visibility=public"),
                feature("com.example.jdbc-4.2", "visibility=public"),
                feature("com.example.jdbc", "visibility=private"),
                feature(
                    "com.example.jdbc.bridge-1.0",
                    "IBM-Provision-Capability: osgi.identity; filter:=\"(osgi.identity=com.example.jdbc-4.2)\"",
                ),
                feature("com.ibm.websphere.appserver.appSecurity-2.0", "visibility=public"),
                feature("com.ibm.websphere.appserver.appSecurity", "visibility=public"),
            ],
            &CheckConfig::default(),
        )
        .unwrap();

        let partitions = catalog.visibility_partitions();
        assert_eq!(
            partitions["com.example.jdbc"][&Visibility::Public],
            vec!["com.example.jdbc-4.1", "com.example.jdbc-4.2"]
        );
        assert_eq!(
            partitions["com.example.jdbc"][&Visibility::Private],
            vec!["com.example.jdbc"]
        );
        assert!(!partitions.contains_key("com.example.jdbc.bridge"));
        assert!(!partitions.contains_key("com.ibm.websphere.appserver.appSecurity"));

        let public: Vec<_> = catalog
            .partition("com.example.jdbc", Visibility::Public)
            .map(|r| r.name())
            .collect();
        assert_eq!(public, vec!["com.example.jdbc-4.1", "com.example.jdbc-4.2"]);
    }

    #[test]
    fn test_base_visibilities_skip_versionless_and_auto() {
        let catalog = CatalogBuilder::from_records(
            [
                feature("com.example.a-1.0", "visibility=protected"),
                feature("com.example.b", "visibility=public"),
                feature(
                    "com.example.c-1.0",
                    "IBM-Provision-Capability: osgi.identity; filter:=\"(osgi.identity=com.example.a-1.0)\"",
                ),
            ],
            &CheckConfig::default(),
        )
        .unwrap();

        let bases = catalog.base_visibilities();
        assert_eq!(bases.len(), 1);
        assert_eq!(bases["com.example.a"], Visibility::Protected);
    }

    #[test]
    fn test_dependency_resolution() {
        let catalog = CatalogBuilder::from_records(
            [
                feature("com.example.a-1.0", "-features=com.example.b-1.0, com.example.gone-1.0"),
                feature("com.example.b-1.0", ""),
            ],
            &CheckConfig::default(),
        )
        .unwrap();

        let a = catalog.get("com.example.a-1.0").unwrap();
        let resolved: Vec<_> = catalog.resolved_dependencies(a).map(|r| r.name()).collect();
        let missing: Vec<_> = catalog.missing_dependencies(a).collect();
        assert_eq!(resolved, vec!["com.example.b-1.0"]);
        assert_eq!(missing, vec!["com.example.gone-1.0"]);
        assert!(catalog.scan().is_none());
    }
}
