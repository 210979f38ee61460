//! Catalog assembly.
//!
//! Loading runs in one pass: scan the roots, read every descriptor, reject
//! duplicate names, wire auto-feature back-references, lock them, and index.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, info};

use crate::catalog::FeatureCatalog;
use crate::config::CheckConfig;
use crate::error::{FeatureError, FeatureResult};
use crate::record::FeatureRecord;
use crate::tree::FeatureTree;

/// Builds a [`FeatureCatalog`] from feature roots on disk.
pub struct CatalogBuilder<'a> {
    /// Root directories to scan.
    roots: Vec<PathBuf>,
    /// Loading configuration.
    config: &'a CheckConfig,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new<I, P>(roots: I, config: &'a CheckConfig) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            config,
        }
    }

    /// Adds another root directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Loads every descriptor under the roots.
    ///
    /// Stops at the first unreadable file or duplicate feature name.
    pub fn build(self) -> FeatureResult<FeatureCatalog> {
        let tree = FeatureTree::new(
            self.roots.iter().cloned(),
            self.config.feature_extension.clone(),
        );
        let scan = tree.scan()?;

        let mut records = IndexMap::with_capacity(scan.len());
        for path in scan.files() {
            let record = FeatureRecord::read(path, self.config)?;
            debug!("Read feature {} from {:?}", record.name(), path);
            insert_unique(&mut records, record)?;
        }

        info!(
            "Loaded {} features from {} roots",
            records.len(),
            self.roots.len()
        );

        wire_auto_features(&records);
        FeatureCatalog::new(records, Some(scan), self.config)
    }

    /// Builds a catalog from records already in memory.
    ///
    /// The catalog has no directory scan, so placement checks are skipped
    /// for it.
    pub fn from_records<I>(records: I, config: &CheckConfig) -> FeatureResult<FeatureCatalog>
    where
        I: IntoIterator<Item = FeatureRecord>,
    {
        let mut by_name = IndexMap::new();
        for record in records {
            insert_unique(&mut by_name, record)?;
        }

        wire_auto_features(&by_name);
        FeatureCatalog::new(by_name, None, config)
    }
}

/// Loads the catalog for `roots`.
pub fn load_catalog<I, P>(roots: I, config: &CheckConfig) -> FeatureResult<FeatureCatalog>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    CatalogBuilder::new(roots, config).build()
}

fn insert_unique(
    records: &mut IndexMap<String, FeatureRecord>,
    record: FeatureRecord,
) -> FeatureResult<()> {
    match records.entry(record.name().to_string()) {
        Entry::Occupied(existing) => Err(FeatureError::DuplicateFeature {
            name: record.name().to_string(),
            first: existing.get().path().to_path_buf(),
            second: record.path().to_path_buf(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(record);
            Ok(())
        }
    }
}

/// Records each auto feature on the targets it can activate, then locks
/// every record's activating set.
fn wire_auto_features(records: &IndexMap<String, FeatureRecord>) {
    let mut activators: HashMap<&str, BTreeSet<String>> = HashMap::new();

    for auto in records.values().filter(|r| r.is_auto_feature()) {
        for target in auto.auto_feature_targets() {
            if records.contains_key(target) {
                activators
                    .entry(target.as_str())
                    .or_default()
                    .insert(auto.name().to_string());
            } else {
                debug!(
                    "Auto feature {} targets {} which is not loaded",
                    auto.name(),
                    target
                );
            }
        }
    }

    for record in records.values() {
        let activating = activators.remove(record.name()).unwrap_or_default();
        record.lock_activating_auto_features(activating);
    }
}
