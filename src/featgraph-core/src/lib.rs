//! # featgraph core
//!
//! Loads a tree of feature descriptors into a [`FeatureCatalog`] and checks
//! it for cross-feature consistency.
//!
//! ## Layout
//!
//! Features live under one or more roots, grouped by the visibility
//! directory directly under each root:
//!
//! ```text
//! features/
//! ├── auto/        # auto features
//! ├── private/
//! ├── protected/
//! └── public/
//!     └── servlet-4.0/
//!         └── com.ibm.websphere.appserver.servlet-4.0.feature
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use featgraph_core::{CatalogValidator, CheckConfig, load_catalog, verify_all};
//!
//! let config = CheckConfig::default();
//! let catalog = load_catalog(["dev/features"], &config)?;
//!
//! for (root, violations) in verify_all(&catalog).iter() {
//!     println!("{}: {} conflicts", root, violations.len());
//! }
//!
//! let report = CatalogValidator::new(&config).validate(&catalog);
//! for finding in report.findings() {
//!     println!("{}", finding);
//! }
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod record;
pub mod tree;
pub mod validation;
pub mod verifier;
pub mod version;

pub use builder::{CatalogBuilder, load_catalog};
pub use catalog::{FeatureCatalog, VisibilityPartitions};
pub use config::{CONFIG_FILE_NAME, CheckConfig};
pub use error::{FeatureError, FeatureResult};
pub use record::{Edition, FeatureRecord, Kind, UNKNOWN_LEVEL, Visibility, split_version};
pub use tree::{FeatureTree, TreeScan};
pub use validation::{CatalogValidator, Finding, Rule, ValidationReport};
pub use verifier::{Classification, ConflictReport, ConflictVerifier, Violation, verify_all};
pub use version::{VersionOrdering, compare_versions};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::builder::{CatalogBuilder, load_catalog};
    pub use crate::catalog::FeatureCatalog;
    pub use crate::config::CheckConfig;
    pub use crate::error::{FeatureError, FeatureResult};
    pub use crate::record::{FeatureRecord, Visibility};
    pub use crate::validation::{CatalogValidator, Rule};
    pub use crate::verifier::{ConflictReport, verify_all};
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use featgraph_manifest::Manifest;

    use crate::config::CheckConfig;
    use crate::record::FeatureRecord;

    /// Builds a record from descriptor text as if read from `path`.
    pub fn record_at(path: &str, text: &str) -> FeatureRecord {
        let manifest = Manifest::parse(text).unwrap();
        FeatureRecord::from_headers(&manifest, Path::new(path), &CheckConfig::default()).unwrap()
    }
}
