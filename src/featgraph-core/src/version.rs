//! Ordering of dotted numeric versions.
//!
//! Versions compare field by field; when one version is a strict prefix of
//! the other, the shorter one sorts first (`8 < 8.1 < 8.1.0 < 9`).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{FeatureError, FeatureResult};

/// Version comparator with a parse cache.
///
/// Parsed fields are cached per distinct version string for the lifetime of
/// the ordering; entries are never invalidated.
#[derive(Debug, Default)]
pub struct VersionOrdering {
    cache: Mutex<HashMap<String, Arc<[u64]>>>,
}

impl VersionOrdering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a version into its numeric fields.
    pub fn parse(&self, version: &str) -> FeatureResult<Arc<[u64]>> {
        if let Some(fields) = self.cache.lock().get(version) {
            return Ok(Arc::clone(fields));
        }

        let fields: Arc<[u64]> = parse_fields(version)?.into();
        self.cache
            .lock()
            .insert(version.to_string(), Arc::clone(&fields));
        Ok(fields)
    }

    /// Compares two versions.
    pub fn compare(&self, a: &str, b: &str) -> FeatureResult<Ordering> {
        let a = self.parse(a)?;
        let b = self.parse(b)?;
        Ok(a.as_ref().cmp(b.as_ref()))
    }

    /// Sorts versions ascending.
    ///
    /// Every version is parsed before sorting so a malformed entry fails the
    /// whole call instead of leaving a partially sorted slice.
    pub fn sort(&self, versions: &mut [String]) -> FeatureResult<()> {
        let mut keyed = versions
            .iter()
            .map(|v| self.parse(v).map(|fields| (fields, v.clone())))
            .collect::<FeatureResult<Vec<_>>>()?;

        keyed.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));

        for (slot, (_, version)) in versions.iter_mut().zip(keyed) {
            *slot = version;
        }
        Ok(())
    }

    /// Number of cached versions.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Compares two versions without keeping a cache.
pub fn compare_versions(a: &str, b: &str) -> FeatureResult<Ordering> {
    let a = parse_fields(a)?;
    let b = parse_fields(b)?;
    Ok(a.cmp(&b))
}

fn parse_fields(version: &str) -> FeatureResult<Vec<u64>> {
    version
        .split('.')
        .map(|field| {
            let numeric = !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit());
            numeric
                .then(|| field.parse::<u64>().ok())
                .flatten()
                .ok_or_else(|| FeatureError::MalformedVersion {
                    version: version.to_string(),
                    field: field.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compare_basic() {
        let ordering = VersionOrdering::new();
        assert_eq!(ordering.compare("8.5", "8.5").unwrap(), Ordering::Equal);
        assert_eq!(ordering.compare("9", "8.5").unwrap(), Ordering::Greater);
        assert_eq!(ordering.compare("1.10", "1.9").unwrap(), Ordering::Greater);
        assert_eq!(ordering.compare("2.0", "10.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        let ordering = VersionOrdering::new();
        assert_eq!(ordering.compare("8", "8.1").unwrap(), Ordering::Less);
        assert_eq!(ordering.compare("8.1", "8").unwrap(), Ordering::Greater);
        assert_eq!(ordering.compare("8.1", "8.1.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn test_malformed() {
        let ordering = VersionOrdering::new();
        for bad in ["1.x", "", "1..2", "+1", "1.-2", "v1.0"] {
            let result = ordering.compare(bad, "1.0");
            assert!(
                matches!(result, Err(FeatureError::MalformedVersion { .. })),
                "expected {:?} to be malformed",
                bad
            );
        }
        assert_eq!(ordering.cached(), 0);
    }

    #[test]
    fn test_cache_reuse() {
        let ordering = VersionOrdering::new();
        let first = ordering.parse("3.1").unwrap();
        let second = ordering.parse("3.1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ordering.cached(), 1);
    }

    #[test]
    fn test_sort() {
        let ordering = VersionOrdering::new();
        let mut versions = vec![
            "9.1".to_string(),
            "8.0".to_string(),
            "8.5".to_string(),
            "8".to_string(),
        ];
        ordering.sort(&mut versions).unwrap();
        assert_eq!(versions, vec!["8", "8.0", "8.5", "9.1"]);
    }

    #[test]
    fn test_sort_malformed_leaves_input() {
        let ordering = VersionOrdering::new();
        let mut versions = vec!["2.0".to_string(), "beta".to_string(), "1.0".to_string()];
        assert!(ordering.sort(&mut versions).is_err());
        assert_eq!(versions, vec!["2.0", "beta", "1.0"]);
    }

    #[test]
    fn test_compare_versions_is_antisymmetric() {
        let samples = ["1", "1.0", "1.0.1", "1.2", "2", "10.0", "2.10"];
        for a in samples {
            for b in samples {
                let ab = compare_versions(a, b).unwrap();
                let ba = compare_versions(b, a).unwrap();
                assert_eq!(ab, ba.reverse(), "{} vs {}", a, b);
            }
        }
    }
}
