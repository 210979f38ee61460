//! Descriptor discovery under one or more root directories.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{FeatureError, FeatureResult};

/// Lazily scanned set of feature roots.
///
/// The first call to [`FeatureTree::scan`] walks the disk; later calls hand
/// back the same [`TreeScan`].
#[derive(Debug)]
pub struct FeatureTree {
    roots: Vec<PathBuf>,
    extension: String,
    scan: Mutex<Option<Arc<TreeScan>>>,
}

impl FeatureTree {
    pub fn new<I, P>(roots: I, extension: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            extension: extension.into(),
            scan: Mutex::new(None),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the scan result, walking the roots on first use.
    pub fn scan(&self) -> FeatureResult<Arc<TreeScan>> {
        let mut guard = self.scan.lock();
        if let Some(scan) = guard.as_ref() {
            return Ok(Arc::clone(scan));
        }

        let scan = Arc::new(TreeScan::collect(&self.roots, &self.extension)?);
        *guard = Some(Arc::clone(&scan));
        Ok(scan)
    }

    pub fn is_populated(&self) -> bool {
        self.scan.lock().is_some()
    }
}

/// Result of walking the feature roots.
#[derive(Debug, Default)]
pub struct TreeScan {
    files: Vec<PathBuf>,
    by_dir: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    categories: BTreeMap<String, BTreeSet<PathBuf>>,
    file_category: HashMap<PathBuf, String>,
}

impl TreeScan {
    fn collect(roots: &[PathBuf], extension: &str) -> FeatureResult<Self> {
        let mut scan = Self::default();

        for root in roots {
            if !root.is_dir() {
                warn!("Feature root {:?} does not exist or is not a directory", root);
                continue;
            }
            let before = scan.files.len();
            scan.walk_root(root, extension)?;
            debug!(
                "Found {} descriptor files under {:?}",
                scan.files.len() - before,
                root
            );
        }

        scan.files.sort();
        scan.files.dedup();

        info!(
            "Scanned {} descriptor files from {} roots",
            scan.files.len(),
            roots.len()
        );
        Ok(scan)
    }

    fn walk_root(&mut self, root: &Path, extension: &str) -> FeatureResult<()> {
        // Each queued directory carries the category inherited from the
        // root's immediate child it sits under.
        let mut queue: VecDeque<(PathBuf, Option<String>)> = VecDeque::new();
        queue.push_back((root.to_path_buf(), None));

        while let Some((dir, category)) = queue.pop_front() {
            for entry in sorted_entries(&dir)? {
                let path = entry.path();
                let file_type = entry.file_type().map_err(|source| FeatureError::Io {
                    path: path.clone(),
                    source,
                })?;

                if file_type.is_dir() {
                    let child_category = match &category {
                        Some(category) => Some(category.clone()),
                        None if dir == root => file_name(&path),
                        None => None,
                    };
                    queue.push_back((path, child_category));
                } else if file_type.is_file() && has_extension(&path, extension) {
                    self.add_file(root, path, category.as_deref());
                }
            }
        }

        Ok(())
    }

    fn add_file(&mut self, root: &Path, path: PathBuf, category: Option<&str>) {
        for ancestor in path.ancestors().skip(1) {
            self.by_dir
                .entry(ancestor.to_path_buf())
                .or_default()
                .insert(path.clone());
            if ancestor == root {
                break;
            }
        }

        if let Some(category) = category {
            self.categories
                .entry(category.to_string())
                .or_default()
                .insert(path.clone());
            self.file_category.insert(path.clone(), category.to_string());
        }

        self.files.push(path);
    }

    /// All descriptor files, sorted. Can be iterated any number of times.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files under the root child directory named `name`.
    pub fn category(&self, name: &str) -> Option<&BTreeSet<PathBuf>> {
        self.categories.get(name)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// The category a file was found in; `None` for files directly in a root.
    pub fn actual_category(&self, file: &Path) -> Option<&str> {
        self.file_category.get(file).map(String::as_str)
    }

    /// Descriptor files anywhere beneath `dir`.
    pub fn files_under(&self, dir: &Path) -> Option<&BTreeSet<PathBuf>> {
        self.by_dir.get(dir)
    }

    /// Directories that contain at least one descriptor file.
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.by_dir.keys().map(PathBuf::as_path)
    }
}

fn sorted_entries(dir: &Path) -> FeatureResult<Vec<fs::DirEntry>> {
    let io_err = |source| FeatureError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
