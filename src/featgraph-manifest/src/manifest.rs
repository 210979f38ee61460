//! Header table of a single descriptor file.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::clause::{Clause, parse_clauses};
use crate::error::{ManifestError, ManifestResult};

/// Parsed headers of one descriptor, in file order.
///
/// A header that appears twice keeps its last value, as bnd does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    headers: IndexMap<String, String>,
}

impl Manifest {
    /// Reads and parses a descriptor file.
    pub fn read(path: &Path) -> ManifestResult<Self> {
        debug!("Reading descriptor at {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses descriptor text.
    pub fn parse(text: &str) -> ManifestResult<Self> {
        let mut headers = IndexMap::new();
        let mut pending: Option<(usize, String)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let (start, logical) = match pending.take() {
                Some((start, acc)) => (start, acc + raw.trim_start()),
                None => {
                    let trimmed = raw.trim_start();
                    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                        continue;
                    }
                    (idx + 1, trimmed.to_string())
                }
            };

            if let Some(joined) = logical.trim_end().strip_suffix('\\') {
                pending = Some((start, joined.to_string()));
                continue;
            }

            insert_line(&mut headers, start, &logical)?;
        }

        // A continuation on the last line just ends the value.
        if let Some((start, logical)) = pending {
            insert_line(&mut headers, start, &logical)?;
        }

        Ok(Self { headers })
    }

    /// Returns the trimmed value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Returns true if the header is present, even with an empty value.
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Reads a header as a clause list. An absent header yields no clauses.
    pub fn clauses(&self, name: &str) -> ManifestResult<Vec<Clause>> {
        match self.header(name) {
            Some(value) => parse_clauses(value),
            None => Ok(Vec::new()),
        }
    }

    /// Iterates headers in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

fn insert_line(
    headers: &mut IndexMap<String, String>,
    line: usize,
    logical: &str,
) -> ManifestResult<()> {
    let (name, value) = match logical.find(['=', ':']) {
        Some(idx) => (&logical[..idx], &logical[idx + 1..]),
        None => (logical, ""),
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ManifestError::EmptyHeaderName { line });
    }

    headers.insert(name.to_string(), value.trim().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_both_separators() {
        let manifest = Manifest::parse(
            r#"
symbolicName=io.openliberty.data-1.0
IBM-ShortName: data-1.0
visibility = public
"#,
        )
        .unwrap();

        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.header("symbolicName"), Some("io.openliberty.data-1.0"));
        assert_eq!(manifest.header("IBM-ShortName"), Some("data-1.0"));
        assert_eq!(manifest.header("visibility"), Some("public"));
        assert_eq!(manifest.header("kind"), None);
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let manifest = Manifest::parse("# a comment\n\n! another\nkind=ga\n").unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.header("kind"), Some("ga"));
    }

    #[test]
    fn test_parse_continuation_lines() {
        let manifest = Manifest::parse(
            "-features=com.example.a-1.0, \\\n  com.example.b-2.0, \\\n  com.example.c-3.0\nkind=beta\n",
        )
        .unwrap();

        assert_eq!(
            manifest.header("-features"),
            Some("com.example.a-1.0, com.example.b-2.0, com.example.c-3.0")
        );
        assert_eq!(manifest.header("kind"), Some("beta"));
    }

    #[test]
    fn test_parse_trailing_continuation() {
        let manifest = Manifest::parse("-bundles=com.example.bundle, \\").unwrap();
        assert_eq!(manifest.header("-bundles"), Some("com.example.bundle,"));
    }

    #[test]
    fn test_parse_first_separator_wins() {
        let manifest = Manifest::parse(
            r#"IBM-Provision-Capability: osgi.identity; filter:="(osgi.identity=a-1.0)""#,
        )
        .unwrap();
        assert_eq!(
            manifest.header("IBM-Provision-Capability"),
            Some(r#"osgi.identity; filter:="(osgi.identity=a-1.0)""#)
        );
    }

    #[test]
    fn test_parse_header_without_value() {
        let manifest = Manifest::parse("WLP-AlsoKnownAs\n").unwrap();
        assert!(manifest.contains("WLP-AlsoKnownAs"));
        assert_eq!(manifest.header("WLP-AlsoKnownAs"), Some(""));
    }

    #[test]
    fn test_parse_empty_name() {
        let result = Manifest::parse("kind=ga\n=oops\n");
        assert!(matches!(
            result,
            Err(ManifestError::EmptyHeaderName { line: 2 })
        ));
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let manifest = Manifest::parse("kind=beta\nkind=ga\n").unwrap();
        assert_eq!(manifest.header("kind"), Some("ga"));
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_clauses_absent_header() {
        let manifest = Manifest::parse("kind=ga").unwrap();
        assert!(manifest.clauses("-features").unwrap().is_empty());
    }

    #[test]
    fn test_read_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a-1.0.feature");
        std::fs::write(&path, "symbolicName=a-1.0\n").unwrap();

        let manifest = Manifest::read(&path).unwrap();
        assert_eq!(manifest.header("symbolicName"), Some("a-1.0"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = Manifest::read(Path::new("/nonexistent/a.feature"));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }
}
