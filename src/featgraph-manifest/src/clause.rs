//! Clause lists: `name;attr=value;directive:="quoted, value", other`.

use std::collections::BTreeMap;

use crate::error::{ManifestError, ManifestResult};

/// Attributes and directives attached to a clause.
///
/// Directive keys keep their trailing `:` (`ibm.tolerates:`), so an
/// attribute and a directive with the same stem stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    entries: BTreeMap<String, String>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets an attribute value by its exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Gets a directive value (`name:=value`) by its bare name.
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.get(&format!("{}:", name))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One entry of a clause list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub name: String,
    pub attrs: Attrs,
}

impl Clause {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }
}

/// Parses a clause list.
///
/// Several bare names before the attributes (`a;b;x=1`) share one
/// attribute bag and produce one clause each. Empty clauses are skipped.
pub fn parse_clauses(value: &str) -> ManifestResult<Vec<Clause>> {
    let mut clauses = Vec::new();

    for raw_clause in split_unquoted(value, ',')? {
        let mut names = Vec::new();
        let mut attrs = Attrs::new();

        for part in split_unquoted(&raw_clause, ';')? {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.find('=') {
                Some(idx) => {
                    let key = part[..idx].trim();
                    let value = unquote(part[idx + 1..].trim());
                    attrs.insert(key, value);
                }
                None => names.push(unquote(part).to_string()),
            }
        }

        for name in names {
            clauses.push(Clause {
                name,
                attrs: attrs.clone(),
            });
        }
    }

    Ok(clauses)
}

fn split_unquoted(value: &str, separator: char) -> ManifestResult<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for c in value.chars() {
        if c == '"' {
            in_quote = !in_quote;
            current.push(c);
        } else if c == separator && !in_quote {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    if in_quote {
        return Err(ManifestError::UnterminatedQuote(value.to_string()));
    }

    parts.push(current);
    Ok(parts)
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_names() {
        let clauses = parse_clauses("a-1.0, b-2.0,c-3.0").unwrap();
        let names: Vec<_> = clauses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a-1.0", "b-2.0", "c-3.0"]);
        assert!(clauses.iter().all(|c| c.attrs.is_empty()));
    }

    #[test]
    fn test_attributes_and_directives() {
        let clauses =
            parse_clauses(r#"com.example.a-1.0; ibm.tolerates:="1.1,1.2"; apiJar=false"#).unwrap();

        assert_eq!(clauses.len(), 1);
        let attrs = &clauses[0].attrs;
        assert_eq!(attrs.get("ibm.tolerates:"), Some("1.1,1.2"));
        assert_eq!(attrs.directive("ibm.tolerates"), Some("1.1,1.2"));
        assert_eq!(attrs.get("apiJar"), Some("false"));
        assert!(!attrs.contains_key("ibm.tolerates"));
    }

    #[test]
    fn test_quoted_values_keep_separators() {
        let clauses = parse_clauses(
            r#"osgi.identity; filter:="(&(type=osgi.subsystem.feature)(|(osgi.identity=a-1.0)(osgi.identity=b-1.0)))", second"#,
        )
        .unwrap();

        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].name, "osgi.identity");
        assert_eq!(
            clauses[0].attrs.directive("filter"),
            Some("(&(type=osgi.subsystem.feature)(|(osgi.identity=a-1.0)(osgi.identity=b-1.0)))")
        );
        assert_eq!(clauses[1].name, "second");
    }

    #[test]
    fn test_shared_attributes() {
        let clauses = parse_clauses("a;b;start-phase:=CONTAINER").unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].attrs, clauses[1].attrs);
        assert_eq!(clauses[1].attrs.directive("start-phase"), Some("CONTAINER"));
    }

    #[test]
    fn test_empty_clauses_skipped() {
        let clauses = parse_clauses("a, , b,").unwrap();
        assert_eq!(clauses.len(), 2);
        assert!(parse_clauses("").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_quote() {
        let result = parse_clauses(r#"a; filter:="(osgi.identity=b"#);
        assert!(matches!(result, Err(ManifestError::UnterminatedQuote(_))));
    }
}
