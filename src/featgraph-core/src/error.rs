//! Error types for catalog loading and analysis.
//!
//! Structural problems (duplicates, missing symbolic names, unreadable
//! files) abort the operation. Soft anomalies such as dangling dependency
//! names or unknown kinds never surface here; they fall back to inert
//! defaults.

use std::path::PathBuf;

use featgraph_manifest::ManifestError;
use thiserror::Error;

/// Result type alias for feature operations.
pub type FeatureResult<T> = std::result::Result<T, FeatureError>;

/// Errors that can occur while loading or analysing features.
#[derive(Error, Debug)]
pub enum FeatureError {
    /// A file or directory could not be read.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor could not be parsed.
    #[error("Failed to parse feature descriptor {}: {source}", path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    /// Two descriptors declare the same symbolic name.
    #[error(
        "Duplicate feature '{name}' declared in {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateFeature {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A version field is not a number.
    #[error("Malformed version '{version}': field '{field}' is not numeric")]
    MalformedVersion { version: String, field: String },

    /// A descriptor lacks its symbolic name.
    #[error("Missing required header '{header}' in {}", path.display())]
    MissingRequiredHeader { path: PathBuf, header: String },

    /// Configuration file parsing error.
    #[error("Failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Feature not found in the catalog.
    #[error("Feature not found: {0}")]
    NotFound(String),
}

impl FeatureError {
    /// Returns true for failures caused by reading or parsing input files.
    pub fn is_io_failure(&self) -> bool {
        matches!(self, FeatureError::Io { .. } | FeatureError::Descriptor { .. })
    }

    /// Returns the exit code for CLI error reporting.
    pub fn exit_code(&self) -> i32 {
        match self {
            FeatureError::NotFound(_) => 2,
            FeatureError::DuplicateFeature { .. } => 3,
            FeatureError::MissingRequiredHeader { .. } | FeatureError::MalformedVersion { .. } => 4,
            FeatureError::Config(_) => 5,
            FeatureError::Io { .. } | FeatureError::Descriptor { .. } => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeatureError::DuplicateFeature {
            name: "com.example.a-1.0".to_string(),
            first: PathBuf::from("/one/a-1.0.feature"),
            second: PathBuf::from("/two/a-1.0.feature"),
        };
        let msg = err.to_string();
        assert!(msg.contains("com.example.a-1.0"));
        assert!(msg.contains("/one/a-1.0.feature"));
        assert!(msg.contains("/two/a-1.0.feature"));
    }

    #[test]
    fn test_is_io_failure() {
        let io = FeatureError::Io {
            path: PathBuf::from("/x"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(io.is_io_failure());
        assert!(!FeatureError::NotFound("x".to_string()).is_io_failure());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(FeatureError::NotFound("x".to_string()).exit_code(), 2);
        assert_eq!(
            FeatureError::MalformedVersion {
                version: "1.x".to_string(),
                field: "x".to_string()
            }
            .exit_code(),
            4
        );
    }
}
