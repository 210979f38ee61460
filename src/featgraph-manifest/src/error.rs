//! Error types for descriptor reading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Errors that can occur while reading a descriptor.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The descriptor file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A header line has no name before its separator.
    #[error("Header on line {line} has an empty name")]
    EmptyHeaderName { line: usize },

    /// A quoted clause value was never closed.
    #[error("Unterminated quote in header value: {0}")]
    UnterminatedQuote(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManifestError::EmptyHeaderName { line: 7 };
        assert!(err.to_string().contains("line 7"));

        let err = ManifestError::UnterminatedQuote("a;b:=\"x".to_string());
        assert!(err.to_string().contains("a;b:=\"x"));
    }
}
