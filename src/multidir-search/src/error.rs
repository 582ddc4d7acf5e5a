//! Error types for multi-root search.
//!
//! Searching itself never fails: unreadable nodes are skipped and a keyword
//! that cannot be compiled degrades to "no match". These errors surface from
//! configuration loading, pattern compilation and root checks.

use std::path::PathBuf;

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur around a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The keyword could not be compiled as a pattern.
    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Failed to read a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config file '{path}': {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No readable root directory is available.
    #[error("No readable search root is available")]
    NoRoots,
}

impl SearchError {
    /// Creates a new `InvalidPattern` error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a new `ReadConfig` error.
    pub fn read_config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadConfig {
            path: path.into(),
            source,
        }
    }

    /// Creates a new `ParseConfig` error.
    pub fn parse_config(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseConfig {
            path: path.into(),
            source,
        }
    }

    /// Creates a new `InvalidConfig` error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::read_config(
            "/etc/mdsearch.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/etc/mdsearch.toml"));

        let err = SearchError::invalid_config("batch_window_ms must be greater than zero");
        assert!(err.to_string().contains("batch_window_ms"));

        assert!(SearchError::NoRoots.to_string().contains("root"));
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = SearchError::invalid_pattern("(", source);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("'('"));
    }
}
