//! Error types for testmap-core
//!
//! Rule-file loading is the only fallible path; evaluation never fails.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for resource mapping operations
#[derive(Debug, Error)]
pub enum MappingError {
    /// Reading the rule file failed
    #[error("Failed to read resource mapping file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule line could not be compiled; the whole load is rejected
    #[error("Malformed resource mapping at line {line_no} ({line:?}): {reason}")]
    MalformedLine {
        line_no: usize,
        line: String,
        reason: String,
        #[source]
        source: Option<Box<MappingError>>,
    },

    /// A pattern failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl MappingError {
    /// Wrap an I/O failure with the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(line_no: usize, line: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedLine {
            line_no,
            line: line.into(),
            reason: reason.to_string(),
            source: None,
        }
    }

    /// A rule line rejected because one of its patterns failed
    pub fn malformed_pattern(line_no: usize, line: impl Into<String>, cause: MappingError) -> Self {
        Self::MalformedLine {
            line_no,
            line: line.into(),
            reason: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    /// Line number of the offending rule, if this error came from parsing
    pub fn line_no(&self) -> Option<usize> {
        match self {
            Self::MalformedLine { line_no, .. } => Some(*line_no),
            _ => None,
        }
    }
}

/// Result type alias for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;
