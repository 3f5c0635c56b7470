//! Error types shared by every `ansinv` crate.
//!
//! Parsing errors are fatal to the parse that raised them. Pattern errors are
//! per-call and never leave the inventory in a changed state.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed inventory text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A bracketed line that does not follow the `[name]` / `[name:type]` grammar
    #[error("line {line}: invalid section entry '{text}', section names must not contain spaces or other invalid characters")]
    InvalidSection { line: usize, text: String },

    /// A section header with a type other than `hosts`, `children` or `vars`
    #[error("line {line}: section [{section}] has unknown type: {kind}")]
    UnknownSectionType {
        line: usize,
        section: String,
        kind: String,
    },

    #[error("line {line}: bad key=value pair supplied: {text}")]
    InvalidKeyValue { line: usize, text: String },

    #[error("line {line}: invalid port in host entry '{text}'")]
    InvalidPort { line: usize, text: String },

    /// Unbalanced quotes or a dangling escape
    #[error("line {line}: cannot split host entry '{text}'")]
    Tokenize { line: usize, text: String },

    #[error("wrong host pattern '{pattern}': {reason}")]
    InvalidHostPattern { pattern: String, reason: String },

    /// Wraps a line-independent error with the line it was raised on.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub fn host_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        ParseError::InvalidHostPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub fn at_line(self, line: usize) -> Self {
        ParseError::AtLine {
            line,
            source: Box::new(self),
        }
    }
}

/// Invalid glob syntax or a malformed host-pattern expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("exclusion pattern '{0}' cannot be the first pattern")]
    LeadingExclusion(String),

    #[error("intersection pattern '{0}' cannot be the first pattern")]
    LeadingIntersection(String),
}

impl PatternError {
    pub fn from_glob(pattern: &str, err: glob::PatternError) -> Self {
        PatternError::InvalidGlob {
            pattern: pattern.to_string(),
            message: err.msg.to_string(),
        }
    }
}

/// Anything that can go wrong while building or querying an inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse variables file '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to (de)serialize inventory: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
