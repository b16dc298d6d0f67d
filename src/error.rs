//! Error types for the documentation mirror.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors that can occur while mirroring a site.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Network failure or a non-success response.
    #[error("failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    /// A page or label does not have the shape the heuristics expect.
    #[error("unexpected page format: {0}")]
    Format(String),

    /// A URL could not be parsed or resolved.
    #[error("malformed URL '{url}': {source}")]
    Path {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A level walk left the tree it was building.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The help compiler could not be run or reported failure.
    #[error("help compiler '{}' failed: {message}", program.display())]
    Compile { program: PathBuf, message: String },

    /// Response cache failure.
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Violations of the level-tree walk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// An entry is indented deeper but there is no entry to nest it under.
    #[error("outline indent: '{label}' at level {level} has no parent entry")]
    NoParent { label: String, level: usize },

    /// An entry is outdented past the page root.
    #[error("outline unindent: '{label}' at level {level} is above the page root")]
    AboveRoot { label: String, level: usize },
}

impl MirrorError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a URL error for the given input.
    pub fn path(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::Path {
            url: url.into(),
            source,
        }
    }

    /// Create a compiler error for the given program.
    pub fn compile(program: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Compile {
            program: program.into(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

impl From<reqwest::Error> for MirrorError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        MirrorError::Fetch {
            url,
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for MirrorError {
    fn from(err: rusqlite::Error) -> Self {
        MirrorError::Cache(err.to_string())
    }
}
