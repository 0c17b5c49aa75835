//! Error types for scanning and synthesis

use crate::model::SourceFile;
use thiserror::Error;

/// Reading a file for metadata extraction failed.
#[derive(Debug, Error)]
#[error("cannot scan {file}: {source}")]
pub struct ScanError {
    pub file: SourceFile,
    #[source]
    pub source: std::io::Error,
}

/// A directive block was present but malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed directive in {file}: {message}")]
pub struct DirectiveError {
    pub file: SourceFile,
    pub message: String,
}

/// Which relation a scan failure was encountered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Following include edges of an entry point's link set.
    Include,
    /// Scanning a header for export.
    HeaderExport,
    /// Reading a generator script's inputs.
    Generator,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Include => f.write_str("include edge"),
            Relation::HeaderExport => f.write_str("header export"),
            Relation::Generator => f.write_str("generator inputs"),
        }
    }
}

/// Fatal synthesis errors. Any of these aborts the run before emission.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("{relation} of {entry}: {source}")]
    Scan {
        relation: Relation,
        entry: SourceFile,
        #[source]
        source: ScanError,
    },

    #[error("{relation} of {entry}: {source}")]
    Directive {
        relation: Relation,
        entry: SourceFile,
        #[source]
        source: DirectiveError,
    },

    #[error("target name collision on '{target}': produced by both {existing} and {incoming}")]
    NamingCollision {
        target: String,
        existing: String,
        incoming: String,
    },

    #[error("{file} lies outside the source root '{root}'")]
    OutsideRoot { file: SourceFile, root: String },
}

/// Problems loading or validating `thicket.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
