//! Rule data errors.
//!
//! Every variant is a form of malformed rule data. A rule set that fails
//! with any of these is never published; the caller either aborts startup
//! or keeps serving the previous snapshot.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or checking rule data.
#[derive(Debug, Error)]
pub enum RuleDataError {
    /// A required rule file was not found.
    #[error("required rule file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// YAML parsing failed (syntax error or missing required field).
    #[error("failed to parse YAML rule data at {origin}: {source}")]
    YamlParse {
        origin: String,
        source: serde_yaml::Error,
    },

    /// JSON parsing failed (syntax error or missing required field).
    #[error("failed to parse JSON rule data at {origin}: {source}")]
    JsonParse {
        origin: String,
        source: serde_json::Error,
    },

    /// Two entries in one table share an identifier.
    #[error("duplicate {table} id {id:?}")]
    DuplicateId { table: &'static str, id: String },

    /// A required field is present but blank or empty.
    #[error("{table} {id:?}: required field `{field}` is empty")]
    MissingField {
        table: &'static str,
        id: String,
        field: &'static str,
    },

    /// A category has no usable keywords.
    #[error("category {category:?} has no keywords")]
    EmptyKeywords { category: String },

    /// An entry refers to an identifier that does not exist.
    #[error("{table} {id:?} references unknown {target} {reference:?}")]
    UnknownReference {
        table: &'static str,
        id: String,
        target: &'static str,
        reference: String,
    },

    /// A clause template uses a placeholder the engine does not bind.
    #[error("clause {clause:?} uses unknown binding {{{{{binding}}}}}")]
    UnknownBinding { clause: String, binding: String },

    /// Any other structural inconsistency.
    #[error("{table} {id:?}: {detail}")]
    Malformed {
        table: &'static str,
        id: String,
        detail: String,
    },

    /// I/O error while reading rule files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rule operations.
pub type RuleResult<T> = Result<T, RuleDataError>;
