use std::io;

use thiserror::Error;

use crate::types::SourceName;

/// Error type for schema validation, selection, lookup, and report failures.
///
/// Every variant is fatal: the run aborts, nothing is retried or downgraded.
/// Zero-match indexed lookups are not errors and never surface here.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("schema error in {src}: {reason}")]
    Schema { src: SourceName, reason: String },
    #[error("no type column in design file {src}")]
    MissingTypeColumn { src: SourceName },
    #[error("problem opening {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("malformed line {line} in {src}: {reason}")]
    Malformed {
        src: SourceName,
        line: u64,
        reason: String,
    },
    #[error("{column} {key} is not a unique index in {src}: duplicate rows found")]
    NonUniqueIndex {
        column: &'static str,
        key: i64,
        src: SourceName,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
