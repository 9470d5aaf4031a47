//! Run-level error taxonomy. Per-record problems are `Rejection`s (see `resolve`)
//! and never reach this type unless strict date handling is enabled.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("cannot list input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input file {path}: {reason}")]
    MalformedInputFile { path: PathBuf, reason: String },

    #[error("unparsable created_at \"{input}\" in {path}")]
    UnparsableDate { path: PathBuf, input: String },

    #[error("failed to persist day {day}: {source}")]
    Persistence {
        day: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
