use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for route analysis.
pub type Result<T> = std::result::Result<T, AnalyzeError>;

/// Errors that stop an analysis run before it produces a report.
///
/// Anything that goes wrong *inside* the import graph (unreadable files,
/// parse failures, unresolved identifiers) is recorded as a
/// [`Diagnostic`](crate::Diagnostic) instead.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Failed to determine current working directory.
    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    /// The entry file could not be read.
    #[error("failed to read entry '{path}': {source}")]
    EntryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entry file is larger than the configured size limit.
    #[error("entry '{path}' is too large: {size} bytes (max: {max} bytes)")]
    EntryTooLarge { path: PathBuf, size: u64, max: usize },

    /// The entry file is not a JavaScript/TypeScript module.
    #[error("entry '{path}' is not a JavaScript or TypeScript file")]
    UnsupportedEntry { path: PathBuf },

    /// The entry file has syntax errors.
    #[error("failed to parse entry '{path}': {message}")]
    EntryUnparsable { path: PathBuf, message: String },

    /// The import graph grew past the configured module limit.
    #[error("too many modules processed: {count} modules (max: {max} allowed)")]
    TooManyModules { count: usize, max: usize },
}
