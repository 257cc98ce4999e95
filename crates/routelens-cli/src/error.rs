//! Error types for the routelens CLI.
//!
//! Library errors are wrapped, not re-described: [`CliError::Analyze`] keeps
//! the [`routelens::AnalyzeError`] as its source. [`cli_error_to_miette`]
//! turns any of them into a report with a hint where one helps.

use std::path::PathBuf;

use miette::Report;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis failed: {0}")]
    Analyze(#[from] routelens::AnalyzeError),

    /// No entry file on the command line or in the configuration.
    #[error("No entry file given")]
    MissingEntry,

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A layer could not be parsed or has a field of the wrong type.
    #[error("{0}")]
    Invalid(Box<figment::Error>),
}

/// Convert a [`CliError`] into a miette report.
pub fn cli_error_to_miette(err: CliError) -> Report {
    use routelens::AnalyzeError;

    match err {
        CliError::MissingEntry => miette::miette!(
            help = "Pass the server entry file, e.g. `routelens src/app.ts`, or set \"entry\" in routelens.json",
            "No entry file given"
        ),
        CliError::Config(ConfigError::NotFound(path)) => miette::miette!(
            help = "Check the --config path",
            "Config file not found: {}",
            path.display()
        ),
        CliError::Config(ConfigError::Invalid(err)) => miette::miette!(
            help = "Check routelens.json syntax and ROUTELENS_* variables",
            "Invalid configuration: {err}"
        ),
        CliError::Analyze(AnalyzeError::UnsupportedEntry { path }) => miette::miette!(
            help = "The entry must be a .js, .jsx, .mjs, .cjs, .ts or .tsx file",
            "Unsupported entry file: {}",
            path.display()
        ),
        CliError::Analyze(AnalyzeError::TooManyModules { count, max }) => miette::miette!(
            help = "Raise \"maxModules\" in routelens.json if the project really is this large",
            "Import graph too large: {count} modules (max: {max})"
        ),
        CliError::Analyze(AnalyzeError::EntryUnparsable { path, message }) => miette::miette!(
            help = "Fix the syntax error in the entry file",
            "Failed to parse {}: {message}",
            path.display()
        ),
        other => miette::miette!("{other}"),
    }
}
