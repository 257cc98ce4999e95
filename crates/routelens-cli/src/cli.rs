//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// routelens - extract routes and response shapes from an Express server
#[derive(Parser, Debug)]
#[command(
    name = "routelens",
    version,
    about = "Extract routes and response shapes from an Express-style server",
    long_about = "routelens statically analyzes an Express-style Node server starting from\n\
                  its entry file. It prints every route with the request fields its handler\n\
                  reads and the responses it can send, as JSON. No code is executed."
)]
pub struct Cli {
    /// Entry file of the server (e.g. src/app.ts)
    ///
    /// May also be set as `entry` in the configuration file.
    pub entry: Option<PathBuf>,

    /// Configuration file; the extension picks the format (defaults to ./routelens.json or .toml/.yaml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Emit the full report (routes, analyzed files and diagnostics)
    #[arg(long)]
    pub report: bool,

    /// Base directory for relative paths
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Import path alias, e.g. `--alias @=./src` (repeatable)
    #[arg(long = "alias", value_name = "FROM=TO", value_parser = parse_alias)]
    pub aliases: Vec<(String, String)>,

    /// How many import hops handler and return resolution may follow
    #[arg(long, value_name = "N")]
    pub max_import_depth: Option<usize>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all logs except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Parse a `FROM=TO` alias.
pub fn parse_alias(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => {
            Ok((from.to_string(), to.to_string()))
        }
        _ => Err(format!("expected FROM=TO, got '{value}'")),
    }
}
