//! Runs one analysis and writes its JSON output.

use std::fs;

use routelens::{RouteAnalyzer, RouteReport};
use serde::Serialize;

use crate::cli::Cli;
use crate::config::CliConfig;
use crate::error::{CliError, Result};

/// Analyze the configured entry and write the routes (or full report).
pub fn execute(args: &Cli) -> Result<()> {
    let config = CliConfig::load(args)?;
    let entry = config.entry()?.to_path_buf();
    tracing::debug!("analyzing {}", entry.display());

    let report = RouteAnalyzer::new()
        .config(config.analyzer.clone())
        .entry(entry)
        .analyze()?;

    for diagnostic in &report.diagnostics {
        tracing::debug!("{:?}: {}", diagnostic.kind, diagnostic);
    }

    let json = render(&report, &config)?;
    match &config.out {
        Some(path) => {
            fs::write(path, format!("{json}\n")).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!("wrote {} routes to {}", report.routes.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Serialize the routes, or the whole report with `report`.
pub fn render(report: &RouteReport, config: &CliConfig) -> Result<String> {
    if config.report {
        to_json(report, config.pretty)
    } else {
        to_json(&report.routes, config.pretty)
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
