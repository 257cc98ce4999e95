//! Layered configuration.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. `routelens.{json,toml,yaml,yml}` in the working directory, or the
//!    `--config` file (format chosen by extension)
//! 3. `ROUTELENS_*` environment variables (`ROUTELENS_MAX_IMPORT_DEPTH=3`)
//! 4. command-line flags

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Json, Serialized, Toml, Yaml};
use indexmap::IndexMap;
use routelens::AnalyzerConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, ConfigError, Result};

/// Default configuration file names, looked up in the working directory in
/// this order.
pub const CONFIG_FILES: &[&str] = &[
    "routelens.json",
    "routelens.toml",
    "routelens.yaml",
    "routelens.yml",
];

const ENV_PREFIX: &str = "ROUTELENS_";

/// Everything the CLI needs for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
    pub pretty: bool,
    /// Emit the whole report instead of the route list.
    pub report: bool,
    #[serde(flatten)]
    pub analyzer: AnalyzerConfig,
}

/// Values given on the command line; unset flags leave lower layers alone.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlagOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pretty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<PathBuf>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    path_aliases: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_import_depth: Option<usize>,
}

impl FlagOverrides {
    fn from_args(args: &Cli) -> Self {
        Self {
            entry: args.entry.clone(),
            out: args.out.clone(),
            pretty: args.pretty.then_some(true),
            report: args.report.then_some(true),
            cwd: args.cwd.clone(),
            path_aliases: args.aliases.iter().cloned().collect(),
            max_import_depth: args.max_import_depth,
        }
    }
}

impl CliConfig {
    /// Merge every configuration layer for `args`.
    pub fn load(args: &Cli) -> Result<Self> {
        let base = match &args.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir()?,
        };
        Self::load_from(args, &base)
    }

    /// Like [`CliConfig::load`], resolving the default config file in `base`.
    pub fn load_from(args: &Cli, base: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(CliConfig::default()));

        let config_file = match &args.config {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            Some(path) => Some(path.clone()),
            None => CONFIG_FILES
                .iter()
                .map(|name| base.join(name))
                .find(|path| path.is_file()),
        };
        if let Some(path) = &config_file {
            tracing::debug!("loading configuration from {}", path.display());
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Json::file(path)),
            };
        }

        figment = figment
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .map(|key| camel_case(key.as_str()).into())
                    .lowercase(false),
            )
            .merge(Serialized::defaults(FlagOverrides::from_args(args)));

        let mut config: CliConfig = figment
            .extract()
            .map_err(|err| ConfigError::Invalid(Box::new(err)))?;

        // Relative paths in a config file are relative to that file.
        if config.analyzer.cwd.is_none() {
            let dir = config_file
                .as_deref()
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty());
            config.analyzer.cwd = Some(dir.map_or_else(|| base.to_path_buf(), Path::to_path_buf));
        }
        Ok(config)
    }

    /// The configured entry file.
    pub fn entry(&self) -> Result<&Path> {
        self.entry.as_deref().ok_or(CliError::MissingEntry)
    }
}

/// `MAX_IMPORT_DEPTH` → `maxImportDepth`.
fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (index, part) in key.split('_').filter(|part| !part.is_empty()).enumerate() {
        let lower = part.to_ascii_lowercase();
        if index == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
