//! routelens CLI - static route extraction for Express-style servers.
//!
//! The binary is a thin layer over the [`routelens`] library:
//!
//! - [`cli`] - argument parsing with clap
//! - [`config`] - layered configuration (defaults, `routelens.{json,toml,yaml}`,
//!   `ROUTELENS_*` environment variables, flags) via figment
//! - [`logger`] - tracing subscriber setup; logs go to stderr
//! - [`error`] - CLI error types and miette conversion
//! - [`run`] - runs the analysis and writes the JSON output
//!
//! No analysis logic lives here.

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod run;
