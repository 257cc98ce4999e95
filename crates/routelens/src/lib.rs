//! # routelens
//!
//! Static route and response-shape extraction for Express-style Node servers.
//!
//! Given the entry file of a server, `routelens` walks its import graph and
//! reconstructs every registered endpoint without running any code: the HTTP
//! method and full path, the request fields the handler reads, and the
//! responses it can send, split per `if`/`else`/`try`/`catch` branch.
//!
//! ## Pipeline
//!
//! ```text
//! entry ─▶ loader ─▶ prefix ─▶ routes ─▶ handler ─▶ value
//!                                 │          │
//!                                 ▼          ▼
//!                          routes::handlers  returns ─▶ samples
//! ```
//!
//! - [`loader`] resolves and parses the import graph (oxc).
//! - [`prefix`] records `app.use("/prefix", router)` mounts.
//! - [`routes`] finds `app.get(...)`/`router.post(...)` registrations and
//!   resolves their handlers across files.
//! - [`handler`] walks one handler body, tracking request fields, local
//!   values and response calls per branch.
//! - [`value`] turns expressions into JSON values or symbolic descriptors.
//! - [`returns`] finds what a called service function returns, and
//!   [`samples`] synthesizes values from TypeScript types when it cannot be
//!   read literally.
//!
//! Problems inside the graph never fail a run; they are reported as
//! [`Diagnostic`]s on the [`RouteReport`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routelens::RouteAnalyzer;
//!
//! # fn main() -> routelens::Result<()> {
//! let report = RouteAnalyzer::new().entry("src/app.js").analyze()?;
//! println!("{}", serde_json::to_string_pretty(&report.routes).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod bindings;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod loader;
pub mod model;
pub mod prefix;
pub mod returns;
pub mod routes;
pub mod runtime;
pub mod samples;
pub mod symbols;
pub mod value;

pub use analyzer::{Configured, RouteAnalyzer, RouteReport, Unconfigured, analyze_routes};
pub use config::AnalyzerConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{AnalyzeError, Result};
pub use model::{
    BranchDetail, BranchKey, DYNAMIC_PATH, HeaderEntry, RequestFields, RoutePrefix, RouteResult,
    Responses, join_route_path,
};
pub use runtime::{FileSource, NativeFs};

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::MemoryFs;
