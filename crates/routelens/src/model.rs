//! Route and response model produced by an analysis run.
//!
//! Everything here is plain owned data: it outlives the parser arena and
//! serializes to the JSON shape consumed downstream.

use std::fmt;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path used when a route's path argument is not a string literal.
pub const DYNAMIC_PATH: &str = "<dynamic>";

/// An `app.use(prefix, router)` mount point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePrefix {
    pub prefix: String,
    pub router_name: String,
    /// File containing the `app.use` call.
    pub file_path: PathBuf,
    /// Module the router identifier was imported from, when it resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
}

/// Request fields read by a handler, grouped by request part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFields {
    pub headers: IndexSet<String>,
    pub params: IndexSet<String>,
    pub query: IndexSet<String>,
    pub body: IndexSet<String>,
}

impl RequestFields {
    /// Record `field` under the request part named `part`.
    ///
    /// Header names are case-folded. Unknown parts are ignored and reported
    /// as `false`.
    pub fn record(&mut self, part: &str, field: &str) -> bool {
        match RequestPart::from_name(part) {
            Some(part) => {
                self.insert(part, field);
                true
            }
            None => false,
        }
    }

    pub fn insert(&mut self, part: RequestPart, field: &str) {
        match part {
            RequestPart::Headers => self.headers.insert(field.to_ascii_lowercase()),
            RequestPart::Params => self.params.insert(field.to_string()),
            RequestPart::Query => self.query.insert(field.to_string()),
            RequestPart::Body => self.body.insert(field.to_string()),
        };
    }
}

/// The request properties whose fields are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPart {
    Headers,
    Params,
    Query,
    Body,
}

impl RequestPart {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "headers" => Some(Self::Headers),
            "params" => Some(Self::Params),
            "query" => Some(Self::Query),
            "body" => Some(Self::Body),
            _ => None,
        }
    }
}

/// A `{key, value}` response header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: Value,
}

/// Aggregated response facts for one control-flow branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchDetail {
    pub status: Vec<u16>,
    pub json: Vec<Value>,
    pub send: Vec<Value>,
    pub headers: Vec<HeaderEntry>,
}

impl BranchDetail {
    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && self.json.is_empty() && self.send.is_empty() && self.headers.is_empty()
    }
}

/// Which conditional or exception path a response call sits in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BranchKey {
    Default,
    /// Inside a `try` block. Aggregates into the default branch.
    Try,
    Catch,
    /// Inside the consequent of an `if`; holds the test's source text.
    If(String),
    Else,
}

impl BranchKey {
    /// Key under `responses.branches`, or `None` for the default branch.
    pub fn branch_name(&self) -> Option<String> {
        match self {
            Self::Default | Self::Try => None,
            Self::Catch => Some("catch".to_string()),
            Self::If(test) => Some(format!("if {test}")),
            Self::Else => Some("else".to_string()),
        }
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Try => f.write_str("try"),
            Self::Catch => f.write_str("catch"),
            Self::If(test) => write!(f, "if {test}"),
            Self::Else => f.write_str("else"),
        }
    }
}

/// Response facts of one handler, split into the default path and named
/// branches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Responses {
    pub default: BranchDetail,
    pub branches: IndexMap<String, BranchDetail>,
}

impl Responses {
    /// Detail for `key`, created on first use.
    pub fn detail_mut(&mut self, key: &BranchKey) -> &mut BranchDetail {
        match key.branch_name() {
            None => &mut self.default,
            Some(name) => self.branches.entry(name).or_default(),
        }
    }

    pub fn branch(&self, name: &str) -> Option<&BranchDetail> {
        self.branches.get(name)
    }
}

/// One discovered endpoint and what its handler does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub method: String,
    pub path: String,
    pub req: RequestFields,
    pub responses: Responses,
    /// Fields of inline `res.json({...})` object literals, keyed by property.
    #[serde(skip)]
    pub response_fields: IndexMap<String, Value>,
    /// File containing the route registration.
    #[serde(skip)]
    pub file: PathBuf,
}

impl RouteResult {
    pub fn new(method: impl Into<String>, path: impl Into<String>, file: PathBuf) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            req: RequestFields::default(),
            responses: Responses::default(),
            response_fields: IndexMap::new(),
            file,
        }
    }
}

/// Join a mount prefix and a route path.
///
/// A trailing `/` on the prefix absorbs the path's leading `/`.
pub fn join_route_path(prefix: &str, path: &str) -> String {
    if prefix.ends_with('/') {
        format!("{prefix}{}", path.strip_prefix('/').unwrap_or(path))
    } else {
        format!("{prefix}{path}")
    }
}
