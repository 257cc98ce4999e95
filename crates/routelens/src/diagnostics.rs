//! Non-fatal analysis diagnostics.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Category of a non-fatal problem met during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A file could not be read or was over the size limit.
    FileSkipped,
    /// A file had syntax errors and was excluded.
    ParseFailed,
    /// A handler, import or function could not be resolved.
    Unresolved,
    /// A type-based sample fell back to a generic placeholder.
    SampleFallback,
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Collects diagnostics for one run and mirrors them to `tracing`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, kind: DiagnosticKind, path: Option<&Path>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            path: path.map(Path::to_path_buf),
            message: message.into(),
        };
        match kind {
            DiagnosticKind::FileSkipped
            | DiagnosticKind::ParseFailed
            | DiagnosticKind::SampleFallback => tracing::warn!("{}", diagnostic),
            DiagnosticKind::Unresolved => tracing::debug!("{}", diagnostic),
        }
        self.entries.borrow_mut().push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of everything recorded so far.
    pub fn to_vec(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }
}
