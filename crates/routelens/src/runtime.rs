//! File access abstraction.
//!
//! Every read performed by an analysis run goes through [`FileSource`], so the
//! loader and the cross-file resolvers can run against the real file system
//! ([`NativeFs`]) or an in-memory tree in tests.

use std::io;
use std::path::Path;

/// Read-only file access used by the analyzer.
pub trait FileSource: std::fmt::Debug {
    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Size of the file in bytes, if known.
    fn file_size(&self, path: &Path) -> Option<u64>;
}

/// [`FileSource`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

#[allow(clippy::disallowed_methods)]
impl FileSource for NativeFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn file_size(&self, path: &Path) -> Option<u64> {
        std::fs::metadata(path).ok().map(|m| m.len())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryFs;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::io;
    use std::path::{Path, PathBuf};

    use rustc_hash::FxHashMap;

    use super::FileSource;

    /// In-memory file tree for tests.
    #[derive(Debug, Default, Clone)]
    pub struct MemoryFs {
        files: FxHashMap<PathBuf, String>,
    }

    impl MemoryFs {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a file, returning `self` for chaining.
        pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
            self.files.insert(path.into(), content.into());
            self
        }
    }

    impl FileSource for MemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files.get(path).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
            })
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }

        fn file_size(&self, path: &Path) -> Option<u64> {
            self.files.get(path).map(|s| s.len() as u64)
        }
    }
}
