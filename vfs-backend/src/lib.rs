// Copyright 2024 Wladimir Palant
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Virtual filesystem backend
//!
//! This crate defines the read-only storage capability consumed by
//! `dir-listing-module`: a [`Node`] value describing one file or directory, the
//! [`Backend`] trait to resolve paths, enumerate directories and open files, and the
//! [`FileHandle`] trait for byte-ranged reads.
//!
//! Paths are slash-separated and relative to the served root; the empty string
//! denotes the root itself. Backends are expected to be cheap to share between
//! concurrently running requests, all trait methods take `&self`.
//!
//! Two implementations are provided: [`DiskBackend`] serving a local directory and
//! [`MemoryBackend`] serving a fixed in-memory tree.

mod disk;
mod memory;

pub use disk::DiskBackend;
pub use memory::MemoryBackend;

/// Error type produced by backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The path does not exist in the backend.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// An I/O failure during enumeration or read. Treated as non-transient, the
    /// caller should not retry within the same request.
    #[error("i/o failure on {path}: {source}")]
    Io {
        /// The path on which the operation failed.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Handle for one filesystem-like object: a slash-separated path relative to the
/// served root (empty for the root itself) and a directory flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    path: String,
    is_dir: bool,
}

impl Node {
    /// Creates a node for the given relative path.
    pub fn new(path: impl Into<String>, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            is_dir,
        }
    }

    /// Slash-separated path relative to the served root, empty string for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The final path segment, empty for the root.
    pub fn name(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.path,
        }
    }

    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Read-only storage capability. Implementations must be safe to share between
/// concurrent requests without additional locking at the call site.
pub trait Backend: Send + Sync {
    /// Looks up the node at the given path.
    fn resolve(&self, path: &str) -> Result<Node, BackendError>;

    /// Enumerates the immediate children of a directory. The order of the returned
    /// nodes is unspecified, callers that need a stable order must sort.
    fn list_children(&self, path: &str) -> Result<Vec<Node>, BackendError>;

    /// Opens a file for byte-ranged reading.
    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, BackendError>;
}

/// An open file supporting ranged reads. Handles are scoped to a single request and
/// never shared.
pub trait FileHandle: Send {
    /// Total length of the file in bytes.
    fn len(&self) -> u64;

    /// Whether the file is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `length` bytes starting at `offset`. The requested range must lie
    /// within the file, backends may fail short reads with an I/O error.
    fn read_range(&mut self, offset: u64, length: u64) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_name_is_final_segment() {
        assert_eq!(Node::new("", true).name(), "");
        assert_eq!(Node::new("dir", true).name(), "dir");
        assert_eq!(Node::new("a/b/c/d.txt", false).name(), "d.txt");
        assert_eq!(Node::new("a/b", true).name(), "b");
    }

    #[test]
    fn backend_is_object_safe() {
        fn _check(_: &dyn Backend) {}
    }
}
