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

//! In-memory backend

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Error, ErrorKind};

use crate::{Backend, BackendError, FileHandle, Node};

/// Backend serving a fixed in-memory tree. Mainly useful for tests and demos,
/// enumeration order is deterministic (lexical by path).
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    broken: BTreeSet<String>,
}

impl MemoryBackend {
    /// Creates an empty backend containing only the root directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content, registering all ancestor directories.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path, content.into());
        self
    }

    /// Adds an empty directory, registering all ancestor directories.
    pub fn with_dir(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.dirs.insert(path);
        self
    }

    /// Adds a file that fails to open with an I/O error. Lets tests exercise the
    /// backend failure path.
    pub fn with_broken_file(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path.clone(), Vec::new());
        self.broken.insert(path);
        self
    }

    fn add_ancestors(&mut self, path: &str) {
        let mut pos = 0;
        while let Some(index) = path[pos..].find('/') {
            self.dirs.insert(path[..pos + index].to_owned());
            pos += index + 1;
        }
    }
}

impl Backend for MemoryBackend {
    fn resolve(&self, path: &str) -> Result<Node, BackendError> {
        if path.is_empty() || self.dirs.contains(path) {
            Ok(Node::new(path, true))
        } else if self.files.contains_key(path) {
            Ok(Node::new(path, false))
        } else {
            Err(BackendError::not_found(path))
        }
    }

    fn list_children(&self, path: &str) -> Result<Vec<Node>, BackendError> {
        if !self.resolve(path)?.is_dir() {
            return Err(BackendError::not_found(path));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let mut children = Vec::new();
        let dirs = self.dirs.iter().map(|path| (path, true));
        let files = self.files.keys().map(|path| (path, false));
        for (candidate, is_dir) in dirs.chain(files) {
            if let Some(rest) = candidate.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') {
                    children.push(Node::new(candidate.clone(), is_dir));
                }
            }
        }
        Ok(children)
    }

    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, BackendError> {
        if self.broken.contains(path) {
            return Err(BackendError::io(
                path,
                Error::new(ErrorKind::Other, "simulated i/o failure"),
            ));
        }

        let data = self
            .files
            .get(path)
            .ok_or_else(|| BackendError::not_found(path))?;
        Ok(Box::new(MemoryFile {
            path: path.to_owned(),
            data: data.clone(),
        }))
    }
}

struct MemoryFile {
    path: String,
    data: Vec<u8>,
}

impl FileHandle for MemoryFile {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&mut self, offset: u64, length: u64) -> Result<Vec<u8>, BackendError> {
        let start = usize::try_from(offset)
            .ok()
            .filter(|start| *start <= self.data.len());
        let end = start.and_then(|start| {
            usize::try_from(length)
                .ok()
                .and_then(|length| start.checked_add(length))
                .filter(|end| *end <= self.data.len())
        });
        match (start, end) {
            (Some(start), Some(end)) => Ok(self.data[start..end].to_vec()),
            _ => Err(BackendError::io(
                &self.path,
                Error::new(ErrorKind::UnexpectedEof, "read beyond end of file"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::new()
            .with_file("one.txt", "one")
            .with_file("three/a.txt", "aaa")
            .with_file("three/b.txt", "bbb")
            .with_dir("empty")
    }

    #[test]
    fn resolves_implied_directories() {
        let backend = backend();
        assert!(backend.resolve("").unwrap().is_dir());
        assert!(backend.resolve("three").unwrap().is_dir());
        assert!(backend.resolve("empty").unwrap().is_dir());
        assert!(!backend.resolve("three/a.txt").unwrap().is_dir());
        assert!(matches!(
            backend.resolve("missing"),
            Err(BackendError::NotFound { .. })
        ));
    }

    #[test]
    fn lists_immediate_children_only() {
        let backend = backend();
        let paths: Vec<_> = backend
            .list_children("")
            .unwrap()
            .into_iter()
            .map(|node| node.path().to_owned())
            .collect();
        assert_eq!(paths, ["empty", "three", "one.txt"]);

        assert!(backend.list_children("empty").unwrap().is_empty());
    }

    #[test]
    fn reads_ranges_and_rejects_overruns() {
        let backend = backend();
        let mut handle = backend.open("three/a.txt").unwrap();
        assert_eq!(handle.len(), 3);
        assert_eq!(handle.read_range(1, 2).unwrap(), b"aa");
        assert!(matches!(
            handle.read_range(2, 2),
            Err(BackendError::Io { .. })
        ));
    }

    #[test]
    fn broken_file_fails_to_open() {
        let backend = MemoryBackend::new().with_broken_file("bad.txt");
        assert!(backend.resolve("bad.txt").is_ok());
        assert!(matches!(
            backend.open("bad.txt"),
            Err(BackendError::Io { .. })
        ));
    }
}
