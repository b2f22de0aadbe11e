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

//! Local disk backend

use log::debug;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::{Backend, BackendError, FileHandle, Node};

/// Backend serving a directory of the local filesystem.
#[derive(Debug)]
pub struct DiskBackend {
    root: PathBuf,
}

impl DiskBackend {
    /// Creates a backend rooted at the given directory. The root is canonicalized,
    /// which fails if the path isn't accessible.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, BackendError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|err| BackendError::io(root.to_string_lossy(), err))?;

        debug!("initialized disk backend with root {root:?}");
        Ok(Self { root })
    }

    /// Translates a remote path into a filesystem path below the root. Paths with
    /// empty, `.` or `..` segments address nothing in the served namespace.
    fn local_path(&self, path: &str) -> Result<PathBuf, BackendError> {
        let mut local = self.root.clone();
        if path.is_empty() {
            return Ok(local);
        }

        for segment in path.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(BackendError::not_found(path));
            }
            local.push(segment);
        }
        Ok(local)
    }

    fn metadata(&self, path: &str) -> Result<std::fs::Metadata, BackendError> {
        let local = self.local_path(path)?;
        local.metadata().map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                BackendError::not_found(path)
            } else {
                BackendError::io(path, err)
            }
        })
    }
}

impl Backend for DiskBackend {
    fn resolve(&self, path: &str) -> Result<Node, BackendError> {
        let meta = self.metadata(path)?;
        Ok(Node::new(path, meta.is_dir()))
    }

    fn list_children(&self, path: &str) -> Result<Vec<Node>, BackendError> {
        let meta = self.metadata(path)?;
        if !meta.is_dir() {
            return Err(BackendError::not_found(path));
        }

        let local = self.local_path(path)?;
        let mut children = Vec::new();
        for entry in local
            .read_dir()
            .map_err(|err| BackendError::io(path, err))?
        {
            let entry = entry.map_err(|err| BackendError::io(path, err))?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    // Remote paths are UTF-8, such files cannot be addressed.
                    debug!("skipping file with non-UTF-8 name {name:?}");
                    continue;
                }
            };
            let child_path = if path.is_empty() {
                name
            } else {
                format!("{path}/{name}")
            };
            let is_dir = entry
                .file_type()
                .map_err(|err| BackendError::io(&child_path, err))?
                .is_dir();
            children.push(Node::new(child_path, is_dir));
        }
        Ok(children)
    }

    fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, BackendError> {
        let meta = self.metadata(path)?;
        if !meta.is_file() {
            return Err(BackendError::not_found(path));
        }

        let local = self.local_path(path)?;
        let file = File::open(&local).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                BackendError::not_found(path)
            } else {
                BackendError::io(path, err)
            }
        })?;

        Ok(Box::new(DiskFile {
            path: path.to_owned(),
            size: meta.len(),
            file,
        }))
    }
}

struct DiskFile {
    path: String,
    size: u64,
    file: File,
}

impl FileHandle for DiskFile {
    fn len(&self) -> u64 {
        self.size
    }

    fn read_range(&mut self, offset: u64, length: u64) -> Result<Vec<u8>, BackendError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|err| BackendError::io(&self.path, err))?;

        let mut buf = vec![0; usize::try_from(length).unwrap_or(usize::MAX)];
        self.file
            .read_exact(&mut buf)
            .map_err(|err| BackendError::io(&self.path, err))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn testdata_root() -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("testdata");
        path.push("root");
        path
    }

    fn backend() -> DiskBackend {
        DiskBackend::new(testdata_root()).unwrap()
    }

    #[test]
    fn resolves_root_and_children() {
        let backend = backend();

        let root = backend.resolve("").unwrap();
        assert_eq!(root.path(), "");
        assert!(root.is_dir());

        let dir = backend.resolve("three").unwrap();
        assert!(dir.is_dir());

        let file = backend.resolve("two.txt").unwrap();
        assert!(!file.is_dir());
    }

    #[test]
    fn missing_paths_are_not_found() {
        let backend = backend();
        assert!(matches!(
            backend.resolve("no-such-file"),
            Err(BackendError::NotFound { .. })
        ));
        assert!(matches!(
            backend.list_children("no-such-dir"),
            Err(BackendError::NotFound { .. })
        ));
        assert!(matches!(
            backend.open("no-such-file"),
            Err(BackendError::NotFound { .. })
        ));
    }

    #[test]
    fn dot_segments_address_nothing() {
        let backend = backend();
        assert!(matches!(
            backend.resolve("../root/two.txt"),
            Err(BackendError::NotFound { .. })
        ));
        assert!(matches!(
            backend.resolve("three/../two.txt"),
            Err(BackendError::NotFound { .. })
        ));
        assert!(matches!(
            backend.resolve("three//a.txt"),
            Err(BackendError::NotFound { .. })
        ));
    }

    #[test]
    fn lists_children_with_full_paths() {
        let backend = backend();

        let mut names: Vec<_> = backend
            .list_children("three")
            .unwrap()
            .into_iter()
            .map(|node| node.path().to_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["three/a.txt", "three/b.txt"]);
    }

    #[test]
    fn reads_byte_ranges() {
        let backend = backend();
        let expected = fs::read(testdata_root().join("two.txt")).unwrap();

        let mut handle = backend.open("two.txt").unwrap();
        assert_eq!(handle.len(), expected.len() as u64);
        assert_eq!(handle.read_range(0, handle.len()).unwrap(), expected);
        assert_eq!(handle.read_range(2, 4).unwrap(), expected[2..6]);
    }

    #[test]
    fn open_rejects_directories() {
        let backend = backend();
        assert!(matches!(
            backend.open("three"),
            Err(BackendError::NotFound { .. })
        ));
    }
}
