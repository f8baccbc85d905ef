// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Sources of external file content besides the container itself

use crate::Error;
use futures::future::{FutureExt, LocalBoxFuture};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Caller-supplied files, matched by file name
pub trait FileProvider {
    /// True if a file with this name can be loaded
    fn contains(&self, file_name: &str) -> bool;
    /// Load the content of a file. Each call is one suspension point.
    fn load<'a>(&'a self, file_name: &'a str) -> LocalBoxFuture<'a, anyhow::Result<String>>;
}

/// Public structure repository used as a last resort for molecule files
pub trait RemoteRepository {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, anyhow::Result<String>>;
}

/// Files held in memory
///
/// # Examples
/// ~~~
/// use unf::{FileProvider, MemoryFiles};
/// let files = MemoryFiles::default().with("a.pdb", "END");
/// assert!(files.contains("a.pdb"));
/// assert_eq!(futures::executor::block_on(files.load("a.pdb")).unwrap(), "END");
/// ~~~
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: HashMap<String, String>,
}

impl MemoryFiles {
    pub fn insert(&mut self, file_name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(file_name.into(), content.into());
    }

    /// Builder-style [`MemoryFiles::insert`]
    pub fn with(mut self, file_name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(file_name, content);
        self
    }
}

impl FileProvider for MemoryFiles {
    fn contains(&self, file_name: &str) -> bool {
        self.files.contains_key(file_name)
    }

    fn load<'a>(&'a self, file_name: &'a str) -> LocalBoxFuture<'a, anyhow::Result<String>> {
        async move {
            self.files
                .get(file_name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no file named '{}'", file_name))
        }
        .boxed_local()
    }
}

/// Files on disk, matched by the last path component
///
/// The file is opened when loaded and closed before the load completes. Reading
/// blocks the polling thread and the returned future completes on its first poll,
/// so local loads do not interleave with each other. Wrap a runtime's blocking file
/// API in a custom [`FileProvider`] when that matters.
#[derive(Debug, Clone, Default)]
pub struct LocalFiles {
    paths: Vec<PathBuf>,
}

impl LocalFiles {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// All regular files in a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let paths = std::fs::read_dir(dir)
            .map_err(|e| Error::from_io(e, dir))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file())
            .collect();
        Ok(Self { paths })
    }

    fn find(&self, file_name: &str) -> Option<&PathBuf> {
        self.paths
            .iter()
            .find(|path| path.file_name().is_some_and(|name| name == file_name))
    }
}

impl FileProvider for LocalFiles {
    fn contains(&self, file_name: &str) -> bool {
        self.find(file_name).is_some()
    }

    fn load<'a>(&'a self, file_name: &'a str) -> LocalBoxFuture<'a, anyhow::Result<String>> {
        async move {
            let path = self
                .find(file_name)
                .ok_or_else(|| anyhow::anyhow!("no local file named '{}'", file_name))?;
            let content = std::fs::read_to_string(path).map_err(|e| Error::from_io(e, path))?;
            log::debug!("Loaded {} byte(s) from {}", content.len(), path.display());
            Ok(content)
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn memory_files() {
        let mut files = MemoryFiles::default();
        files.insert("x.oxdna", "t = 0");
        assert!(files.contains("x.oxdna"));
        assert!(!files.contains("y.oxdna"));
        assert_eq!(block_on(files.load("x.oxdna")).unwrap(), "t = 0");
        assert!(block_on(files.load("y.oxdna")).is_err());
    }

    #[test]
    fn local_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdb"), "ATOM\n").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = LocalFiles::from_dir(dir.path()).unwrap();
        assert!(files.contains("a.pdb"));
        assert!(!files.contains("nested"));
        assert_eq!(block_on(files.load("a.pdb")).unwrap(), "ATOM\n");

        let missing = LocalFiles::new([dir.path().join("gone.pdb")]);
        assert!(missing.contains("gone.pdb"));
        let err = block_on(missing.load("gone.pdb")).unwrap_err();
        assert!(err.to_string().contains("gone.pdb"));

        assert!(LocalFiles::from_dir(dir.path().join("absent")).is_err());
    }
}
