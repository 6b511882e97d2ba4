//! Walks a local build directory and yields the files the policy would accept.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, IntoIter, WalkDir};

use super::{AccessPolicy, DirectoryRule};
use crate::error::PolicyError;

/// A file ready for upload: its `/`-separated path relative to the walked
/// directory, and the bytes read while enumerating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub relative_path: String,
    pub content: Vec<u8>,
}

/// Lazy, one-shot iterator returned by [`AccessPolicy::enumerate_local_files`].
pub struct LocalFiles<'p> {
    policy: &'p AccessPolicy,
    directories: Option<DirectoryRule>,
    root: PathBuf,
    walker: walkdir::FilterEntry<IntoIter, fn(&DirEntry) -> bool>,
}

impl AccessPolicy {
    /// Recursively lists files under `directory` that pass [`AccessPolicy::is_allowed`]
    /// relative to `/`, each with its content.
    ///
    /// Hidden entries and empty files are skipped. Symbolic links are followed,
    /// so a link that cannot be resolved comes out as an `Err` item and the walk
    /// goes on. Files are read as the iterator advances, so changes made to the
    /// tree meanwhile may or may not be seen.
    pub fn enumerate_local_files<P: AsRef<Path>>(&self, directory: P) -> LocalFiles<'_> {
        let root = directory.as_ref().to_path_buf();
        info!(directory = %root.display(), "Enumerating local files");
        // Deeper paths can never pass the directory check.
        let walker = WalkDir::new(&root)
            .follow_links(true)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(visible as fn(&DirEntry) -> bool);
        LocalFiles {
            policy: self,
            directories: self.directory_rule("/"),
            root,
            walker,
        }
    }
}

fn visible(entry: &DirEntry) -> bool {
    entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
}

impl LocalFiles<'_> {
    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        Some(segments.join("/"))
    }

    fn is_allowed(&self, relative_path: &str) -> bool {
        self.policy.is_allowed_extension(relative_path)
            && self
                .directories
                .as_ref()
                .is_some_and(|rule| rule.matches(relative_path))
    }
}

impl Iterator for LocalFiles<'_> {
    type Item = Result<LocalFile, PolicyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(PolicyError::Walk(e))),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative_path) = self.relative_path(entry.path()) else {
                continue;
            };
            if !self.is_allowed(&relative_path) {
                debug!(path = %relative_path, "Skipping file not allowed by policy");
                continue;
            }
            let content = match fs::read(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    return Some(Err(PolicyError::Io {
                        path: entry.path().to_path_buf(),
                        source: e,
                    }))
                }
            };
            if content.is_empty() {
                debug!(path = %relative_path, "Skipping empty file");
                continue;
            }
            debug!(path = %relative_path, size = content.len(), "Enumerated local file");
            return Some(Ok(LocalFile {
                relative_path,
                content,
            }));
        }
    }
}
