use crate::artifacts::core::error::BackupError;
use derive_new::new;
use std::ffi::OsStr;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_NAMES: [&str; 1] = [".git"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl From<&Metadata> for EntryKind {
    fn from(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();

        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FilesystemEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl FilesystemEntry {
    /// Stat `path` without following symbolic links.
    pub fn probe(path: &Path) -> Result<(Self, Metadata), BackupError> {
        let metadata = std::fs::symlink_metadata(path)
            .map_err(|err| BackupError::size_unavailable(path, err))?;

        Ok((
            FilesystemEntry::new(path.to_path_buf(), EntryKind::from(&metadata)),
            metadata,
        ))
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// The directory git runs in
///
/// Every backed up path has to live below it, since git refuses to stage
/// anything outside its work tree.
#[derive(Debug, Clone)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_dir(&self) -> PathBuf {
        self.path.join(".git")
    }

    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.path) && !Self::is_ignored(path)
    }

    /// Direct children of `dir`, sorted by file name, without the repository's
    /// own `.git` directory.
    pub fn list_children(dir: &Path) -> Result<Vec<PathBuf>, BackupError> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored_name(entry.file_name()))
            .map(|entry| {
                entry.map(|entry| entry.into_path()).map_err(|err| {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    BackupError::size_unavailable(&path, err.into())
                })
            })
            .collect()
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                Self::is_ignored_name(name)
            } else {
                false
            }
        })
    }

    fn is_ignored_name(name: &OsStr) -> bool {
        IGNORED_NAMES.contains(&name.to_string_lossy().as_ref())
    }
}
