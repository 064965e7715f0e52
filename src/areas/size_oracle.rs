//! Memoized size computation
//!
//! A directory's size is the sum of the sizes of its direct children, all the
//! way down. Sizes are computed once per path and per session: every directory
//! visited while sizing a parent is cached on the way, so asking for a child
//! afterwards never touches the filesystem again.
//!
//! ## Filesystem entries
//!
//! - Regular files count their length.
//! - Symbolic links are not followed and count the length of the link itself,
//!   which is what git stores for them.
//! - Anything else (sockets, fifos, devices) counts as zero.
//! - An entry that cannot be stat'd or listed fails the whole query with
//!   `SizeUnavailable`; it is never silently counted as zero.

use crate::areas::workspace::{EntryKind, FilesystemEntry, Workspace};
use crate::artifacts::core::error::BackupError;
use crate::artifacts::size::cache::SizeCache;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Pending work of the post-order traversal
enum Visit {
    Enter(PathBuf),
    Leave(PathBuf, Vec<PathBuf>),
}

#[derive(Debug, Default)]
pub struct SizeOracle {
    cache: Mutex<SizeCache>,
    /// Number of directory listings performed so far
    traversals: AtomicUsize,
}

impl SizeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traversals(&self) -> usize {
        self.traversals.load(Ordering::Relaxed)
    }

    pub fn cached_entries(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn size_of(&self, path: &Path) -> Result<u64, BackupError> {
        if let Some(size) = self.cached(path) {
            return Ok(size);
        }

        let mut pending = vec![Visit::Enter(path.to_path_buf())];

        while let Some(visit) = pending.pop() {
            match visit {
                Visit::Enter(current) => {
                    if self.cached(&current).is_some() {
                        continue;
                    }

                    let (entry, metadata) = FilesystemEntry::probe(&current)?;
                    match entry.kind {
                        EntryKind::Directory => {
                            let children = Workspace::list_children(&current)?;
                            self.traversals.fetch_add(1, Ordering::Relaxed);

                            let enters = children
                                .iter()
                                .cloned()
                                .map(Visit::Enter)
                                .collect::<Vec<_>>();
                            pending.push(Visit::Leave(current, children));
                            pending.extend(enters);
                        }
                        EntryKind::File | EntryKind::Symlink => {
                            self.remember(current, metadata.len());
                        }
                        EntryKind::Other => {
                            self.remember(current, 0);
                        }
                    }
                }
                Visit::Leave(current, children) => {
                    let total = children
                        .iter()
                        .map(|child| self.require(child))
                        .sum::<Result<u64, _>>()?;
                    self.remember(current, total);
                }
            }
        }

        self.require(path)
    }

    /// Aggregate size of several paths.
    pub fn size_of_all(&self, paths: &[PathBuf]) -> Result<u64, BackupError> {
        paths.iter().map(|path| self.size_of(path)).sum()
    }

    fn cached(&self, path: &Path) -> Option<u64> {
        self.lock_cache().get(path)
    }

    fn require(&self, path: &Path) -> Result<u64, BackupError> {
        self.cached(path).ok_or_else(|| {
            BackupError::size_unavailable(
                path,
                io::Error::new(io::ErrorKind::NotFound, "size was never computed"),
            )
        })
    }

    fn remember(&self, path: PathBuf, size: u64) -> u64 {
        self.lock_cache().insert(path, size)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, SizeCache> {
        // single inserts only, a poisoned cache is still consistent
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
