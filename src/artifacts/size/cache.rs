use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Memoized sizes keyed by path
///
/// Entries are never replaced or evicted: the first size recorded for a path
/// is the one every later lookup sees, even if the filesystem has changed in
/// the meantime.
#[derive(Debug, Default)]
pub struct SizeCache {
    entries: HashMap<PathBuf, u64>,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<u64> {
        self.entries.get(path).copied()
    }

    /// Record `size` for `path` unless a size is already known, and return the
    /// size that is now cached.
    pub fn insert(&mut self, path: PathBuf, size: u64) -> u64 {
        *self.entries.entry(path).or_insert(size)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
