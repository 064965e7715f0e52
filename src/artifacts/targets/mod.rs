//! Target list
//!
//! One path per line. Surrounding whitespace is trimmed, blank lines and lines
//! starting with `#` are skipped, and a leading `~` expands to the home
//! directory.

use crate::artifacts::core::error::BackupError;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGETS_FILE: &str = "targets.txt";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetList {
    targets: Vec<PathBuf>,
}

impl TargetList {
    pub fn parse(content: &str, home: &Path) -> Self {
        let targets = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| expand_home(line, home))
            .collect();

        TargetList { targets }
    }

    pub fn load(path: &Path, home: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read target list {}", path.display()))?;

        Ok(Self::parse(&content, home))
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Canonicalize every target. Targets that cannot be resolved are
    /// returned as failures instead of aborting the whole list.
    pub fn resolve(&self) -> (Vec<PathBuf>, Vec<BackupError>) {
        let mut resolved = Vec::new();
        let mut failures = Vec::new();

        for target in &self.targets {
            match target.canonicalize() {
                Ok(path) => resolved.push(path),
                Err(err) => failures.push(BackupError::size_unavailable(target, err)),
            }
        }

        (resolved, failures)
    }
}

impl From<Vec<PathBuf>> for TargetList {
    fn from(targets: Vec<PathBuf>) -> Self {
        TargetList { targets }
    }
}

fn expand_home(line: &str, home: &Path) -> PathBuf {
    match line.strip_prefix('~') {
        Some("") => home.to_path_buf(),
        Some(rest) if rest.starts_with('/') => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(line),
    }
}
