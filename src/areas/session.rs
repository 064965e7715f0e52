//! Immutable configuration of one backup run
//!
//! Built once from the command line, validated, then shared read-only by every
//! component through an `Arc`.

use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::push::retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use crate::artifacts::size::ByteSize;
use anyhow::Context;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SOFT_THRESHOLD: ByteSize = ByteSize::mib(70);
/// GitHub rejects files over 100 MiB
pub const DEFAULT_HARD_CEILING: ByteSize = ByteSize::mib(100);
pub const DEFAULT_WORKERS: usize = 3;
pub const LABEL_FORMAT: &str = "%d_%m_%Y:%H:%M";

/// Size limits used by the partitioner and the push agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    soft: ByteSize,
    hard: ByteSize,
}

impl Thresholds {
    pub fn new(soft: ByteSize, hard: ByteSize) -> anyhow::Result<Self> {
        if soft.as_u64() == 0 {
            anyhow::bail!("the soft threshold must be greater than zero");
        }
        if hard < soft {
            anyhow::bail!("the hard ceiling ({hard}) must not be below the soft threshold ({soft})");
        }

        Ok(Thresholds { soft, hard })
    }

    pub fn soft(&self) -> ByteSize {
        self.soft
    }

    pub fn hard(&self) -> ByteSize {
        self.hard
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            soft: DEFAULT_SOFT_THRESHOLD,
            hard: DEFAULT_HARD_CEILING,
        }
    }
}

/// Raw settings before validation
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub remote: String,
    pub soft_threshold: ByteSize,
    pub hard_ceiling: ByteSize,
    pub max_push_attempts: u32,
    pub retry_backoff: Duration,
    pub branch: BranchName,
    pub work_tree: PathBuf,
    pub workers: usize,
    pub seed_files: Vec<PathBuf>,
}

impl SessionConfig {
    pub fn new(remote: String, work_tree: PathBuf) -> Self {
        SessionConfig {
            remote,
            soft_threshold: DEFAULT_SOFT_THRESHOLD,
            hard_ceiling: DEFAULT_HARD_CEILING,
            max_push_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: Duration::ZERO,
            branch: BranchName::default(),
            work_tree,
            workers: DEFAULT_WORKERS,
            seed_files: Vec::new(),
        }
    }

    pub fn build(self, started_at: DateTime<Local>) -> anyhow::Result<BackupSession> {
        if self.remote.trim().is_empty() {
            anyhow::bail!("a remote url is required");
        }
        if self.workers == 0 {
            anyhow::bail!("at least one worker is required");
        }

        let thresholds = Thresholds::new(self.soft_threshold, self.hard_ceiling)?;
        let retry = RetryPolicy::new(self.max_push_attempts, self.retry_backoff)?;
        let work_tree = self.work_tree.canonicalize().with_context(|| {
            format!("Failed to resolve work tree {}", self.work_tree.display())
        })?;

        Ok(BackupSession {
            thresholds,
            retry,
            label: started_at.format(LABEL_FORMAT).to_string(),
            branch: self.branch,
            remote: self.remote,
            workspace: Workspace::new(work_tree.into_boxed_path()),
            workers: self.workers,
            seed_files: self.seed_files,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BackupSession {
    thresholds: Thresholds,
    retry: RetryPolicy,
    /// Commit message shared by every commit of the run
    label: String,
    branch: BranchName,
    remote: String,
    workspace: Workspace,
    workers: usize,
    seed_files: Vec<PathBuf>,
}

impl BackupSession {
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn seed_files(&self) -> &[PathBuf] {
        &self.seed_files
    }
}
