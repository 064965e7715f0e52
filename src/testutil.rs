//! Shared helpers for unit tests

use crate::areas::backend::VcsBackend;
use crate::areas::session::{BackupSession, SessionConfig};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::size::ByteSize;
use chrono::{Local, TimeZone};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const MIB: u64 = 1024 * 1024;
pub const TEST_LABEL: &str = "01_01_2024:12:00";

/// Create a file of `len` bytes without writing them.
pub fn sparse_file(dir: &Path, name: &str, len: u64) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::File::create(&path)?.set_len(len)?;
    Ok(path)
}

pub fn test_session(work_tree: &Path, soft: u64, hard: u64, attempts: u32) -> BackupSession {
    let mut config = SessionConfig::new("file:///dev/null".to_string(), work_tree.to_path_buf());
    config.soft_threshold = ByteSize::b(soft);
    config.hard_ceiling = ByteSize::b(hard);
    config.max_push_attempts = attempts;

    let started_at = Local
        .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .expect("unambiguous local time");
    config.build(started_at).expect("valid test session")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    InitRepo,
    AddRemote(String),
    ShallowFetch,
    SwitchBranch(String),
    Stage(Vec<PathBuf>),
    Commit(String),
    ForcePush(String),
    Teardown,
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<Call>,
    failing_pushes: usize,
    failing_commits: bool,
    failing_init: bool,
    panicking_pushes: bool,
}

/// In-memory backend recording every call
///
/// Clones share the same script, so a test can keep one handle while the code
/// under test owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    /// The first `count` force pushes fail, later ones succeed.
    pub fn failing_pushes(count: usize) -> Self {
        let backend = Self::default();
        backend.lock().failing_pushes = count;
        backend
    }

    pub fn with_failing_commits(self) -> Self {
        self.lock().failing_commits = true;
        self
    }

    pub fn with_failing_init(self) -> Self {
        self.lock().failing_init = true;
        self
    }

    pub fn with_panicking_pushes(self) -> Self {
        self.lock().panicking_pushes = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn push_attempts(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::ForcePush(_)))
            .count()
    }

    /// Every path staged so far, in staging order.
    pub fn staged(&self) -> Vec<PathBuf> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Stage(paths) => Some(paths.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }
}

impl VcsBackend for ScriptedBackend {
    fn init_repo(&mut self) -> anyhow::Result<()> {
        self.record(Call::InitRepo);
        if self.lock().failing_init {
            anyhow::bail!("git is not installed");
        }
        Ok(())
    }

    fn add_remote(&mut self, url: &str) -> anyhow::Result<()> {
        self.record(Call::AddRemote(url.to_string()));
        Ok(())
    }

    fn shallow_fetch(&mut self) -> anyhow::Result<()> {
        self.record(Call::ShallowFetch);
        Ok(())
    }

    fn create_and_switch_branch(&mut self, branch: &BranchName) -> anyhow::Result<()> {
        self.record(Call::SwitchBranch(branch.to_string()));
        Ok(())
    }

    fn stage(&mut self, paths: &[PathBuf]) -> anyhow::Result<()> {
        self.record(Call::Stage(paths.to_vec()));
        Ok(())
    }

    fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        self.record(Call::Commit(message.to_string()));
        if self.lock().failing_commits {
            anyhow::bail!("nothing to commit");
        }
        Ok(())
    }

    fn force_push(&mut self, branch: &BranchName) -> anyhow::Result<()> {
        self.record(Call::ForcePush(branch.to_string()));
        if self.lock().panicking_pushes {
            panic!("remote connection vanished");
        }
        let mut script = self.lock();
        if script.failing_pushes > 0 {
            script.failing_pushes -= 1;
            anyhow::bail!("remote rejected the push");
        }
        Ok(())
    }

    fn teardown(&mut self) -> anyhow::Result<()> {
        self.record(Call::Teardown);
        Ok(())
    }
}
