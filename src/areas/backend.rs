//! Version control command surface
//!
//! The partitioning and pushing logic only ever talks to git through this
//! trait. `GitCli` is the real implementation; tests script their own.

use crate::artifacts::branch::branch_name::BranchName;
use std::path::PathBuf;

pub const REMOTE_NAME: &str = "origin";

pub trait VcsBackend: Send {
    fn init_repo(&mut self) -> anyhow::Result<()>;

    fn add_remote(&mut self, url: &str) -> anyhow::Result<()>;

    /// Fetch the remote's history without blobs, one commit deep.
    fn shallow_fetch(&mut self) -> anyhow::Result<()>;

    fn create_and_switch_branch(&mut self, branch: &BranchName) -> anyhow::Result<()>;

    fn stage(&mut self, paths: &[PathBuf]) -> anyhow::Result<()>;

    fn commit(&mut self, message: &str) -> anyhow::Result<()>;

    fn force_push(&mut self, branch: &BranchName) -> anyhow::Result<()>;

    /// Remove every trace of the repository created by `init_repo`.
    fn teardown(&mut self) -> anyhow::Result<()>;
}
