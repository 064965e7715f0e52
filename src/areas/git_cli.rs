use crate::areas::backend::{REMOTE_NAME, VcsBackend};
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tracing::{debug, warn};

/// `VcsBackend` driving the `git` binary inside a work tree
///
/// The repository is throwaway: `init_repo` creates `.git` in the work tree
/// and `teardown` deletes it again, so an existing repository is never adopted.
#[derive(Debug)]
pub struct GitCli {
    workspace: Workspace,
    initialized: bool,
}

impl GitCli {
    pub fn new(workspace: Workspace) -> Self {
        GitCli {
            workspace,
            initialized: false,
        }
    }

    /// Run git with `args`, feeding `input` to its stdin when given.
    fn git<I, S>(&self, args: I, input: Option<Vec<u8>>) -> anyhow::Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect::<Vec<_>>();
        let subcommand = args
            .first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut command = Command::new("git");
        command
            .arg("-C")
            .arg(self.workspace.path())
            .args(&args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if input.is_some() {
            // pathspecs read from stdin are file names, never globs or magic
            command.env("GIT_LITERAL_PATHSPECS", "1");
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to run git {subcommand}"))?;

        let feeder = match (input, child.stdin.take()) {
            (Some(bytes), Some(mut stdin)) => {
                Some(std::thread::spawn(move || stdin.write_all(&bytes)))
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for git {subcommand}"))?;

        let written = match feeder.map(|feeder| feeder.join()) {
            None => Ok(()),
            Some(Ok(written)) => written,
            Some(Err(_)) => anyhow::bail!("The input writer of git {subcommand} panicked"),
        };

        debug!(
            subcommand = %subcommand,
            arguments = args.len(),
            status = %output.status,
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "git finished"
        );

        if !output.status.success() {
            anyhow::bail!(
                "git {} failed with {}: {}",
                subcommand,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        // git exiting early closes its stdin, its own error above is the useful one
        written.with_context(|| format!("Failed to write the input of git {subcommand}"))?;

        Ok(output)
    }

    fn run<I, S>(&self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.git(args, None).map(|_| ())
    }
}

/// NUL-separated pathspec list for `--pathspec-file-nul`.
fn nul_separated(paths: &[PathBuf]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for path in paths {
        bytes.extend_from_slice(path.as_os_str().as_encoded_bytes());
        bytes.push(0);
    }
    bytes
}

impl VcsBackend for GitCli {
    fn init_repo(&mut self) -> anyhow::Result<()> {
        let git_dir = self.workspace.git_dir();
        if git_dir.exists() {
            anyhow::bail!(
                "{} already exists, refusing to reuse a repository that teardown would delete",
                git_dir.display()
            );
        }

        self.run(["init", "--quiet"])
            .context("Failed to initialize the backup repository")?;
        self.initialized = true;

        Ok(())
    }

    fn add_remote(&mut self, url: &str) -> anyhow::Result<()> {
        self.run(["remote", "add", REMOTE_NAME, url])
            .with_context(|| format!("Failed to add remote {url}"))
    }

    fn shallow_fetch(&mut self) -> anyhow::Result<()> {
        self.run(["fetch", "--filter=blob:none", "--depth", "1", REMOTE_NAME])
    }

    fn create_and_switch_branch(&mut self, branch: &BranchName) -> anyhow::Result<()> {
        if let Err(err) = self.run(["switch", "--quiet", "-c", branch.as_ref()]) {
            // the repository has no commit yet, so pointing HEAD at the branch is enough
            debug!("git switch failed, pointing HEAD at {branch} directly: {err:#}");
            self.run(["symbolic-ref", "HEAD", branch.as_ref_path().as_str()])
                .with_context(|| format!("Failed to switch to branch {branch}"))?;
        }

        Ok(())
    }

    fn stage(&mut self, paths: &[PathBuf]) -> anyhow::Result<()> {
        // paths go through stdin, a packed group can exceed the argument limit
        self.git(
            ["add", "--pathspec-from-file=-", "--pathspec-file-nul"],
            Some(nul_separated(paths)),
        )
        .map(|_| ())
    }

    fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        self.run(["commit", "--quiet", "-m", message])
    }

    fn force_push(&mut self, branch: &BranchName) -> anyhow::Result<()> {
        self.run([
            "push",
            "--quiet",
            "-f",
            "--set-upstream",
            REMOTE_NAME,
            branch.as_ref(),
        ])
    }

    fn teardown(&mut self) -> anyhow::Result<()> {
        if !self.initialized {
            warn!("no repository was initialized, nothing to tear down");
            return Ok(());
        }

        let git_dir = self.workspace.git_dir();
        std::fs::remove_dir_all(&git_dir)
            .with_context(|| format!("Failed to remove {}", git_dir.display()))?;
        self.initialized = false;

        Ok(())
    }
}
