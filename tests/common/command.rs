use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn work_tree() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn bare_remote() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");

    run_git_command(dir.path(), &["init", "--bare", "--quiet"])
        .assert()
        .success();

    dir
}

pub fn run_bitstash_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitstash").expect("Failed to find bitstash binary");
    cmd.current_dir(dir)
        .env("RUST_LOG", "bitstash=info")
        .env_remove("BITSTASH_REMOTE")
        .env_remove("BITSTASH_TARGETS");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Identity for the commits created during a test run
pub fn with_git_identity(cmd: &mut Command) -> &mut Command {
    cmd.env("GIT_AUTHOR_NAME", "Backup Bot")
        .env("GIT_AUTHOR_EMAIL", "backup@example.com")
        .env("GIT_COMMITTER_NAME", "Backup Bot")
        .env("GIT_COMMITTER_EMAIL", "backup@example.com")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
}
