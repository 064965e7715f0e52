use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;
use common::command::{run_bitstash_command, work_tree};
use common::file::{write_sparse_file, write_targets_file};

const MIB: u64 = 1024 * 1024;

#[rstest]
fn splits_large_directories_into_groups(work_tree: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let root = work_tree.path().canonicalize()?;
    let notes = write_sparse_file(&root, "notes.bin", 5 * MIB);
    let media = root.join("media");
    write_sparse_file(&media, "first.bin", 10 * MIB);
    write_sparse_file(&media, "second.bin", 10 * MIB);
    write_sparse_file(&media, "huge.bin", 180 * MIB);
    write_targets_file(&root, &[&notes, &media]);

    run_bitstash_command(&root, &["plan", "--soft-threshold", "70MiB", "--hard-ceiling", "100MiB"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("5 MB  {}", notes.display())))
        .stdout(predicate::str::contains(format!(
            "20 MB  [{}, {}]",
            media.join("first.bin").display(),
            media.join("second.bin").display()
        )))
        .stdout(predicate::str::contains("(1 over the upload limit)"));

    assert!(!root.join(".git").exists());

    Ok(())
}

#[rstest]
fn targets_may_use_the_home_directory(work_tree: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let root = work_tree.path().canonicalize()?;
    write_sparse_file(&root.join("dotfiles"), "vimrc", 2048);
    std::fs::write(root.join("targets.txt"), "~/dotfiles\n\n# nothing else\n")?;

    run_bitstash_command(&root, &["plan"])
        .env("HOME", &root)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "2 KB  {}",
            root.join("dotfiles").display()
        )));

    Ok(())
}

#[rstest]
fn hard_ceiling_below_soft_threshold_is_rejected(work_tree: TempDir) {
    std::fs::write(work_tree.path().join("targets.txt"), "").expect("Failed to write targets");

    run_bitstash_command(
        work_tree.path(),
        &["plan", "--soft-threshold", "100MB", "--hard-ceiling", "10MB"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("must not be below the soft threshold"));
}

#[rstest]
fn malformed_sizes_are_rejected(work_tree: TempDir) {
    run_bitstash_command(work_tree.path(), &["plan", "--soft-threshold", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid size 'lots'"));
}

#[rstest]
fn missing_target_list_is_fatal(work_tree: TempDir) {
    run_bitstash_command(work_tree.path(), &["plan", "--targets", "absent.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read target list"));
}
