//! Size-aware partitioning of a target into push units
//!
//! ## Algorithm
//!
//! Pending paths are kept on an explicit stack. For each one:
//!
//! 1. anything that is not a directory becomes a unit of its own
//! 2. a directory within the soft threshold becomes a unit of its own
//! 3. a bigger directory is split: its children are sorted by size, the
//!    smallest ones are packed into a single unit (see `greedy_pack`) and every
//!    child left out goes back on the stack
//!
//! Packed children are never looked into again, children left out always are,
//! whatever their size. Children are pushed so that the smallest is handled
//! first, the order a depth-first recursion would produce.

use crate::areas::size_oracle::SizeOracle;
use crate::areas::workspace::{FilesystemEntry, Workspace};
use crate::artifacts::core::error::BackupError;
use crate::artifacts::partition::PartitionReport;
use crate::artifacts::partition::packer::greedy_pack;
use crate::artifacts::partition::push_unit::PushUnit;
use crate::artifacts::partition::sink::UnitSink;
use crate::artifacts::size::ByteSize;
use derive_new::new;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[derive(Debug, PartialEq, Eq)]
enum Decision {
    Whole,
    Split {
        packed: Option<PushUnit>,
        remainder: Vec<PathBuf>,
    },
}

#[derive(Debug, new)]
pub struct Partitioner<'o> {
    oracle: &'o SizeOracle,
    soft_threshold: ByteSize,
}

impl Partitioner<'_> {
    /// Hand every unit of `root` to `sink`.
    ///
    /// Conditions that only affect part of the tree are logged, collected in
    /// the report and skipped. The only error returned is a sink refusing a
    /// unit.
    pub fn partition(
        &self,
        root: &Path,
        sink: &mut impl UnitSink,
    ) -> anyhow::Result<PartitionReport> {
        let mut report = PartitionReport::default();
        let mut pending = vec![root.to_path_buf()];

        while let Some(path) = pending.pop() {
            match self.decide(&path) {
                Ok(Decision::Whole) => {
                    sink.emit(PushUnit::single(path))?;
                    report.emitted += 1;
                }
                Ok(Decision::Split { packed, remainder }) => {
                    if let Some(unit) = packed {
                        debug!("packed {} children of {}", unit.len(), path.display());
                        sink.emit(unit)?;
                        report.emitted += 1;
                    }
                    pending.extend(remainder.into_iter().rev());
                }
                Err(issue) => {
                    issue.report();
                    report.issues.push(issue);
                }
            }
        }

        Ok(report)
    }

    fn decide(&self, path: &Path) -> Result<Decision, BackupError> {
        let (entry, _) = FilesystemEntry::probe(path)?;
        if !entry.is_dir() {
            return Ok(Decision::Whole);
        }

        let size = self.oracle.size_of(path)?;
        if size <= self.soft_threshold.as_u64() {
            trace!("{} fits in one unit ({})", path.display(), ByteSize::b(size));
            return Ok(Decision::Whole);
        }

        let mut children = Workspace::list_children(path)?
            .into_iter()
            .map(|child| self.oracle.size_of(&child).map(|size| (child, size)))
            .collect::<Result<Vec<_>, _>>()?;

        if children.is_empty() {
            return Err(BackupError::EmptyDirectory {
                path: path.to_path_buf(),
            });
        }

        children.sort_by(|(left, left_size), (right, right_size)| {
            left_size.cmp(right_size).then_with(|| left.cmp(right))
        });
        trace!(
            "splitting {} ({}) into {} children",
            path.display(),
            ByteSize::b(size),
            children.len()
        );

        let sizes = children.iter().map(|(_, size)| *size).collect::<Vec<_>>();
        let mut taken = vec![false; children.len()];
        if sizes[0] < self.soft_threshold.as_u64() {
            for index in greedy_pack(&sizes, self.soft_threshold.as_u64()) {
                taken[index] = true;
            }
        }

        let (packed, remainder): (Vec<_>, Vec<_>) = children
            .into_iter()
            .zip(taken)
            .partition(|(_, taken)| *taken);

        Ok(Decision::Split {
            packed: PushUnit::group(packed.into_iter().map(|((child, _), _)| child).collect()),
            remainder: remainder.into_iter().map(|((child, _), _)| child).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MIB, sparse_file};
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn partition_all(
        oracle: &SizeOracle,
        soft: ByteSize,
        root: &Path,
    ) -> (Vec<PushUnit>, PartitionReport) {
        let mut units = Vec::new();
        let report = Partitioner::new(oracle, soft)
            .partition(root, &mut units)
            .expect("a Vec sink never fails");
        (units, report)
    }

    #[test]
    fn a_file_is_a_unit_of_its_own() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let file = sparse_file(dir.path(), "huge.iso", 500 * MIB)?;
        let oracle = SizeOracle::new();

        let (units, report) = partition_all(&oracle, ByteSize::mib(70), &file);

        assert_eq!(units, vec![PushUnit::single(file)]);
        assert_eq!(report.emitted, 1);
        assert!(report.issues.is_empty());

        Ok(())
    }

    #[test]
    fn small_directory_is_pushed_whole() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        dir.child("docs/a.txt").write_str("some text")?;
        dir.child("docs/nested/b.txt").write_str("more text")?;
        let docs = dir.path().join("docs");
        let oracle = SizeOracle::new();

        let (units, _) = partition_all(&oracle, ByteSize::b(18), &docs);

        assert_eq!(units, vec![PushUnit::single(docs)]);

        Ok(())
    }

    #[test]
    fn small_children_are_packed_and_big_ones_descended() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = TempDir::new()?;
        let a = sparse_file(dir.path(), "a.bin", 1)?;
        let b = sparse_file(dir.path(), "b.bin", 2)?;
        let c = sparse_file(dir.path(), "c.bin", 3)?;
        let big = sparse_file(dir.path(), "big.bin", 100)?;
        let oracle = SizeOracle::new();

        let (units, _) = partition_all(&oracle, ByteSize::b(10), dir.path());

        assert_eq!(
            units,
            vec![
                PushUnit::group(vec![a, b, c]).expect("non-empty group"),
                PushUnit::single(big),
            ]
        );

        Ok(())
    }

    #[test]
    fn nothing_is_packed_when_every_child_is_too_big() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let first = sparse_file(dir.path(), "first.bin", 20)?;
        let second = sparse_file(dir.path(), "second.bin", 30)?;
        let oracle = SizeOracle::new();

        let (units, _) = partition_all(&oracle, ByteSize::b(10), dir.path());

        assert_eq!(
            units,
            vec![PushUnit::single(first), PushUnit::single(second)]
        );

        Ok(())
    }

    #[test]
    fn oversized_subdirectories_are_split_recursively() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let note = sparse_file(dir.path(), "note.txt", 5)?;
        let inner = dir.path().join("inner");
        let small = sparse_file(&inner, "small.bin", 4)?;
        let large = sparse_file(&inner, "large.bin", 40)?;
        let oracle = SizeOracle::new();

        let (units, _) = partition_all(&oracle, ByteSize::b(30), dir.path());

        assert_eq!(
            units,
            vec![
                PushUnit::single(note),
                PushUnit::group(vec![small]).expect("non-empty group"),
                PushUnit::single(large),
            ]
        );

        Ok(())
    }

    #[test]
    fn deep_trees_do_not_exhaust_the_stack() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let mut deepest = dir.path().to_path_buf();
        for level in 0..200 {
            deepest = deepest.join(format!("d{level}"));
        }
        let leaf = sparse_file(&deepest, "leaf.bin", 100)?;
        let oracle = SizeOracle::new();

        let (units, report) = partition_all(&oracle, ByteSize::b(10), dir.path());

        assert_eq!(units, vec![PushUnit::group(vec![leaf]).expect("non-empty group")]);
        assert!(report.issues.is_empty());

        Ok(())
    }

    #[test]
    fn emptied_directory_with_stale_size_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        sparse_file(dir.path(), "gone.bin", 100)?;
        let oracle = SizeOracle::new();
        oracle.size_of(dir.path())?;
        std::fs::remove_file(dir.path().join("gone.bin"))?;

        let (units, report) = partition_all(&oracle, ByteSize::b(10), dir.path());

        assert!(units.is_empty());
        assert_eq!(report.emitted, 0);
        assert!(matches!(
            report.issues.as_slice(),
            [BackupError::EmptyDirectory { path }] if path == dir.path()
        ));

        Ok(())
    }

    #[test]
    fn missing_target_is_reported_and_nothing_emitted() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let oracle = SizeOracle::new();

        let (units, report) = partition_all(&oracle, ByteSize::b(10), &dir.path().join("nope"));

        assert!(units.is_empty());
        assert!(matches!(
            report.issues.as_slice(),
            [BackupError::SizeUnavailable { .. }]
        ));
    }
}
