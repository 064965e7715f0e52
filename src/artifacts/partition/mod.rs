//! Partitioning data types
//!
//! - `packer`: the greedy first-fit grouping of sibling entries
//! - `push_unit`: a set of paths committed and pushed together
//! - `sink`: where the partitioner hands finished units

pub mod packer;
pub mod push_unit;
pub mod sink;

use crate::artifacts::core::error::BackupError;

/// Outcome of partitioning one target
#[derive(Debug, Default)]
pub struct PartitionReport {
    /// Number of units handed to the sink
    pub emitted: usize,
    /// Non-fatal conditions met along the way, already logged
    pub issues: Vec<BackupError>,
}
