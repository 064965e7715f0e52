//! Backup data structures and algorithms
//!
//! - `branch`: validated name of the branch backups are pushed to
//! - `core`: failure taxonomy shared by every component
//! - `partition`: push units, the greedy packer and unit sinks
//! - `push`: push reports, run summaries and the retry policy
//! - `size`: human readable byte sizes and the size cache
//! - `targets`: loading the list of paths to back up

pub mod branch;
pub mod core;
pub mod partition;
pub mod push;
pub mod size;
pub mod targets;
