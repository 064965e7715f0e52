//! bitstash: back up filesystem paths into a size-limited git remote
//!
//! Large directories are split into commit-sized groups so that no single push
//! goes over the remote's upload limit:
//!
//! - `areas`: stateful components (size oracle, partitioner, push agent, git backend)
//! - `artifacts`: plain data types and algorithms (byte sizes, push units, the greedy packer)
//! - `commands`: user-facing operations built on top of the two

pub mod areas;
pub mod artifacts;
pub mod commands;

#[cfg(test)]
pub(crate) mod testutil;
