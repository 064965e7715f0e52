//! Stateful backup components
//!
//! - `backend`: the version control command surface
//! - `git_cli`: the backend driving the `git` binary
//! - `partitioner`: splits targets into push units
//! - `push_agent`: stages, commits and pushes units with bounded retries
//! - `session`: immutable run configuration
//! - `size_oracle`: memoized size computation
//! - `stash`: ties everything together for the commands
//! - `workspace`: filesystem entries and the git work tree

pub mod backend;
pub mod git_cli;
pub mod partitioner;
pub mod push_agent;
pub mod session;
pub mod size_oracle;
pub mod stash;
pub mod workspace;
