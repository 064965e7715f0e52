//! Command implementations
//!
//! - `plumbing`: low-level inspection (`size`)
//! - `porcelain`: the user-facing workflows (`backup`, `plan`)
//!
//! Commands are `impl Stash` blocks, each in its own file.

pub mod plumbing;
pub mod porcelain;
