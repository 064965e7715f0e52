//! User-facing workflows
//!
//! - `backup`: partition every target and push the units to the remote
//! - `plan`: show the units a backup would push, without touching git

pub mod backup;
pub mod plan;
