//! Failure taxonomy of a backup run
//!
//! None of these abort a run. Each one is reported where it happens and the
//! run moves on to the next unit or target. Conditions that must stop the
//! whole run are plain `anyhow` errors instead.

use crate::artifacts::size::ByteSize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("cannot determine the size of {path:?}: {source}")]
    SizeUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} is over the soft threshold but has no children to split")]
    EmptyDirectory { path: PathBuf },

    #[error("{path:?} is {size}, bigger than the upload limit of {ceiling}")]
    OversizeUnit {
        path: PathBuf,
        size: ByteSize,
        ceiling: ByteSize,
    },

    #[error("failed to push {} after {attempts} attempt(s): {reason}", join_paths(.paths))]
    PushFailure {
        paths: Vec<PathBuf>,
        attempts: u32,
        reason: String,
    },
}

impl BackupError {
    pub fn size_unavailable(path: &Path, source: std::io::Error) -> Self {
        BackupError::SizeUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            BackupError::EmptyDirectory { .. } | BackupError::OversizeUnit { .. } => {
                Severity::Critical
            }
            BackupError::SizeUnavailable { .. } | BackupError::PushFailure { .. } => {
                Severity::Error
            }
        }
    }

    /// Log the failure at the level matching its severity.
    pub fn report(&self) {
        match self.severity() {
            Severity::Critical => tracing::error!(severity = %Severity::Critical, "{self}"),
            Severity::Error => tracing::error!(severity = %Severity::Error, "{self}"),
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
