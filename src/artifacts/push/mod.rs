//! Push results
//!
//! - `retry`: bounded retry policy for forced pushes
//! - `PushReport`: what happened to a single unit
//! - `RunSummary`: totals over a whole run

pub mod retry;

use crate::artifacts::core::error::{BackupError, Severity};
use crate::artifacts::partition::push_unit::PushUnit;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Committed and accepted by the remote
    Pushed,
    /// Nothing was pushed: the unit was over the hard ceiling or could not be sized
    Skipped,
    /// Staging, committing or every push attempt failed
    Failed,
}

#[derive(Debug)]
pub struct PushReport {
    pub unit: PushUnit,
    pub staged: Vec<PathBuf>,
    pub attempts: u32,
    pub outcome: PushOutcome,
    pub issues: Vec<BackupError>,
}

impl PushReport {
    pub fn new(unit: PushUnit) -> Self {
        PushReport {
            unit,
            staged: Vec::new(),
            attempts: 0,
            outcome: PushOutcome::Skipped,
            issues: Vec::new(),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == severity)
            .count()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub targets: usize,
    pub pushed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub critical: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn record_push(&mut self, report: &PushReport) {
        match report.outcome {
            PushOutcome::Pushed => self.pushed += 1,
            PushOutcome::Skipped => self.skipped += 1,
            PushOutcome::Failed => self.failed += 1,
        }
        self.record_issues(&report.issues);
    }

    pub fn record_issues(&mut self, issues: &[BackupError]) {
        for issue in issues {
            match issue.severity() {
                Severity::Critical => self.critical += 1,
                Severity::Error => self.errors += 1,
            }
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} target(s): {} unit(s) pushed, {} skipped, {} failed",
            self.targets,
            self.pushed.to_string().green(),
            self.skipped.to_string().yellow(),
            self.failed.to_string().red()
        )?;
        write!(
            f,
            "{} critical, {} error(s)",
            self.critical.to_string().bold().red(),
            self.errors.to_string().red()
        )
    }
}
