//! Staging, committing and pushing of push units
//!
//! ## Protocol
//!
//! 1. size every member; a single-path unit over the hard ceiling is refused
//!    outright, oversized members of a group are left out of it
//! 2. stage what is left and commit it with the session label
//! 3. force-push the session branch, retrying per the session's retry policy
//!
//! Every failure ends up in the returned `PushReport`; none of them is
//! returned as an error, so one bad unit never stops the run.

use crate::areas::backend::VcsBackend;
use crate::areas::session::BackupSession;
use crate::areas::size_oracle::SizeOracle;
use crate::artifacts::core::error::BackupError;
use crate::artifacts::partition::push_unit::PushUnit;
use crate::artifacts::push::{PushOutcome, PushReport};
use crate::artifacts::size::ByteSize;
use std::sync::Arc;
use tracing::info;

pub struct PushAgent<B: VcsBackend> {
    backend: B,
    session: Arc<BackupSession>,
    oracle: Arc<SizeOracle>,
}

impl<B: VcsBackend> PushAgent<B> {
    pub fn new(backend: B, session: Arc<BackupSession>, oracle: Arc<SizeOracle>) -> Self {
        PushAgent {
            backend,
            session,
            oracle,
        }
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn push(&mut self, unit: PushUnit) -> PushReport {
        let mut report = PushReport::new(unit);
        let ceiling = self.session.thresholds().hard();

        let mut total = 0;
        for path in report.unit.paths() {
            let size = match self.oracle.size_of(path) {
                Ok(size) => size,
                Err(issue) => {
                    issue.report();
                    report.issues.push(issue);
                    continue;
                }
            };

            if size > ceiling.as_u64() {
                let issue = BackupError::OversizeUnit {
                    path: path.clone(),
                    size: ByteSize::b(size),
                    ceiling,
                };
                issue.report();
                report.issues.push(issue);
                continue;
            }

            total += size;
            report.staged.push(path.clone());
        }

        if report.staged.is_empty() {
            return report;
        }

        info!("pushing '{}', size: {}", report.unit, ByteSize::b(total));

        if let Err(err) = self
            .backend
            .stage(&report.staged)
            .and_then(|_| self.backend.commit(self.session.label()))
        {
            return self.fail(report, 0, format!("{err:#}"));
        }

        let branch = self.session.branch();
        let backend = &mut self.backend;
        let attempted = self
            .session
            .retry()
            .run(|_| backend.force_push(branch).map_err(|err| format!("{err:#}")));

        report.attempts = attempted.attempts;
        match attempted.result {
            Ok(()) => {
                report.outcome = PushOutcome::Pushed;
                report
            }
            Err(reason) => self.fail(report, attempted.attempts, reason),
        }
    }

    fn fail(&self, mut report: PushReport, attempts: u32, reason: String) -> PushReport {
        let issue = BackupError::PushFailure {
            paths: report.staged.clone(),
            attempts,
            reason,
        };
        issue.report();

        report.issues.push(issue);
        report.outcome = PushOutcome::Failed;
        report
    }
}
