use crate::areas::backend::VcsBackend;
use crate::areas::partitioner::Partitioner;
use crate::areas::push_agent::PushAgent;
use crate::areas::session::BackupSession;
use crate::areas::size_oracle::SizeOracle;
use crate::areas::stash::Stash;
use crate::artifacts::partition::PartitionReport;
use crate::artifacts::partition::push_unit::PushUnit;
use crate::artifacts::push::RunSummary;
use crate::artifacts::targets::TargetList;
use anyhow::Context;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Units waiting for the push worker before partitioning blocks
const PUSH_QUEUE_DEPTH: usize = 64;

impl Stash {
    /// Back up every target of `targets` through `backend`.
    ///
    /// Targets are partitioned on up to `session.workers()` blocking workers.
    /// Every unit they produce goes through a single push worker which owns
    /// the backend, so at most one push is in flight at any time, and tears the
    /// session down once the queue is drained, even if a push panicked. Failures
    /// local to a unit or a target are counted in the returned summary; only
    /// a broken backend setup or teardown is an error.
    pub async fn backup<B>(
        &mut self,
        session: Arc<BackupSession>,
        mut backend: B,
        targets: &TargetList,
    ) -> anyhow::Result<RunSummary>
    where
        B: VcsBackend + 'static,
    {
        let mut summary = RunSummary {
            targets: targets.targets().len(),
            ..Default::default()
        };

        let (resolved, unresolved) = targets.resolve();
        for issue in &unresolved {
            issue.report();
        }
        summary.record_issues(&unresolved);

        for target in &resolved {
            if !session.workspace().contains(target) {
                warn!(
                    "{} is outside of the work tree {}, git will refuse to stage it",
                    target.display(),
                    session.workspace().path().display()
                );
            }
        }

        if let Err(err) = prepare(&mut backend, &session) {
            if let Err(teardown_err) = backend.teardown() {
                error!("teardown after a failed setup also failed: {teardown_err:#}");
            }
            return Err(err);
        }

        let (queue, mut units) = mpsc::channel::<PushUnit>(PUSH_QUEUE_DEPTH);
        let mut agent = PushAgent::new(backend, session.clone(), self.oracle());
        let pusher = tokio::task::spawn_blocking(move || {
            let mut reports = Vec::new();
            let drained = panic::catch_unwind(AssertUnwindSafe(|| {
                while let Some(unit) = units.blocking_recv() {
                    reports.push(agent.push(unit));
                }
            }));
            drop(units);

            let torn_down = agent.into_backend().teardown();
            (drained.map(|_| reports), torn_down)
        });

        let partitioned = partition_targets(self.oracle(), &session, resolved, queue).await;
        let (drained, torn_down) = pusher.await.context("The push worker panicked")?;
        torn_down.context("Failed to tear down the backup repository")?;
        let reports = drained.map_err(|_| anyhow::anyhow!("The push worker panicked"))?;

        for outcome in partitioned? {
            match outcome {
                Ok(report) => summary.record_issues(&report.issues),
                Err(err) => {
                    error!("{err:#}");
                    summary.errors += 1;
                }
            }
        }
        for report in &reports {
            summary.record_push(report);
        }

        info!("backup finished");
        writeln!(self.writer(), "{summary}")?;

        Ok(summary)
    }
}

fn prepare<B: VcsBackend>(backend: &mut B, session: &BackupSession) -> anyhow::Result<()> {
    backend.init_repo()?;
    backend.add_remote(session.remote())?;

    if let Err(err) = backend.shallow_fetch() {
        warn!("shallow fetch failed, starting from an empty history: {err:#}");
    }

    backend.create_and_switch_branch(session.branch())?;

    if !session.seed_files().is_empty() {
        backend
            .stage(session.seed_files())
            .context("Failed to stage seed files")?;
    }

    Ok(())
}

async fn partition_targets(
    oracle: Arc<SizeOracle>,
    session: &BackupSession,
    targets: Vec<PathBuf>,
    queue: mpsc::Sender<PushUnit>,
) -> anyhow::Result<Vec<anyhow::Result<PartitionReport>>> {
    let workers = Arc::new(Semaphore::new(session.workers()));
    let soft_threshold = session.thresholds().soft();
    let mut tasks = JoinSet::new();

    for target in targets {
        let permit = workers.clone().acquire_owned().await?;
        let oracle = oracle.clone();
        let mut queue = queue.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            info!("backing up {}", target.display());
            Partitioner::new(&oracle, soft_threshold)
                .partition(&target, &mut queue)
                .with_context(|| format!("Failed to partition {}", target.display()))
        });
    }
    drop(queue);

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("A partitioning worker panicked")?);
    }

    Ok(outcomes)
}
