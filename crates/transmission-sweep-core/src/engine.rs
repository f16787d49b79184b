use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::daemon::TaskRegistry;
use crate::error::Error;
use crate::executor::{self, DeletionOutcome, DeletionReport};
use crate::model::RemoteTask;
use crate::reconcile;
use crate::report::CleanupReporter;
use crate::scanner;

/// Drives the cleanup pipeline: snapshot the filesystem, query the daemon,
/// reconcile, delete. Phases run strictly in that order: the local
/// snapshot always completes before the daemon query starts, so a task
/// added mid-run can never be misread as orphaned.
pub struct CleanupEngine<R: TaskRegistry> {
    registry: R,
}

#[derive(Debug)]
pub struct CleanupResult {
    pub scan_duration: Duration,
    pub query_duration: Duration,
    pub artifacts_scanned: usize,
    pub tasks_fetched: usize,
    pub linked: usize,
    pub orphaned: usize,
    pub ambiguous_groups: usize,
    pub deletion_targets: usize,
    pub deleted: usize,
    pub already_absent: usize,
    pub denied: usize,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct RemoveFinishedResult {
    pub query_duration: Duration,
    pub tasks_fetched: usize,
    pub finished: usize,
    pub dry_run: bool,
}

impl<R: TaskRegistry> CleanupEngine<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Remove descriptor files with no live task:
    /// 1. Snapshot the descriptor directory (must complete before phase 2)
    /// 2. Query the daemon's task set
    /// 3. Reconcile and report every classification
    /// 4. Apply the deletion set
    pub fn run_torrents_cleanup(
        &self,
        dir: &Path,
        dry_run: bool,
        reporter: &dyn CleanupReporter,
    ) -> Result<CleanupResult, Error> {
        // Phase 1: local snapshot
        info!("Scanning descriptor directory {}...", dir.display());
        let scan_start = Instant::now();
        let artifacts = scanner::scan_torrents_dir(dir)?;
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(artifacts.len(), scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s — {} artifacts",
            scan_duration.as_secs_f64(),
            artifacts.len(),
        );

        // Phase 2: daemon query
        let (tasks, query_duration) = self.query_tasks(reporter)?;

        // Phase 3: reconcile; every decision is reported before any abort
        info!("Reconciling {} artifacts against {} tasks...", artifacts.len(), tasks.len());
        let result = reconcile::reconcile_torrents_dir(&artifacts, &tasks);
        for (artifact, task) in &result.linked {
            reporter.on_linked(artifact, task);
        }
        for artifact in &result.orphaned {
            reporter.on_orphaned(artifact);
        }
        for group in &result.duplicates {
            reporter.on_duplicate_group(group);
        }
        for task in &result.drifted {
            reporter.on_drifted(task);
        }
        let deletion_set = result.deletion_set()?.to_vec();

        // Phase 4: executor
        let reports = executor::remove_artifacts(&deletion_set, dry_run);
        for report in &reports {
            reporter.on_deletion(report);
        }

        let (deleted, already_absent, denied) = outcome_counts(&reports);
        Ok(CleanupResult {
            scan_duration,
            query_duration,
            artifacts_scanned: artifacts.len(),
            tasks_fetched: tasks.len(),
            linked: result.linked.len(),
            orphaned: result.orphaned.len(),
            ambiguous_groups: result.ambiguous_duplicates().count(),
            deletion_targets: reports.len(),
            deleted,
            already_absent,
            denied,
            dry_run,
        })
    }

    /// Remove incomplete payload entries with no live task. Same pipeline
    /// shape as the descriptor cleanup, with name-based matching and no
    /// duplicate or drift handling.
    pub fn run_incomplete_cleanup(
        &self,
        dir: &Path,
        dry_run: bool,
        reporter: &dyn CleanupReporter,
    ) -> Result<CleanupResult, Error> {
        // Phase 1: local snapshot
        info!("Scanning incomplete directory {}...", dir.display());
        let scan_start = Instant::now();
        let artifacts = scanner::scan_incomplete_dir(dir)?;
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(artifacts.len(), scan_duration.as_secs_f64());

        // Phase 2: daemon query
        let (tasks, query_duration) = self.query_tasks(reporter)?;

        // Phase 3: reconcile
        let orphaned = reconcile::reconcile_incomplete_dir(&artifacts, &tasks);
        for artifact in &orphaned {
            reporter.on_orphaned(artifact);
        }

        // Phase 4: executor
        let reports = executor::remove_artifacts(&orphaned, dry_run);
        for report in &reports {
            reporter.on_deletion(report);
        }

        let (deleted, already_absent, denied) = outcome_counts(&reports);
        Ok(CleanupResult {
            scan_duration,
            query_duration,
            artifacts_scanned: artifacts.len(),
            tasks_fetched: tasks.len(),
            linked: artifacts.len() - orphaned.len(),
            orphaned: orphaned.len(),
            ambiguous_groups: 0,
            deletion_targets: reports.len(),
            deleted,
            already_absent,
            denied,
            dry_run,
        })
    }

    /// Remove finished tasks from the daemon's own task list. No filesystem
    /// deletion here; `delete_data` is forwarded to the daemon.
    pub fn run_remove_finished(
        &self,
        delete_data: bool,
        dry_run: bool,
        reporter: &dyn CleanupReporter,
    ) -> Result<RemoveFinishedResult, Error> {
        let (tasks, query_duration) = self.query_tasks(reporter)?;

        let finished = reconcile::finished_tasks(&tasks);
        for task in &finished {
            reporter.on_finished_task(task);
        }

        let ids: Vec<i64> = finished.iter().map(|task| task.id).collect();
        if !dry_run && !ids.is_empty() {
            info!("Removing {} finished task(s) from the daemon...", ids.len());
            self.registry.remove_tasks(&ids, delete_data)?;
        }

        Ok(RemoveFinishedResult {
            query_duration,
            tasks_fetched: tasks.len(),
            finished: ids.len(),
            dry_run,
        })
    }

    fn query_tasks(
        &self,
        reporter: &dyn CleanupReporter,
    ) -> Result<(Vec<RemoteTask>, Duration), Error> {
        info!("Querying daemon task set...");
        let query_start = Instant::now();
        let tasks = self.registry.fetch_tasks()?;
        let query_duration = query_start.elapsed();
        reporter.on_query_complete(tasks.len(), query_duration.as_secs_f64());
        debug!(
            "Query completed in {:.2}s — {} tasks",
            query_duration.as_secs_f64(),
            tasks.len(),
        );
        Ok((tasks, query_duration))
    }
}

fn outcome_counts(reports: &[DeletionReport]) -> (usize, usize, usize) {
    let mut deleted = 0;
    let mut already_absent = 0;
    let mut denied = 0;
    for report in reports {
        match report.outcome {
            DeletionOutcome::Deleted => deleted += 1,
            DeletionOutcome::AlreadyAbsent => already_absent += 1,
            DeletionOutcome::Denied(_) => denied += 1,
            DeletionOutcome::DryRun => {}
        }
    }
    (deleted, already_absent, denied)
}
