use colored::*;
use tracing::debug;
use transmission_sweep_core::executor::{DeletionOutcome, DeletionReport};
use transmission_sweep_core::model::{LocalArtifact, RemoteTask};
use transmission_sweep_core::reconcile::DuplicateGroup;
use transmission_sweep_core::CleanupReporter;

/// Console reporter: one line per classification and deletion decision.
pub struct ConsoleReporter;

impl CleanupReporter for ConsoleReporter {
    fn on_scan_complete(&self, artifact_count: usize, duration_secs: f64) {
        eprintln!(
            "  {} Scan complete: {} artifacts in {:.2}s",
            "✓".green(),
            artifact_count,
            duration_secs
        );
    }

    fn on_query_complete(&self, task_count: usize, duration_secs: f64) {
        eprintln!(
            "  {} Daemon query complete: {} tasks in {:.2}s",
            "✓".green(),
            task_count,
            duration_secs
        );
    }

    fn on_linked(&self, artifact: &LocalArtifact, task: &RemoteTask) {
        debug!("linked {} to task {}", artifact.name, task.id);
    }

    fn on_orphaned(&self, artifact: &LocalArtifact) {
        println!("{} {}", "orphaned".yellow(), artifact.path.display());
    }

    fn on_duplicate_group(&self, group: &DuplicateGroup) {
        let verdict = if group.is_ambiguous() {
            "unsafe to delete".red()
        } else {
            "one live copy".normal()
        };
        println!(
            "{} {} ({} members, {} linked, {})",
            "duplicate".cyan(),
            group.identity,
            group.members.len(),
            group.linked_count,
            verdict
        );
    }

    fn on_drifted(&self, task: &RemoteTask) {
        println!(
            "{} task {} ({}) has no local descriptor",
            "drift".red(),
            task.id,
            task.identity
        );
    }

    fn on_finished_task(&self, task: &RemoteTask) {
        println!(
            "{} {} ({})",
            "finished".green(),
            task.display_name,
            task.identity
        );
    }

    fn on_deletion(&self, report: &DeletionReport) {
        match &report.outcome {
            DeletionOutcome::Deleted => println!("removed {}", report.path.display()),
            DeletionOutcome::AlreadyAbsent => {
                println!("removed {} (was already gone)", report.path.display())
            }
            DeletionOutcome::DryRun => println!("would remove {}", report.path.display()),
            DeletionOutcome::Denied(reason) => {
                println!("{} {}: {}", "failed".red(), report.path.display(), reason)
            }
        }
    }
}
