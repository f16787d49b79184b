use crate::executor::DeletionReport;
use crate::model::{LocalArtifact, RemoteTask};
use crate::reconcile::DuplicateGroup;

/// Hooks for surfacing pipeline decisions.
///
/// The CLI implements this with console output; tests use `SilentReporter`.
/// All methods have default no-op implementations. Every classification is
/// reported before any abort, so the operator can diagnose drift manually.
pub trait CleanupReporter {
    fn on_scan_complete(&self, _artifact_count: usize, _duration_secs: f64) {}
    fn on_query_complete(&self, _task_count: usize, _duration_secs: f64) {}
    fn on_linked(&self, _artifact: &LocalArtifact, _task: &RemoteTask) {}
    fn on_orphaned(&self, _artifact: &LocalArtifact) {}
    fn on_duplicate_group(&self, _group: &DuplicateGroup) {}
    fn on_drifted(&self, _task: &RemoteTask) {}
    fn on_finished_task(&self, _task: &RemoteTask) {}
    fn on_deletion(&self, _report: &DeletionReport) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl CleanupReporter for SilentReporter {}
