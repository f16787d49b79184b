use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::Error;
use crate::model::{LocalArtifact, RemoteTask};

/// Identity → artifact indices, discovery order preserved. A group with
/// more than one member is a duplicate-identity group.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    groups: HashMap<String, Vec<usize>>,
    order: Vec<String>,
}

impl IdentityIndex {
    pub fn build(artifacts: &[LocalArtifact]) -> Self {
        let mut index = IdentityIndex::default();
        for (i, artifact) in artifacts.iter().enumerate() {
            let members = index.groups.entry(artifact.identity.clone()).or_default();
            if members.is_empty() {
                index.order.push(artifact.identity.clone());
            }
            members.push(i);
        }
        index
    }

    pub fn group(&self, identity: &str) -> &[usize] {
        self.groups.get(identity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Identity groups in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.order
            .iter()
            .map(|identity| (identity.as_str(), self.group(identity)))
    }
}

/// A duplicate-identity group, reported for operator visibility whether or
/// not any member can be deleted.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub identity: String,
    pub members: Vec<LocalArtifact>,
    pub linked_count: usize,
}

impl DuplicateGroup {
    /// Deletion within the group is safe only when exactly one member is
    /// linked to a live task; zero or several linked members leave no way to
    /// tell which copy the daemon actually owns.
    pub fn is_ambiguous(&self) -> bool {
        self.linked_count != 1
    }
}

/// Full classification of one descriptor-directory reconciliation pass.
///
/// The classification is always complete, even when the run must abort, so
/// every decision can be reported to the operator. Only `deletion_set`
/// enforces the aborts.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Local artifacts matched to a live task, with the task they matched.
    pub linked: Vec<(LocalArtifact, RemoteTask)>,
    /// Local artifacts with no live task; the deletion candidates.
    pub orphaned: Vec<LocalArtifact>,
    /// Every identity group with more than one member.
    pub duplicates: Vec<DuplicateGroup>,
    /// Remote tasks with no local counterpart. Non-empty means the daemon's
    /// view disagrees with the filesystem.
    pub drifted: Vec<RemoteTask>,
    /// `remote + orphaned - local`; nonzero means the filesystem changed
    /// between the snapshot and the daemon query.
    pub new_items_count: i64,
}

impl Reconciliation {
    /// The final deletion set, available only when the classification is
    /// unambiguous. Drift and net-new activity are fatal: reconciliation
    /// refuses to guess.
    pub fn deletion_set(&self) -> Result<&[LocalArtifact], Error> {
        if !self.drifted.is_empty() {
            return Err(Error::DriftDetected(
                self.drifted.iter().map(|task| task.identity.clone()).collect(),
            ));
        }
        if self.new_items_count != 0 {
            return Err(Error::ConservationMismatch(self.new_items_count));
        }
        Ok(&self.orphaned)
    }

    /// Duplicate groups where no member may be deleted.
    pub fn ambiguous_duplicates(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.duplicates.iter().filter(|group| group.is_ambiguous())
    }
}

/// Descriptor-directory reconciliation.
///
/// Links every remote task to at most one local artifact (first by exact
/// source-descriptor-name match, then by unique identity group), then
/// classifies every identity group. Unlinkable tasks are drift.
pub fn reconcile_torrents_dir(
    artifacts: &[LocalArtifact],
    tasks: &[RemoteTask],
) -> Reconciliation {
    let index = IdentityIndex::build(artifacts);

    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (i, artifact) in artifacts.iter().enumerate() {
        by_name.entry(artifact.name.as_str()).or_insert(i);
    }

    let mut links: Vec<(usize, usize)> = Vec::new();
    let mut linked_artifacts: HashSet<usize> = HashSet::new();
    let mut drifted: Vec<RemoteTask> = Vec::new();

    for (t, task) in tasks.iter().enumerate() {
        let by_source = task
            .source_descriptor_name
            .as_deref()
            .and_then(|name| by_name.get(name).copied());

        let target = by_source.or_else(|| {
            let group = index.group(&task.identity);
            (group.len() == 1).then(|| group[0])
        });

        match target {
            Some(a) => {
                links.push((t, a));
                linked_artifacts.insert(a);
            }
            None => {
                debug!(
                    "task {} ({}) has no local descriptor",
                    task.id, task.identity
                );
                drifted.push(task.clone());
            }
        }
    }

    let mut orphaned: Vec<LocalArtifact> = Vec::new();
    let mut duplicates: Vec<DuplicateGroup> = Vec::new();

    for (identity, members) in index.iter() {
        let linked_count = members
            .iter()
            .filter(|i| linked_artifacts.contains(*i))
            .count();

        if members.len() == 1 {
            if linked_count == 0 {
                orphaned.push(artifacts[members[0]].clone());
            }
            continue;
        }

        if linked_count == 1 {
            // exactly one live copy; the rest are safe to drop
            orphaned.extend(
                members
                    .iter()
                    .filter(|i| !linked_artifacts.contains(*i))
                    .map(|&i| artifacts[i].clone()),
            );
        }
        duplicates.push(DuplicateGroup {
            identity: identity.to_string(),
            members: members.iter().map(|&i| artifacts[i].clone()).collect(),
            linked_count,
        });
    }

    let new_items_count = tasks.len() as i64 + orphaned.len() as i64 - artifacts.len() as i64;

    let linked = links
        .into_iter()
        .map(|(t, a)| (artifacts[a].clone(), tasks[t].clone()))
        .collect();

    Reconciliation {
        linked,
        orphaned,
        duplicates,
        drifted,
        new_items_count,
    }
}

/// Incomplete-payload reconciliation. Payload entries are 1:1 with task
/// display names by construction of the download client, so there is no
/// duplicate or drift handling: an entry whose identity is not a live task
/// name is orphaned.
pub fn reconcile_incomplete_dir(
    artifacts: &[LocalArtifact],
    tasks: &[RemoteTask],
) -> Vec<LocalArtifact> {
    let live_names: HashSet<&str> = tasks.iter().map(|task| task.display_name.as_str()).collect();
    artifacts
        .iter()
        .filter(|artifact| !live_names.contains(artifact.identity.as_str()))
        .cloned()
        .collect()
}

/// A finished task is stopped with either a positive done timestamp or the
/// daemon's finished flag. Both signals are checked: after a daemon restart
/// a task whose payload was removed externally keeps the timestamp but
/// loses the flag.
pub fn is_finished(task: &RemoteTask) -> bool {
    task.status.is_stopped() && (task.done_date > 0 || task.is_finished)
}

/// Finished tasks, candidates for removal from the daemon's task list.
pub fn finished_tasks(tasks: &[RemoteTask]) -> Vec<&RemoteTask> {
    tasks.iter().filter(|task| is_finished(task)).collect()
}
