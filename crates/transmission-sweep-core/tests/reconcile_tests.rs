use std::path::PathBuf;

use transmission_sweep_core::model::{ArtifactKind, LocalArtifact, RemoteTask, TaskStatus};
use transmission_sweep_core::reconcile::{
    self, finished_tasks, is_finished, reconcile_incomplete_dir, reconcile_torrents_dir,
};
use transmission_sweep_core::Error;

fn artifact(name: &str, identity: &str) -> LocalArtifact {
    LocalArtifact {
        name: name.to_string(),
        path: PathBuf::from(format!("/watch/{name}")),
        identity: identity.to_string(),
        kind: ArtifactKind::DescriptorFile,
    }
}

fn payload(name: &str, identity: &str) -> LocalArtifact {
    LocalArtifact {
        name: name.to_string(),
        path: PathBuf::from(format!("/incomplete/{name}")),
        identity: identity.to_string(),
        kind: ArtifactKind::PayloadEntry,
    }
}

fn task(id: i64, identity: &str, source: Option<&str>) -> RemoteTask {
    RemoteTask {
        id,
        identity: identity.to_string(),
        display_name: format!("task-{id}"),
        source_descriptor_name: source.map(str::to_owned),
        status: TaskStatus::Downloading,
        is_finished: false,
        done_date: 0,
    }
}

#[test]
fn test_orphaned_artifact_enters_deletion_set() {
    let artifacts = vec![artifact("live.torrent", "aaa"), artifact("stale.torrent", "bbb")];
    let tasks = vec![task(1, "aaa", Some("live.torrent"))];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert_eq!(result.orphaned.len(), 1);
    assert_eq!(result.orphaned[0].name, "stale.torrent");

    let deletion = result.deletion_set().unwrap();
    assert_eq!(deletion.len(), 1);
    assert_eq!(deletion[0].name, "stale.torrent");
}

#[test]
fn test_second_run_is_idempotent() {
    // After the orphan is removed, a re-run with unchanged daemon state
    // must produce an empty deletion set.
    let artifacts = vec![artifact("live.torrent", "aaa")];
    let tasks = vec![task(1, "aaa", Some("live.torrent"))];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert!(result.deletion_set().unwrap().is_empty());
    assert_eq!(result.linked.len(), 1);
}

#[test]
fn test_link_by_unique_identity_without_source_name() {
    // Magnet-added tasks have no descriptor source name; a single-member
    // identity group is still an unambiguous link.
    let artifacts = vec![artifact("magnet-added.torrent", "aaa")];
    let tasks = vec![task(1, "aaa", None)];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert_eq!(result.linked.len(), 1);
    assert!(result.drifted.is_empty());
    assert!(result.deletion_set().unwrap().is_empty());
}

#[test]
fn test_duplicate_exactly_one_linked_releases_the_copy() {
    let artifacts = vec![artifact("a.torrent", "hhh"), artifact("a-copy.torrent", "hhh")];
    let tasks = vec![task(1, "hhh", Some("a.torrent"))];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert_eq!(result.duplicates.len(), 1);
    assert!(!result.duplicates[0].is_ambiguous());

    let deletion = result.deletion_set().unwrap();
    assert_eq!(deletion.len(), 1);
    assert_eq!(deletion[0].name, "a-copy.torrent");
}

#[test]
fn test_duplicate_both_linked_is_ambiguous() {
    let artifacts = vec![artifact("a.torrent", "hhh"), artifact("b.torrent", "hhh")];
    let tasks = vec![
        task(1, "hhh", Some("a.torrent")),
        task(2, "hhh", Some("b.torrent")),
    ];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert!(result.orphaned.is_empty());
    let ambiguous: Vec<_> = result.ambiguous_duplicates().collect();
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].members.len(), 2);
    assert_eq!(ambiguous[0].linked_count, 2);

    // conservation holds (2 + 0 - 2 = 0), so the deletion set resolves,
    // to nothing
    assert!(result.deletion_set().unwrap().is_empty());
}

#[test]
fn test_duplicate_none_linked_is_ambiguous_and_untouchable() {
    let artifacts = vec![
        artifact("a.torrent", "hhh"),
        artifact("b.torrent", "hhh"),
        artifact("c.torrent", "xxx"),
    ];
    let tasks = vec![task(1, "xxx", Some("c.torrent"))];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert!(result.orphaned.is_empty());
    let ambiguous: Vec<_> = result.ambiguous_duplicates().collect();
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].linked_count, 0);

    // The two unaccounted-for copies break conservation (1 + 0 - 3), so the
    // run aborts rather than guessing.
    assert!(matches!(
        result.deletion_set(),
        Err(Error::ConservationMismatch(-2))
    ));
}

#[test]
fn test_drift_aborts_with_zero_deletions() {
    // An unlinkable remote task means the daemon and the filesystem
    // disagree; otherwise-orphaned artifacts must survive.
    let artifacts = vec![artifact("stale.torrent", "aaa")];
    let tasks = vec![task(1, "zzz", None)];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert_eq!(result.drifted.len(), 1);
    assert_eq!(result.orphaned.len(), 1);

    match result.deletion_set() {
        Err(Error::DriftDetected(identities)) => assert_eq!(identities, vec!["zzz".to_string()]),
        other => panic!("expected drift abort, got {:?}", other),
    }
}

#[test]
fn test_conservation_mismatch_aborts() {
    // 3 remote tasks, 2 local artifacts, 1 orphan: 3 + 1 - 2 = 2 net-new
    // items mean the filesystem moved mid-run.
    let artifacts = vec![artifact("a.torrent", "aaa"), artifact("c.torrent", "ccc")];
    let tasks = vec![
        task(1, "aaa", Some("a.torrent")),
        task(2, "aa2", Some("a.torrent")),
        task(3, "aa3", Some("a.torrent")),
    ];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert!(result.drifted.is_empty());
    assert_eq!(result.orphaned.len(), 1);
    assert!(matches!(
        result.deletion_set(),
        Err(Error::ConservationMismatch(2))
    ));
}

#[test]
fn test_source_name_match_wins_over_identity_group() {
    // The task's identity group has two members, which alone would be
    // unlinkable, but the daemon remembers which file it loaded.
    let artifacts = vec![artifact("a.torrent", "hhh"), artifact("b.torrent", "hhh")];
    let tasks = vec![task(1, "hhh", Some("b.torrent"))];

    let result = reconcile_torrents_dir(&artifacts, &tasks);
    assert_eq!(result.linked.len(), 1);
    assert_eq!(result.linked[0].0.name, "b.torrent");

    let deletion = result.deletion_set().unwrap();
    assert_eq!(deletion.len(), 1);
    assert_eq!(deletion[0].name, "a.torrent");
}

#[test]
fn test_incomplete_entries_match_by_display_name() {
    let artifacts = vec![
        payload("ubuntu.iso.part", "ubuntu.iso"),
        payload("zombie.mkv.part", "zombie.mkv"),
        payload("show.s01", "show.s01"),
    ];
    let mut live = task(1, "aaa", None);
    live.display_name = "ubuntu.iso".to_string();
    let mut live2 = task(2, "bbb", None);
    live2.display_name = "show.s01".to_string();

    let orphaned = reconcile_incomplete_dir(&artifacts, &[live, live2]);
    assert_eq!(orphaned.len(), 1);
    assert_eq!(orphaned[0].name, "zombie.mkv.part");
}

#[test]
fn test_finished_task_classification() {
    let mut done = task(1, "aaa", None);
    done.status = TaskStatus::Stopped;
    done.done_date = 1_700_000_000;
    assert!(is_finished(&done));

    // Finished flag alone is enough when the task is stopped.
    let mut flagged = task(2, "bbb", None);
    flagged.status = TaskStatus::Stopped;
    flagged.is_finished = true;
    assert!(is_finished(&flagged));

    // A downloading task is never finished, whatever its timestamp says.
    let mut downloading = task(3, "ccc", None);
    downloading.status = TaskStatus::Downloading;
    downloading.done_date = 1_700_000_000;
    downloading.is_finished = true;
    assert!(!is_finished(&downloading));

    // Stopped without either signal is merely paused.
    let mut paused = task(4, "ddd", None);
    paused.status = TaskStatus::Stopped;
    assert!(!is_finished(&paused));

    let tasks = vec![done, flagged, downloading, paused];
    let finished = finished_tasks(&tasks);
    assert_eq!(finished.len(), 2);
    assert_eq!(finished[0].id, 1);
    assert_eq!(finished[1].id, 2);
}

#[test]
fn test_identity_index_preserves_discovery_order() {
    let artifacts = vec![
        artifact("z.torrent", "zzz"),
        artifact("a.torrent", "aaa"),
        artifact("z-copy.torrent", "zzz"),
    ];
    let index = reconcile::IdentityIndex::build(&artifacts);

    let identities: Vec<&str> = index.iter().map(|(identity, _)| identity).collect();
    assert_eq!(identities, vec!["zzz", "aaa"]);
    assert_eq!(index.group("zzz"), &[0, 2]);
    assert_eq!(index.group("missing"), &[] as &[usize]);
}
