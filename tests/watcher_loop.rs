mod common;
use crate::common::builders::WatcherConfigBuilder;
use crate::common::{as_fs, as_runtime, fixed_salt, init_tracing, with_timeout};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;

use reloadwatch::errors::ReloadwatchError;
use reloadwatch::fs::mock::MockFileSystem;
use reloadwatch::watch::{
    compute_salted_hash, content_paths, is_content_event, ChangeOutcome, HashAlgorithm, WatchMessage,
    Watcher,
};
use reloadwatch_test_utils::fake_runtime::{FakeContainerRuntime, RuntimeCall};

fn write_event(path: &str) -> WatchMessage {
    WatchMessage::Event(
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(PathBuf::from(path)),
    )
}

fn event(kind: EventKind, path: &str) -> WatchMessage {
    WatchMessage::Event(Event::new(kind).add_path(PathBuf::from(path)))
}

/// `dir=/data, globs=[*.conf]`, `/data/app.conf` = "A", selector `name=svc1`.
fn data_watcher(fs: &MockFileSystem, rt: &FakeContainerRuntime, action: &str) -> Watcher {
    fs.add_file("/data/app.conf", b"A".to_vec());
    fs.add_file("/data/notes.txt", b"untracked".to_vec());

    let cfg = WatcherConfigBuilder::new()
        .dir("/data", &["*.conf"])
        .name("svc1")
        .action(action)
        .build();
    let alg = HashAlgorithm::Sha256;
    let (watcher, report) =
        Watcher::configure_with_salt("test", cfg, alg, fixed_salt(alg), as_fs(fs), as_runtime(rt)).unwrap();
    assert_eq!(report.tracked_files, 1);
    watcher
}

#[test]
fn creates_writes_and_rename_targets_qualify() {
    assert!(is_content_event(&EventKind::Create(CreateKind::File)));
    assert!(is_content_event(&EventKind::Modify(ModifyKind::Data(DataChange::Any))));
    assert!(is_content_event(&EventKind::Modify(ModifyKind::Any)));
    assert!(is_content_event(&EventKind::Modify(ModifyKind::Name(RenameMode::To))));
    assert!(is_content_event(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))));
    assert!(!is_content_event(&EventKind::Modify(ModifyKind::Name(RenameMode::From))));
    assert!(!is_content_event(&EventKind::Remove(RemoveKind::File)));
    assert!(!is_content_event(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))));
    assert!(!is_content_event(&EventKind::Any));
}

#[test]
fn rename_both_only_checks_the_destination() {
    let both = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path(PathBuf::from("/data/.app.conf.tmp"))
        .add_path(PathBuf::from("/data/app.conf"));
    assert_eq!(content_paths(&both), [PathBuf::from("/data/app.conf")]);

    let from = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
        .add_path(PathBuf::from("/data/app.conf"));
    assert!(content_paths(&from).is_empty());

    let write = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(PathBuf::from("/data/app.conf"));
    assert_eq!(content_paths(&write), [PathBuf::from("/data/app.conf")]);
}

#[test]
fn unsupported_algorithm_fails_configure() {
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new();
    let cfg = WatcherConfigBuilder::new().dir("/data", &[]).hash("md5").build();

    let err = Watcher::configure("bad", cfg, as_fs(&fs), as_runtime(&rt)).unwrap_err();
    assert!(matches!(err, ReloadwatchError::UnsupportedAlgorithm(_)));
}

#[test]
fn configure_generates_a_salt_for_the_algorithm() {
    let fs = MockFileSystem::new();
    fs.add_file("/data/a.conf", b"x".to_vec());
    let rt = FakeContainerRuntime::new();
    let cfg = WatcherConfigBuilder::new().dir("/data", &[]).hash("sha1").build();

    let (watcher, report) = Watcher::configure("w", cfg, as_fs(&fs), as_runtime(&rt)).unwrap();
    assert_eq!(watcher.algorithm(), HashAlgorithm::Sha1);
    assert_eq!(watcher.salt().len(), 64);
    assert_eq!(report.watch_dirs, vec![PathBuf::from("/data")]);
    assert_eq!(
        watcher.table().get(Path::new("/data/a.conf")),
        Some(compute_salted_hash(&fs, Path::new("/data/a.conf"), HashAlgorithm::Sha1, watcher.salt()).unwrap())
    );
}

#[tokio::test]
async fn change_then_duplicate_notification_dispatches_once() {
    init_tracing();
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new()
        .with_container("c1", "svc1-1")
        .with_container("c2", "svc1-2");
    let watcher = data_watcher(&fs, &rt, "restart");
    let path = Path::new("/data/app.conf");
    let d1 = watcher.table().get(path).unwrap();

    fs.add_file(path, b"B".to_vec());
    let outcome = watcher.check_and_maybe_dispatch(path).await.unwrap();
    let ChangeOutcome::Changed { previous, current } = outcome.clone() else {
        panic!("expected a change, got {outcome:?}");
    };
    assert_eq!(previous, d1);
    assert_eq!(watcher.table().get(path), Some(current));

    let again = watcher.check_and_maybe_dispatch(path).await.unwrap();
    assert_eq!(again, ChangeOutcome::Unchanged);

    assert_eq!(
        rt.calls(),
        vec![
            RuntimeCall::List(reloadwatch::container::ContainerFilter {
                name: Some("svc1".into()),
                label: None
            }),
            RuntimeCall::Restart("c1".into()),
            RuntimeCall::Restart("c2".into()),
        ]
    );
}

#[tokio::test]
async fn unmodified_file_never_mutates_or_dispatches() {
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new().with_container("c1", "svc1");
    let watcher = data_watcher(&fs, &rt, "restart");
    let path = Path::new("/data/app.conf");
    let before = watcher.table().get(path);

    for _ in 0..5 {
        // Rewrite identical bytes: a write event with no content change.
        fs.add_file(path, b"A".to_vec());
        assert_eq!(
            watcher.check_and_maybe_dispatch(path).await.unwrap(),
            ChangeOutcome::Unchanged
        );
    }

    assert_eq!(watcher.table().get(path), before);
    assert!(rt.calls().is_empty());
}

#[tokio::test]
async fn untracked_path_in_watched_dir_is_invisible() {
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new().with_container("c1", "svc1");
    let watcher = data_watcher(&fs, &rt, "restart");

    fs.add_file("/data/notes.txt", b"changed".to_vec());
    fs.add_file("/data/new.conf", b"created later".to_vec());

    for p in ["/data/notes.txt", "/data/new.conf"] {
        let outcome = watcher.check_and_maybe_dispatch(Path::new(p)).await.unwrap();
        assert_eq!(outcome, ChangeOutcome::Untracked);
        assert!(!watcher.table().contains(Path::new(p)));
    }
    assert_eq!(watcher.table().len(), 1);
    assert!(rt.calls().is_empty());
}

#[tokio::test]
async fn deleted_file_is_tolerated_and_keeps_last_digest() {
    init_tracing();
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new().with_container("c1", "svc1");
    let watcher = data_watcher(&fs, &rt, "restart");
    let path = Path::new("/data/app.conf");
    let before = watcher.table().get(path);

    fs.remove_file(path);
    let err = watcher.check_and_maybe_dispatch(path).await.unwrap_err();
    assert!(matches!(err, ReloadwatchError::FileUnreadable { .. }));
    assert_eq!(watcher.table().get(path), before);

    // Recreated with new content: detected on the next event.
    fs.add_file(path, b"C".to_vec());
    assert!(matches!(
        watcher.check_and_maybe_dispatch(path).await.unwrap(),
        ChangeOutcome::Changed { .. }
    ));
    assert_eq!(rt.actions(), vec![RuntimeCall::Restart("c1".into())]);
}

#[tokio::test]
async fn event_loop_filters_events_and_debounces_until_channel_closes() {
    init_tracing();
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new().with_container("c1", "svc1");
    let watcher = Arc::new(data_watcher(&fs, &rt, "sighup"));

    let (tx, rx) = mpsc::unbounded_channel();

    fs.add_file("/data/app.conf", b"B".to_vec());
    // Ignored kinds first: nothing may happen for these.
    tx.send(event(EventKind::Remove(RemoveKind::File), "/data/app.conf")).unwrap();
    tx.send(event(EventKind::Modify(ModifyKind::Name(RenameMode::From)), "/data/app.conf")).unwrap();
    tx.send(WatchMessage::Error(notify::Error::generic("transient backend error"))).unwrap();
    // One logical write, reported three times.
    tx.send(write_event("/data/app.conf")).unwrap();
    tx.send(write_event("/data/app.conf")).unwrap();
    tx.send(event(EventKind::Create(CreateKind::File), "/data/app.conf")).unwrap();
    // Untracked neighbour.
    tx.send(write_event("/data/notes.txt")).unwrap();
    drop(tx);

    let loop_watcher = Arc::clone(&watcher);
    with_timeout(async move { loop_watcher.run_event_loop(rx).await }).await;

    assert_eq!(
        rt.actions(),
        vec![RuntimeCall::Signal("c1".into(), "SIGHUP".into())]
    );
}

#[tokio::test]
async fn zero_matching_containers_keeps_the_watcher_running() {
    init_tracing();
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new();
    let watcher = data_watcher(&fs, &rt, "restart");
    let path = Path::new("/data/app.conf");

    fs.add_file(path, b"B".to_vec());
    assert!(matches!(
        watcher.check_and_maybe_dispatch(path).await.unwrap(),
        ChangeOutcome::Changed { .. }
    ));

    fs.add_file(path, b"C".to_vec());
    assert!(matches!(
        watcher.check_and_maybe_dispatch(path).await.unwrap(),
        ChangeOutcome::Changed { .. }
    ));

    let lists = rt
        .calls()
        .into_iter()
        .filter(|c| matches!(c, RuntimeCall::List(_)))
        .count();
    assert_eq!(lists, 2);
    assert!(rt.actions().is_empty());
}

#[tokio::test]
async fn unknown_action_is_only_reported_when_a_change_fires() {
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new().with_container("c1", "svc1");
    // Configure succeeds despite the bogus action.
    let watcher = data_watcher(&fs, &rt, "teleport");
    let path = Path::new("/data/app.conf");

    fs.add_file(path, b"B".to_vec());
    let outcome = watcher.check_and_maybe_dispatch(path).await.unwrap();

    // The table still moves forward; only the dispatch is refused.
    assert!(matches!(outcome, ChangeOutcome::Changed { .. }));
    assert!(rt.calls().is_empty());
}

#[tokio::test]
async fn rename_over_tracked_file_dispatches_once() {
    init_tracing();
    let fs = MockFileSystem::new();
    let rt = FakeContainerRuntime::new().with_container("c1", "svc1");
    let watcher = Arc::new(data_watcher(&fs, &rt, "restart"));

    let (tx, rx) = mpsc::unbounded_channel();

    // Atomic save: temp file written, then renamed over the target.
    fs.add_file("/data/app.conf", b"B".to_vec());
    tx.send(event(EventKind::Create(CreateKind::File), "/data/.app.conf.tmp")).unwrap();
    tx.send(event(EventKind::Modify(ModifyKind::Name(RenameMode::From)), "/data/.app.conf.tmp")).unwrap();
    tx.send(event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), "/data/app.conf")).unwrap();
    tx.send(WatchMessage::Event(
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/data/.app.conf.tmp"))
            .add_path(PathBuf::from("/data/app.conf")),
    ))
    .unwrap();
    drop(tx);

    let loop_watcher = Arc::clone(&watcher);
    with_timeout(async move { loop_watcher.run_event_loop(rx).await }).await;

    assert_eq!(rt.actions(), vec![RuntimeCall::Restart("c1".into())]);
    assert!(!watcher.table().contains(Path::new("/data/.app.conf.tmp")));
}
