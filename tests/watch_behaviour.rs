mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{init_tracing, wait_until, write_file, CallLog};
use taskcompose::compose::{Compose, Item};
use taskcompose::errors::ComposeError;
use taskcompose::fs::RealFileSystem;
use taskcompose::runner::{LocalRunner, Native, Runner};
use taskcompose::types::{WatchEvent, WatchOptions};

fn compose_in(dir: &std::path::Path) -> Compose<LocalRunner> {
    let root = dir.canonicalize().unwrap();
    Compose::with_runner(Arc::new(LocalRunner::with_fs(Arc::new(RealFileSystem), root)))
}

fn fast_options() -> Option<WatchOptions> {
    Some(WatchOptions {
        delay: Duration::from_millis(50),
        ..WatchOptions::default()
    })
}

#[tokio::test]
async fn watch_runs_its_body_when_a_matching_file_changes() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/main.rs", "fn main() {}");

    let log = CallLog::new();
    let mut gc = compose_in(dir.path());
    gc.watch("src/**/*.rs", fast_options(), [log.task("rebuild")]);

    let runner = gc.compose().unwrap();
    assert_eq!(runner.watchers().len(), 1);

    // Give the backend a moment before touching files.
    tokio::time::sleep(Duration::from_millis(100)).await;
    write_file(dir.path(), "src/main.rs", "fn main() { println!(); }");

    assert!(wait_until(|| log.count("rebuild") >= 1).await);
    runner.close_watchers();
}

#[tokio::test]
async fn non_matching_files_do_not_trigger_the_body() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/main.rs", "fn main() {}");

    let log = CallLog::new();
    let mut gc = compose_in(dir.path());
    gc.watch("src/**/*.rs", fast_options(), [log.task("rebuild")]);
    let runner = gc.compose().unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    write_file(dir.path(), "src/notes.txt", "ignored");
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(log.count("rebuild"), 0);
    runner.close_watchers();
}

#[tokio::test]
async fn event_callbacks_receive_the_changed_path() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "assets/site.css", "body {}");

    let changes: Arc<Mutex<Vec<(WatchEvent, PathBuf)>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&changes);

    let mut gc = compose_in(dir.path());
    gc.watch("assets/*.css", fast_options(), [CallLog::new().task("noop")])
        .on(WatchEvent::Change, move |event, path| {
            recorded.lock().unwrap().push((event, path.to_path_buf()));
        });
    assert_eq!(gc.watchers()[0].events().collect::<Vec<_>>(), vec![WatchEvent::Change]);

    let runner = gc.compose().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    write_file(dir.path(), "assets/site.css", "body { margin: 0 }");

    let canonical = file.canonicalize().unwrap();
    assert!(
        wait_until(|| {
            changes
                .lock()
                .unwrap()
                .iter()
                .any(|(event, path)| *event == WatchEvent::Change && *path == canonical)
        })
        .await
    );
    runner.close_watchers();
}

#[tokio::test]
async fn run_on_start_runs_every_body_item_once() {
    let dir = tempfile::tempdir().unwrap();
    let log = CallLog::new();

    let mut gc = compose_in(dir.path());
    gc.task("lint", log.task("lint"));
    gc.watch(
        "**/*.rs",
        Some(WatchOptions {
            delay: Duration::from_millis(10),
            run_on_start: true,
            ..WatchOptions::default()
        }),
        [Item::from("lint"), Item::from(log.task("test"))],
    );

    let runner = gc.compose().unwrap();
    assert!(wait_until(|| log.entries().len() == 2).await);
    assert_eq!(log.count("lint"), 1);
    assert_eq!(log.count("test"), 1);
    runner.close_watchers();
}

#[tokio::test]
async fn closed_watchers_stop_reporting() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/lib.rs", "");

    let log = CallLog::new();
    let gc = compose_in(dir.path());
    let watch = taskcompose::compose::Watch::new("src/*.rs", fast_options(), [log.task("build")]);

    let Native::Watcher(handle) = watch.resolve(&gc.runner()).unwrap() else {
        panic!("watch should resolve to a watcher");
    };
    assert!(!handle.is_closed());

    let waiter = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.closed().await })
    };
    gc.runner().close_watchers();
    assert!(handle.is_closed());
    tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap();

    write_file(dir.path(), "src/lib.rs", "pub fn changed() {}");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(log.count("build"), 0);
    assert!(gc.runner().watchers().is_empty());
}

#[tokio::test]
async fn watch_without_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut gc = compose_in(dir.path());
    gc.watch("src/*.rs", None, Vec::<Item>::new());

    assert!(matches!(gc.compose(), Err(ComposeError::ConfigError(_))));
}

#[tokio::test]
async fn cyclic_watch_body_fails_without_taking_the_process_down() {
    let dir = tempfile::tempdir().unwrap();
    let log = CallLog::new();

    let mut gc = compose_in(dir.path());
    let a = gc.series(["b"]);
    let b = gc.series(["a"]);
    gc.task("a", a).task("b", b).task("ok", log.task("ok"));
    gc.watch(
        "**/*.rs",
        Some(WatchOptions {
            delay: Duration::from_millis(10),
            run_on_start: true,
            ..WatchOptions::default()
        }),
        ["a"],
    );

    let runner = gc.compose().unwrap();
    assert!(matches!(runner.run("a").await, Err(ComposeError::DagCycle(_))));

    // Let the start-up run happen; a recursing body would abort the test binary.
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(!runner.watchers().is_empty());
    runner.run("ok").await.unwrap();
    assert_eq!(log.count("ok"), 1);
    runner.close_watchers();
}
