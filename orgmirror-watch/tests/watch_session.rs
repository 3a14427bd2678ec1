mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use orgmirror_core::{types::CloneProtocol, Level, Reporter};
use orgmirror_watch::{watch, ShutdownPolicy, TransferPolicy, WatchError};
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::time::timeout;

use common::{harness, FakeCopies, FakeHost, Harness, TransferAnswer};

fn quick_policy() -> TransferPolicy {
    TransferPolicy {
        poll_interval: Duration::from_millis(50),
        timeout: Duration::from_secs(5),
        auto_update_remotes: true,
        clone_protocol: CloneProtocol::Ssh,
    }
}

/// Canonical base with `acme/svc/.git` and an empty `other` folder.
fn layout() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("base");
    let base = std::fs::canonicalize(dir.path()).expect("canonicalize");
    std::fs::create_dir_all(base.join("acme/svc/.git")).expect("mkdir");
    std::fs::create_dir_all(base.join("other")).expect("mkdir");
    (dir, base)
}

fn reporter(h: &Harness) -> Arc<dyn Reporter> {
    h.reporter.clone()
}

async fn wait_for_watcher(h: &Harness) {
    for _ in 0..100 {
        if h.reporter.contains(Level::Success, "Watching for repo moves in") {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("watcher never started: {:?}", h.reporter.entries());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn folder_moved_between_orgs_is_transferred() {
    let (_dir, base) = layout();
    let dest = base.join("other/svc");
    let h = harness(
        FakeHost::new(TransferAnswer::Accepted, Some(1)),
        FakeCopies::with_remote(&dest, "git@github.com:acme/svc.git"),
        quick_policy(),
    );
    let mut completed = h.orchestrator.subscribe();
    let (shutdown, _) = broadcast::channel::<()>(4);

    let session = tokio::spawn({
        let base = base.clone();
        let orchestrator = h.orchestrator.clone();
        let reporter = reporter(&h);
        let shutdown = shutdown.clone();
        async move { watch(&base, orchestrator, reporter, shutdown, ShutdownPolicy::default()).await }
    });
    wait_for_watcher(&h).await;

    std::fs::rename(base.join("acme/svc"), &dest).expect("rename");

    let done = timeout(Duration::from_secs(10), completed.recv())
        .await
        .expect("transfer within 10s")
        .expect("event");
    assert_eq!(
        (done.source_org.as_str(), done.dest_org.as_str(), done.repo.as_str()),
        ("acme", "other", "svc")
    );

    shutdown.send(()).expect("shutdown");
    let summary = timeout(Duration::from_secs(10), session)
        .await
        .expect("watch stops")
        .expect("join")
        .expect("watch");

    assert_eq!(summary.dispatched, 1, "one rename, one workflow");
    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        h.host.requests(),
        [("acme".to_string(), "svc".to_string(), "other".to_string())]
    );
    assert_eq!(
        h.copies.remote_for(&dest).as_deref(),
        Some("git@github.com:other/svc.git")
    );
    assert!(h.reporter.contains(Level::Info, "Watcher stopped"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_sent_during_startup_stops_the_session() {
    let (_dir, base) = layout();
    let h = harness(
        FakeHost::new(TransferAnswer::Accepted, Some(1)),
        FakeCopies::default(),
        quick_policy(),
    );
    let (shutdown, _) = broadcast::channel::<()>(4);

    let session = watch(
        &base,
        h.orchestrator.clone(),
        reporter(&h),
        shutdown.clone(),
        ShutdownPolicy::default(),
    );
    let stop = async {
        let _ = shutdown.send(());
    };

    let (result, ()) = timeout(Duration::from_secs(5), async { tokio::join!(session, stop) })
        .await
        .expect("watch returns without ctrl-c");
    let summary = result.expect("watch");
    assert_eq!(summary.dispatched, 0);
}

#[tokio::test]
async fn missing_base_path_is_an_error() {
    let h = harness(
        FakeHost::new(TransferAnswer::Accepted, Some(1)),
        FakeCopies::default(),
        quick_policy(),
    );
    let (shutdown, _) = broadcast::channel::<()>(1);

    let err = watch(
        Path::new("/definitely/not/here/orgs"),
        h.orchestrator.clone(),
        reporter(&h),
        shutdown,
        ShutdownPolicy::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WatchError::BasePathMissing { .. }), "got: {err}");
}
