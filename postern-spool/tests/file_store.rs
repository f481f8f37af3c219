#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use postern_common::Envelope;
use postern_spool::{BackingStore, FileBackingStore, SpoolError, SpooledMessageId};

fn store_in(dir: &tempfile::TempDir) -> FileBackingStore {
    let store = FileBackingStore::builder()
        .path(dir.path().join("spool"))
        .build()
        .expect("tempdir is a valid spool path");
    store.init().expect("Failed to initialise spool");
    store
}

fn envelope(recipients: &[&str], body: &[u8]) -> Envelope {
    Envelope::new(
        "alice@corp.com",
        recipients.iter().map(ToString::to_string).collect(),
        body,
    )
    .unwrap()
}

#[test]
fn path_validation_rejects_parent_dir() {
    let err = FileBackingStore::builder()
        .path("/var/spool/../etc/passwd")
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("cannot contain '..'"));
}

#[test]
fn path_validation_rejects_relative_paths() {
    let err = FileBackingStore::builder()
        .path("relative/path")
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("must be absolute"));
}

#[test]
#[cfg(unix)]
fn path_validation_rejects_system_directories() {
    for path in ["/etc/spool", "/bin/messages", "/usr/sbin/mail", "/proc/mail", "/dev/spool"] {
        let result = FileBackingStore::builder().path(PathBuf::from(path)).build();

        assert!(result.is_err(), "Path {path} should be rejected but wasn't");
        assert!(
            result.unwrap_err().to_string().contains("system directory"),
            "Wrong error for path {path}"
        );
    }
}

#[test]
fn init_rejects_files() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, b"").unwrap();

    let store = FileBackingStore::builder().path(file).build().unwrap();
    assert!(matches!(store.init(), Err(SpoolError::Validation(_))));
}

#[tokio::test]
async fn persist_then_read_preserves_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let body = b"Subject: hi\r\n\r\n\xffbinary\x00data\r\n";
    let original = envelope(&["bob@corp.com", "carol@corp.com", "bob@corp.com"], body);

    let id = store.persist(&original).await.expect("Failed to persist");

    assert_eq!(store.list().await.unwrap(), vec![id.clone()]);

    let read = store.read(&id).await.expect("Failed to read");
    assert_eq!(read, original);
    assert_eq!(read.body(), body);

    let on_disk = std::fs::read(store.path().join(format!("{id}.eml"))).unwrap();
    assert_eq!(on_disk, body);
}

#[tokio::test]
async fn list_skips_foreign_and_temporary_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let id = store.persist(&envelope(&["bob@x"], b"1")).await.unwrap();

    let stray = SpooledMessageId::generate();
    std::fs::write(store.path().join(format!(".tmp_{stray}.bin")), b"").unwrap();
    std::fs::write(store.path().join("notes.bin"), b"").unwrap();
    std::fs::write(store.path().join(format!("{stray}.bin.deleted")), b"").unwrap();

    assert_eq!(store.list().await.unwrap(), vec![id]);
}

#[tokio::test]
async fn delete_removes_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let id = store.persist(&envelope(&["bob@x"], b"1")).await.unwrap();
    store.delete(&id).await.expect("Failed to delete");

    assert!(store.list().await.unwrap().is_empty());
    assert_eq!(std::fs::read_dir(store.path()).unwrap().count(), 0);

    assert!(matches!(store.delete(&id).await, Err(SpoolError::NotFound(_))));
    assert!(matches!(store.read(&id).await, Err(SpoolError::NotFound(_))));
}

#[tokio::test]
async fn init_sweeps_deleted_but_keeps_in_flight_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let kept = store.persist(&envelope(&["bob@x"], b"1")).await.unwrap();
    let stray = SpooledMessageId::generate();
    let pending = SpooledMessageId::generate();
    std::fs::write(store.path().join(format!("{stray}.eml.deleted")), b"").unwrap();
    std::fs::write(store.path().join(format!("{stray}.bin.deleted")), b"").unwrap();
    std::fs::write(store.path().join(format!(".tmp_{pending}.eml")), b"").unwrap();

    store.init().unwrap();

    let mut remaining: Vec<_> = std::fs::read_dir(store.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    remaining.sort();
    assert_eq!(
        remaining,
        vec![
            format!(".tmp_{pending}.eml"),
            format!("{kept}.bin"),
            format!("{kept}.eml"),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn init_from_another_handle_does_not_break_persists() {
    let dir = tempfile::tempdir().unwrap();
    let writer = store_in(&dir);
    let opener = store_in(&dir);

    let done = Arc::new(AtomicBool::new(false));
    let reinit = {
        let done = done.clone();
        tokio::task::spawn_blocking(move || {
            let mut runs = 0usize;
            while !done.load(Ordering::SeqCst) {
                opener.init().expect("init on a shared spool");
                runs += 1;
            }
            runs
        })
    };

    let body = vec![b'x'; 256 * 1024];
    let mut failures = Vec::new();
    for _ in 0..100 {
        if let Err(e) = writer.persist(&envelope(&["bob@x"], &body)).await {
            failures.push(e.to_string());
        }
    }

    done.store(true, Ordering::SeqCst);
    assert!(reinit.await.unwrap() > 0);

    assert!(failures.is_empty(), "persist failures: {failures:?}");
    assert_eq!(writer.list().await.unwrap().len(), 100);
}

#[tokio::test]
async fn persists_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let first = store_in(&dir);
    let a = first.persist(&envelope(&["bob@x"], b"a")).await.unwrap();
    let b = first.persist(&envelope(&["carol@x"], b"b")).await.unwrap();

    let reopened = store_in(&dir);
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(reopened.list().await.unwrap(), expected);
}
